//! Long polling over the Telegram Bot API.

use std::sync::Arc;

use teloxide::{
    RequestError,
    prelude::*,
    types::{BotCommand, InputFile},
};

use crate::{
    bot::keyboard::render_keyboard,
    dispatch::{Action, Dispatch, Event, Reply},
    ledger::LedgerStore,
};

/// Run the bot against the Telegram API until it is stopped.
///
/// Receives updates over long polling and reduces each one to an event for
/// `dispatch`. Handlers run concurrently across users; per-user ordering is
/// enforced inside [Dispatch].
///
/// # Errors
/// Returns an error when the bot cannot identify itself at startup, e.g.
/// when the token is rejected or Telegram is unreachable.
pub async fn run_bot<S>(bot: Bot, dispatch: Arc<Dispatch<S>>) -> Result<(), RequestError>
where
    S: LedgerStore + 'static,
{
    let me = bot.get_me().await?;
    tracing::info!("connected to Telegram as @{}", me.username());
    bot.set_my_commands(command_list()).await?;

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message::<S>))
        .branch(Update::filter_callback_query().endpoint(on_callback::<S>));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatch])
        .default_handler(|update| async move {
            tracing::warn!("unhandled update: {update:?}");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "an error occurred in the update handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// The command menu Telegram shows behind the "/" button.
fn command_list() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "головне меню"),
        BotCommand::new("add", "додати витрату: /add 150 food обід"),
        BotCommand::new("income", "додати дохід: /income 5000 зарплата"),
        BotCommand::new("report", "звіт за сьогодні і за місяць"),
        BotCommand::new("last", "остання витрата"),
        BotCommand::new("chart", "графік витрат за 7 днів"),
        BotCommand::new("balance", "поточний баланс"),
        BotCommand::new("cancel", "скасувати поточне введення"),
    ]
}

async fn on_message<S>(bot: Bot, message: Message, dispatch: Arc<Dispatch<S>>) -> ResponseResult<()>
where
    S: LedgerStore + 'static,
{
    // Stickers, photos and other non-text content are ignored.
    let (Some(text), Some(from)) = (message.text(), message.from()) else {
        return Ok(());
    };

    let user = from.id.0 as i64;
    let event = match Action::from_text(text) {
        Some(action) => Event::Action { user, action },
        None => Event::Text {
            user,
            text: text.to_owned(),
        },
    };

    let reply = dispatch.handle(event).await;

    send_reply(&bot, message.chat.id, reply).await
}

async fn on_callback<S>(
    bot: Bot,
    query: CallbackQuery,
    dispatch: Arc<Dispatch<S>>,
) -> ResponseResult<()>
where
    S: LedgerStore + 'static,
{
    // Stop the button's loading spinner regardless of what happens next.
    bot.answer_callback_query(query.id.clone()).await?;

    let (Some(data), Some(message)) = (query.data.as_deref(), query.message.as_ref()) else {
        return Ok(());
    };
    let Some(action) = Action::parse_callback(data) else {
        tracing::warn!("unrecognised callback data: {data}");
        return Ok(());
    };

    let user = query.from.id.0 as i64;
    let reply = dispatch.handle(Event::Action { user, action }).await;

    send_reply(&bot, message.chat.id, reply).await
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    if let Some(chart) = reply.chart {
        let photo = InputFile::memory(chart).file_name("chart.png");
        bot.send_photo(chat_id, photo).caption(reply.text).await?;

        return Ok(());
    }

    let mut request = bot.send_message(chat_id, reply.text);

    if let Some(keyboard) = reply.keyboard {
        request = request.reply_markup(render_keyboard(keyboard));
    }

    request.await?;

    Ok(())
}
