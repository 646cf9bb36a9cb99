//! Renders composed keyboards into Telegram reply markup.

use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::dispatch::{Keyboard, KeyboardKind};

/// Convert a keyboard from a reply into the Telegram wire type.
///
/// Menu keyboards become persistent reply keyboards whose buttons echo
/// their label as a message; inline keyboards attach to the message and
/// send their callback data.
pub(crate) fn render_keyboard(keyboard: Keyboard) -> ReplyMarkup {
    match keyboard.kind {
        KeyboardKind::Menu => {
            let rows = keyboard.rows.into_iter().map(|row| {
                row.into_iter()
                    .map(|button| KeyboardButton::new(button.label))
            });

            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard(true))
        }
        KeyboardKind::Inline => {
            let rows = keyboard.rows.into_iter().map(|row| {
                row.into_iter()
                    .map(|button| InlineKeyboardButton::callback(button.label, button.data))
            });

            ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows))
        }
    }
}

#[cfg(test)]
mod keyboard_tests {
    use teloxide::types::{InlineKeyboardButtonKind, ReplyMarkup};

    use crate::{
        bot::keyboard::render_keyboard,
        dispatch::{Button, Keyboard, KeyboardKind},
    };

    fn get_test_keyboard(kind: KeyboardKind) -> Keyboard {
        Keyboard {
            kind,
            rows: vec![vec![Button {
                label: "📊 Звіт".to_owned(),
                data: "report".to_owned(),
            }]],
        }
    }

    #[test]
    fn menu_keyboards_render_as_resized_reply_keyboards() {
        let keyboard = match render_keyboard(get_test_keyboard(KeyboardKind::Menu)) {
            ReplyMarkup::Keyboard(keyboard) => keyboard,
            markup => panic!("expected a reply keyboard, got {markup:?}"),
        };

        assert_eq!(keyboard.resize_keyboard, Some(true));
        assert_eq!(keyboard.keyboard[0][0].text, "📊 Звіт");
    }

    #[test]
    fn inline_keyboards_carry_their_callback_data() {
        let keyboard = match render_keyboard(get_test_keyboard(KeyboardKind::Inline)) {
            ReplyMarkup::InlineKeyboard(keyboard) => keyboard,
            markup => panic!("expected an inline keyboard, got {markup:?}"),
        };

        let button = &keyboard.inline_keyboard[0][0];
        assert_eq!(button.text, "📊 Звіт");
        assert_eq!(
            button.kind,
            InlineKeyboardButtonKind::CallbackData("report".to_owned())
        );
    }
}
