//! Reply texts and keyboards.
//!
//! Everything the bot says lives here so the routing code stays free of
//! string literals and the texts can be checked in one place.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

use crate::{
    database_id::TransactionId,
    dialogue::{OTHER_CATEGORY, Prompt},
    dispatch::core::{Button, Keyboard, KeyboardKind},
    ledger::Transaction,
    report::CategoryTotal,
};

// ============================================================================
// MENU LABELS
// ============================================================================

/// The main menu button that starts a guided expense entry.
pub(crate) const MENU_ADD_EXPENSE: &str = "➕ Додати витрату";
/// The main menu button that requests the spending report.
pub(crate) const MENU_REPORT: &str = "📊 Звіт";
/// The main menu button that shows the most recent transaction.
pub(crate) const MENU_LAST_ENTRY: &str = "🧾 Остання витрата";
/// The main menu button that requests the spending chart.
pub(crate) const MENU_CHART: &str = "📈 Графік";

/// The categories offered as buttons when a category is asked for.
const MENU_CATEGORIES: [&str; 3] = ["food", "transport", "fun"];

// ============================================================================
// STATIC TEXTS
// ============================================================================

/// The greeting sent in response to `/start`.
pub(crate) const START_TEXT: &str = "Привіт! Я твій фінансовий асистент 💸\n\n\
    Я можу:\n\
    • зберігати витрати\n\
    • показувати звіти\n\
    • будувати графіки\n\n\
    Користуйся кнопками нижче!\n\n\
    Швидке додавання: просто напиши\n\
    150 food супермаркет";

/// Asks for the amount at the start of a guided entry.
pub(crate) const AMOUNT_PROMPT: &str = "💰 Введи суму (тільки число, напр. 150.5):";
/// Asks for the replacement amount when editing a transaction.
pub(crate) const NEW_AMOUNT_PROMPT: &str = "💰 Нова сума:";

pub(crate) const DELETED_TEXT: &str = "✅ Видалено";
pub(crate) const ALREADY_REMOVED_TEXT: &str = "📭 Вже видалено";
pub(crate) const NOTHING_TO_EDIT_TEXT: &str = "📭 Нема чого редагувати";
pub(crate) const NO_ENTRIES_TEXT: &str = "📭 Витрат ще немає";
pub(crate) const NO_CHART_DATA_TEXT: &str = "📊 Даних для графіка немає";
pub(crate) const CHART_CAPTION: &str = "📈 Твої витрати";

pub(crate) const ADD_USAGE_TEXT: &str = "Формат: /add 150 food супермаркет";
pub(crate) const INCOME_USAGE_TEXT: &str = "Формат: /income 5000 зарплата аванс";
pub(crate) const INVALID_AMOUNT_TEXT: &str = "❌ Некоректна сума";

pub(crate) const CANCELLED_TEXT: &str = "✅ Скасовано";
pub(crate) const NOTHING_TO_CANCEL_TEXT: &str = "Нема чого скасовувати";

/// Sent when a write failed and resending the same answer should work.
pub(crate) const RETRY_TEXT: &str = "⚠️ Не вдалося зберегти. Спробуй ще раз";
/// Sent when a read or render failed and retrying is unlikely to help.
pub(crate) const TROUBLE_TEXT: &str = "⚠️ Щось пішло не так. Спробуй ще раз пізніше";

/// Sent for text that is neither a dialogue answer nor a quick entry.
pub(crate) const FALLBACK_TEXT: &str = "❓ Не зрозумів. Пиши:\n\
    150 food супермаркет\n\
    або використовуй кнопки";

/// The follow-up question for each mid-dialogue step.
pub(crate) fn prompt_text(prompt: Prompt) -> &'static str {
    match prompt {
        Prompt::AmountRetry => "❌ Не число. Спробуй ще раз:",
        Prompt::Category => "📂 Введи категорію (food, transport, fun):",
        Prompt::CategoryRetry => "❌ Порожньо. Введи категорію:",
        Prompt::Description => "📝 Опис (або '-' без опису):",
        Prompt::OtherDescription => "📝 На що саме? Опиши:",
        Prompt::NewAmountRetry => "❌ Тільки число. Спробуй ще раз:",
    }
}

// ============================================================================
// COMPOSED TEXTS
// ============================================================================

/// Confirms a guided entry.
pub(crate) fn entry_confirmation(transaction: &Transaction) -> String {
    let description = if transaction.description.is_empty() {
        "немає"
    } else {
        &transaction.description
    };

    format!(
        "✅ Додано: {} грн ({})\nОпис: {}",
        format_amount(transaction.amount),
        transaction.category,
        description
    )
}

/// Confirms a quick entry. Shorter than [entry_confirmation] since the user
/// typed everything on one line.
pub(crate) fn quick_confirmation(transaction: &Transaction) -> String {
    let description = if transaction.description.is_empty() {
        "без опису"
    } else {
        &transaction.description
    };

    format!(
        "✅ Додано: {} грн ({})\n{}",
        format_amount(transaction.amount),
        transaction.category,
        description
    )
}

/// Confirms an `/income` entry.
pub(crate) fn income_confirmation(transaction: &Transaction) -> String {
    let description = if transaction.description.is_empty() {
        "немає"
    } else {
        &transaction.description
    };

    format!(
        "✅ Додано дохід: {} грн ({})\nОпис: {}",
        format_amount(transaction.amount),
        transaction.category,
        description
    )
}

/// Confirms an amended amount.
pub(crate) fn update_confirmation(amount: f64) -> String {
    format!("✅ Оновлено на {} грн", format_amount(amount))
}

/// The spending report: today's total, the month's total and the month's
/// top categories.
pub(crate) fn report_text(daily_total: f64, monthly_total: f64, top: &[CategoryTotal]) -> String {
    let categories = if top.is_empty() {
        "немає".to_owned()
    } else {
        top.iter()
            .map(|entry| format!("• {}: {} грн", entry.category, format_amount(entry.total)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "📊 Звіт\n\nСьогодні: {} грн\nМісяць: {} грн\n\nТоп категорій:\n{}",
        format_amount(daily_total),
        format_amount(monthly_total),
        categories
    )
}

/// The most recent transaction, shown above its edit and delete buttons.
pub(crate) fn last_entry_text(transaction: &Transaction) -> String {
    let description = if transaction.description.is_empty() {
        "без опису"
    } else {
        &transaction.description
    };

    format!(
        "🧾 Остання:\n{} грн • {}\n{}\n\n{}",
        format_amount(transaction.amount),
        transaction.category,
        transaction.date,
        description
    )
}

/// The running balance over everything the user recorded.
pub(crate) fn balance_text(balance: f64) -> String {
    format!("💰 Баланс: {} грн", format_amount(balance))
}

/// Formats an amount for display: two decimal places at most, none when the
/// amount is whole.
pub(crate) fn format_amount(amount: f64) -> String {
    static AMOUNT_FORMATTER: OnceLock<Formatter> = OnceLock::new();

    let formatter =
        AMOUNT_FORMATTER.get_or_init(|| Formatter::new().precision(Precision::Decimals(2)));

    // numfmt keeps a single trailing zero on whole amounts, e.g. "150.0".
    let formatted = formatter.fmt_string(amount);

    match formatted.strip_suffix(".0") {
        Some(whole) => whole.to_owned(),
        None => formatted,
    }
}

// ============================================================================
// KEYBOARDS
// ============================================================================

/// The persistent main menu.
pub(crate) fn main_menu() -> Keyboard {
    Keyboard {
        kind: KeyboardKind::Menu,
        rows: vec![
            vec![menu_button(MENU_ADD_EXPENSE), menu_button(MENU_REPORT)],
            vec![menu_button(MENU_LAST_ENTRY), menu_button(MENU_CHART)],
        ],
    }
}

/// The category shortcuts attached to the category prompt.
pub(crate) fn category_keyboard() -> Keyboard {
    let category_row = MENU_CATEGORIES.iter().map(|label| category_button(label)).collect();

    Keyboard {
        kind: KeyboardKind::Inline,
        rows: vec![category_row, vec![category_button(OTHER_CATEGORY)]],
    }
}

/// The edit and delete buttons attached to a shown transaction.
pub(crate) fn last_entry_keyboard(id: TransactionId) -> Keyboard {
    Keyboard {
        kind: KeyboardKind::Inline,
        rows: vec![vec![
            Button {
                label: "✏️ Змінити".to_owned(),
                data: format!("edit:{id}"),
            },
            Button {
                label: "🗑 Видалити".to_owned(),
                data: format!("del:{id}"),
            },
        ]],
    }
}

fn menu_button(label: &str) -> Button {
    Button {
        label: label.to_owned(),
        data: label.to_owned(),
    }
}

fn category_button(label: &str) -> Button {
    Button {
        label: label.to_owned(),
        data: format!("cat:{label}"),
    }
}
