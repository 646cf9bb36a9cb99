//! The guided entry dialogue state machine.

use crate::{amount::parse_amount, database_id::TransactionId};

/// The category label the menu offers for entries that fit nothing else.
///
/// Picking it from the menu means "I will describe this instead", so the
/// dialogue asks for a description before committing. The same word typed as
/// free text is an ordinary category.
pub const OTHER_CATEGORY: &str = "Інше";

/// The reply that skips the description step.
pub const SKIP_DESCRIPTION: &str = "-";

/// A user's open guided entry, holding everything collected so far.
///
/// At most one value exists per user at any time; starting a new entry
/// replaces the old one outright, discarding its collected data.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryDialogue {
    /// Waiting for the amount of money.
    AwaitingAmount {
        /// The category, when it was picked from the menu before the amount.
        category: Option<String>,
    },
    /// Waiting for the category label.
    AwaitingCategory {
        /// The already collected amount.
        amount: f64,
    },
    /// Waiting for the optional description.
    AwaitingDescription {
        /// The already collected amount.
        amount: f64,
        /// The already collected category.
        category: String,
    },
    /// Waiting for the description of a menu-picked catch-all entry.
    AwaitingOtherDescription {
        /// The already collected amount.
        amount: f64,
    },
    /// Waiting for a replacement amount for a recorded transaction.
    AwaitingNewAmount {
        /// The transaction being amended.
        transaction: TransactionId,
    },
}

/// What the dialogue asks after a reply that did not finish it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// The reply was not a number; ask for the amount again.
    AmountRetry,
    /// Ask for the category.
    Category,
    /// The reply was blank; ask for the category again.
    CategoryRetry,
    /// Ask for the optional description.
    Description,
    /// Ask what the catch-all entry was for.
    OtherDescription,
    /// The reply was not a number; ask for the replacement amount again.
    NewAmountRetry,
}

/// The result of feeding one reply to [advance].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The dialogue stays open: store `state` and send `prompt`.
    Continue {
        /// The dialogue to keep for the user.
        state: EntryDialogue,
        /// What to ask next.
        prompt: Prompt,
    },
    /// The dialogue finished: commit the outcome and clear the state.
    Commit(Outcome),
}

/// A finished dialogue, ready to hit the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A completed expense entry.
    Entry {
        /// The amount of money spent.
        amount: f64,
        /// The category label.
        category: String,
        /// The description, empty when skipped.
        description: String,
    },
    /// A replacement amount for a recorded transaction.
    Amend {
        /// The transaction being amended.
        transaction: TransactionId,
        /// The replacement amount.
        amount: f64,
    },
}

/// Feed one user reply to an open dialogue.
///
/// Pure: the caller owns storing the returned state and committing the
/// returned outcome. Invalid replies re-prompt in place, keeping everything
/// collected so far; there is no retry limit.
pub fn advance(state: EntryDialogue, text: &str) -> Step {
    match state {
        EntryDialogue::AwaitingAmount { category } => match parse_amount(text) {
            None => Step::Continue {
                state: EntryDialogue::AwaitingAmount { category },
                prompt: Prompt::AmountRetry,
            },
            Some(amount) => match category {
                None => Step::Continue {
                    state: EntryDialogue::AwaitingCategory { amount },
                    prompt: Prompt::Category,
                },
                Some(category) if category == OTHER_CATEGORY => Step::Continue {
                    state: EntryDialogue::AwaitingOtherDescription { amount },
                    prompt: Prompt::OtherDescription,
                },
                Some(category) => Step::Commit(Outcome::Entry {
                    amount,
                    category,
                    description: String::new(),
                }),
            },
        },
        EntryDialogue::AwaitingCategory { amount } => {
            let category = text.trim();

            if category.is_empty() {
                Step::Continue {
                    state: EntryDialogue::AwaitingCategory { amount },
                    prompt: Prompt::CategoryRetry,
                }
            } else {
                Step::Continue {
                    state: EntryDialogue::AwaitingDescription {
                        amount,
                        category: category.to_owned(),
                    },
                    prompt: Prompt::Description,
                }
            }
        }
        EntryDialogue::AwaitingDescription { amount, category } => {
            let text = text.trim();
            let description = if text == SKIP_DESCRIPTION {
                String::new()
            } else {
                text.to_owned()
            };

            Step::Commit(Outcome::Entry {
                amount,
                category,
                description,
            })
        }
        EntryDialogue::AwaitingOtherDescription { amount } => Step::Commit(Outcome::Entry {
            amount,
            category: OTHER_CATEGORY.to_owned(),
            description: text.trim().to_owned(),
        }),
        EntryDialogue::AwaitingNewAmount { transaction } => match parse_amount(text) {
            None => Step::Continue {
                state: EntryDialogue::AwaitingNewAmount { transaction },
                prompt: Prompt::NewAmountRetry,
            },
            Some(amount) => Step::Commit(Outcome::Amend {
                transaction,
                amount,
            }),
        },
    }
}
