//! Skarbnyk is a Telegram bot for tracking personal spending.
//!
//! Users record expenses through a guided dialogue, quick one-line messages
//! or commands, and get back running balances, spending reports and a
//! seven-day spending chart.

#![warn(missing_docs)]

mod amount;
mod bot;
mod chart;
mod database_id;
mod db;
mod dialogue;
mod dispatch;
mod ledger;
mod quick_entry;
mod report;
mod timezone;

pub use bot::run_bot;
pub use database_id::{DatabaseId, TransactionId, UserId};
pub use db::initialize as initialize_db;
pub use dispatch::{Action, Button, Dispatch, Event, Keyboard, KeyboardKind, Reply};
pub use ledger::{
    JsonLedger, LedgerStore, NewTransaction, SqliteLedger, Transaction, TransactionKind,
};
pub use timezone::get_local_offset;

/// The errors that may occur in the bot.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the ledger")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the ledger")]
    UpdateMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The ledger document file could not be read or written.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not access the ledger file: {0}")]
    LedgerIo(String),

    /// The ledger document file could not be encoded or decoded.
    #[error("could not encode the ledger file: {0}")]
    LedgerEncoding(String),

    /// A chart was requested but there is no data to draw.
    #[error("no data to chart")]
    EmptyChart,

    /// Drawing or encoding a chart failed.
    #[error("chart generation failed: {0}")]
    ChartError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
