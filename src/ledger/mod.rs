//! Ledger storage for the finance bot.
//!
//! This module contains everything related to recorded transactions:
//! - The `Transaction` model and the `LedgerStore` contract
//! - A SQLite backed store for the usual single-file database
//! - A JSON document backed store for human-readable ledgers

mod json;
mod sqlite;
mod store;

pub use json::JsonLedger;
pub use sqlite::{SqliteLedger, create_transaction_table, map_transaction_row};
pub use store::{LedgerStore, NewTransaction, Transaction, TransactionKind};
