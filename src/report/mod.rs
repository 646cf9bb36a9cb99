//! Spending reports over the ledger.
//!
//! This module contains:
//! - Pure aggregation functions over transaction slices
//! - A thin wrapper binding them to a ledger store's query paths

mod aggregation;
mod queries;

pub use aggregation::{CategoryTotal, DayTotal, balance, daily_series, expense_total, top_categories};
pub use queries::Reports;
