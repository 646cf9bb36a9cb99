//! Defines the core transaction models and the ledger store trait.

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{
    Error,
    database_id::{TransactionId, UserId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction adds money to or takes money from an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned. Adds to the balance.
    Income,
    /// Money spent. Subtracts from the balance.
    Expense,
}

impl TransactionKind {
    /// The label this kind is stored under in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Whether this is the expense kind.
    pub fn is_expense(self) -> bool {
        matches!(self, TransactionKind::Expense)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Amounts are stored as unsigned magnitudes; the direction of the money flow
/// lives in [Transaction::kind]. Use [Transaction::signed_amount] when
/// summing towards a balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user who recorded the transaction.
    pub user_id: UserId,
    /// The calendar day the transaction was recorded on.
    pub date: Date,
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The amount of money as an unsigned magnitude.
    pub amount: f64,
    /// The category label, e.g. "food", "transport".
    pub category: String,
    /// A text description of what the transaction was for. An empty string
    /// means no description.
    pub description: String,
}

impl Transaction {
    /// The amount with the kind's sign applied: positive for income, negative
    /// for an expense.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// The data needed to record a new transaction. The store assigns the ID.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The user recording the transaction.
    pub user_id: UserId,
    /// The calendar day to record the transaction on.
    pub date: Date,
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The amount of money as an unsigned magnitude.
    pub amount: f64,
    /// The category label.
    pub category: String,
    /// A text description, empty for none.
    pub description: String,
}

// ============================================================================
// STORE CONTRACT
// ============================================================================

/// Handles the creation, amendment and retrieval of ledger transactions.
///
/// Mutations are durable before they return: once a call reports success, the
/// record must survive a process crash. Implementations must be safe to share
/// across the bot's handler tasks.
pub trait LedgerStore: Send + Sync {
    /// Record a new transaction and assign it the next ID.
    ///
    /// IDs are strictly increasing across all users of the store.
    fn append(&self, new_transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Remove the transaction with `id`.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingTransaction] if `id` is not in the
    /// ledger.
    fn delete(&self, id: TransactionId) -> Result<(), Error>;

    /// Replace the amount of the transaction with `id`, leaving every other
    /// field untouched.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingTransaction] if `id` is not in the
    /// ledger.
    fn update_amount(&self, id: TransactionId, amount: f64) -> Result<Transaction, Error>;

    /// Every transaction recorded by `user_id`, date ascending with ties in
    /// recording order.
    fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, Error>;

    /// The user's transactions dated exactly `date`, in recording order.
    fn transactions_on(&self, user_id: UserId, date: Date) -> Result<Vec<Transaction>, Error>;

    /// The user's transactions within the given calendar month, date
    /// ascending with ties in recording order.
    fn transactions_in_month(
        &self,
        user_id: UserId,
        year: i32,
        month: Month,
    ) -> Result<Vec<Transaction>, Error>;

    /// The user's most recently recorded transaction, or [None] when they
    /// have none.
    fn latest(&self, user_id: UserId) -> Result<Option<Transaction>, Error>;

    /// The user's expenses on the `n` most recent distinct dates that have at
    /// least one expense, date ascending with ties in recording order.
    ///
    /// Feeds the spending chart: income and dates without expenses do not
    /// occupy one of the `n` slots.
    fn expenses_last_n_days(&self, user_id: UserId, n: u32) -> Result<Vec<Transaction>, Error>;
}
