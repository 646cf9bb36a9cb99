//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The ID of a recorded transaction.
pub type TransactionId = DatabaseId;

/// The ID of the chat user a ledger record belongs to.
pub type UserId = i64;
