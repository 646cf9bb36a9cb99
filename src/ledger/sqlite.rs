//! Implements the SQLite backed ledger store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::{Date, Month, util::days_in_month};

use crate::{
    Error,
    database_id::{TransactionId, UserId},
    ledger::store::{LedgerStore, NewTransaction, Transaction, TransactionKind},
};

/// Stores ledger transactions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    /// Create a new ledger store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl LedgerStore for SqliteLedger {
    /// Record a new transaction in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL
    /// error.
    fn append(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let connection = self.connection.lock().unwrap();

        let transaction = connection
            .prepare(
                "INSERT INTO \"transaction\" (user_id, date, kind, amount, category, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING id, user_id, date, kind, amount, category, description",
            )?
            .query_row(
                (
                    new_transaction.user_id,
                    new_transaction.date,
                    new_transaction.kind.as_str(),
                    new_transaction.amount,
                    new_transaction.category,
                    new_transaction.description,
                ),
                map_transaction_row,
            )?;

        Ok(transaction)
    }

    /// Remove a transaction from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingTransaction] if `id` does not refer to a stored
    ///   transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();

        let rows_deleted = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

        if rows_deleted == 0 {
            return Err(Error::DeleteMissingTransaction);
        }

        Ok(())
    }

    /// Replace the amount of a stored transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingTransaction] if `id` does not refer to a stored
    ///   transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update_amount(&self, id: TransactionId, amount: f64) -> Result<Transaction, Error> {
        let connection = self.connection.lock().unwrap();

        connection
            .prepare(
                "UPDATE \"transaction\" SET amount = ?1 WHERE id = ?2
                 RETURNING id, user_id, date, kind, amount, category, description",
            )?
            .query_row((amount, id), map_transaction_row)
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
                error => error.into(),
            })
    }

    fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, Error> {
        let connection = self.connection.lock().unwrap();

        connection
            .prepare(
                "SELECT id, user_id, date, kind, amount, category, description
                 FROM \"transaction\" WHERE user_id = :user_id
                 ORDER BY date ASC, id ASC",
            )?
            .query_map(&[(":user_id", &user_id)], map_transaction_row)?
            .map(|row| row.map_err(Error::from))
            .collect()
    }

    fn transactions_on(&self, user_id: UserId, date: Date) -> Result<Vec<Transaction>, Error> {
        let connection = self.connection.lock().unwrap();

        connection
            .prepare(
                "SELECT id, user_id, date, kind, amount, category, description
                 FROM \"transaction\" WHERE user_id = ?1 AND date = ?2
                 ORDER BY id ASC",
            )?
            .query_map((user_id, date), map_transaction_row)?
            .map(|row| row.map_err(Error::from))
            .collect()
    }

    fn transactions_in_month(
        &self,
        user_id: UserId,
        year: i32,
        month: Month,
    ) -> Result<Vec<Transaction>, Error> {
        let (start, end) = month_bounds(year, month);
        let connection = self.connection.lock().unwrap();

        connection
            .prepare(
                "SELECT id, user_id, date, kind, amount, category, description
                 FROM \"transaction\" WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
                 ORDER BY date ASC, id ASC",
            )?
            .query_map((user_id, start, end), map_transaction_row)?
            .map(|row| row.map_err(Error::from))
            .collect()
    }

    fn latest(&self, user_id: UserId) -> Result<Option<Transaction>, Error> {
        let connection = self.connection.lock().unwrap();

        let result = connection
            .prepare(
                "SELECT id, user_id, date, kind, amount, category, description
                 FROM \"transaction\" WHERE user_id = :user_id
                 ORDER BY id DESC LIMIT 1",
            )?
            .query_one(&[(":user_id", &user_id)], map_transaction_row);

        match result {
            Ok(transaction) => Ok(Some(transaction)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn expenses_last_n_days(&self, user_id: UserId, n: u32) -> Result<Vec<Transaction>, Error> {
        let connection = self.connection.lock().unwrap();

        connection
            .prepare(
                "SELECT id, user_id, date, kind, amount, category, description
                 FROM \"transaction\"
                 WHERE user_id = ?1 AND kind = 'expense' AND date IN (
                     SELECT DISTINCT date FROM \"transaction\"
                     WHERE user_id = ?1 AND kind = 'expense'
                     ORDER BY date DESC LIMIT ?2
                 )
                 ORDER BY date ASC, id ASC",
            )?
            .query_map((user_id, n), map_transaction_row)?
            .map(|row| row.map_err(Error::from))
            .collect()
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                kind TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Composite index used by the per-user report queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = row.get(1)?;
    let date = row.get(2)?;
    let kind: String = row.get(3)?;
    let kind = match kind.as_str() {
        "income" => TransactionKind::Income,
        "expense" => TransactionKind::Expense,
        _ => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown transaction kind {kind:?}").into(),
            ));
        }
    };
    let amount = row.get(4)?;
    let category = row.get(5)?;
    let description = row.get(6)?;

    Ok(Transaction {
        id,
        user_id,
        date,
        kind,
        amount,
        category,
        description,
    })
}

fn month_bounds(year: i32, month: Month) -> (Date, Date) {
    let start = Date::from_calendar_date(year, month, 1).expect("invalid month start date");
    let end = Date::from_calendar_date(year, month, days_in_month(month, year))
        .expect("invalid month end date");

    (start, end)
}

// ============================================================================
// TESTS
// ============================================================================
