//! Implements the JSON document backed ledger store.
//!
//! The whole ledger lives in a single human-readable JSON document of the
//! shape `{next_id, accounts: {user_id: {balance, history, goals}}}`. Every
//! mutation rewrites the file through a temp-file-and-rename swap so a crash
//! mid-write can never leave a half-written ledger behind.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Date, Month};

use crate::{
    Error,
    database_id::{TransactionId, UserId},
    ledger::store::{LedgerStore, NewTransaction, Transaction},
};

/// One user's slice of the ledger document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Cached running balance. Always equals the signed sum of `history`.
    pub balance: f64,
    /// Every transaction the user recorded, in recording order.
    pub history: Vec<Transaction>,
    /// Reserved for savings goals. Carried through rewrites verbatim so
    /// hand-edited documents survive a round trip; never interpreted.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub goals: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerDocument {
    /// The ID the next appended transaction receives.
    next_id: TransactionId,
    accounts: BTreeMap<UserId, UserAccount>,
}

/// Stores ledger transactions in a single JSON document on disk.
#[derive(Debug)]
pub struct JsonLedger {
    path: PathBuf,
    document: Mutex<LedgerDocument>,
}

impl JsonLedger {
    /// Open the ledger document at `path`, starting an empty ledger when the
    /// file does not exist yet.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::LedgerEncoding] if the file is not a valid ledger document,
    /// - or [Error::LedgerIo] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();

        let mut document = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<LedgerDocument>(&text)
                .map_err(|error| Error::LedgerEncoding(error.to_string()))?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => LedgerDocument {
                next_id: 1,
                accounts: BTreeMap::new(),
            },
            Err(error) => return Err(Error::LedgerIo(error.to_string())),
        };

        // Hand-edited documents may carry a stale counter. IDs must keep
        // strictly increasing, so never fall below the highest recorded one.
        let max_id = document
            .accounts
            .values()
            .flat_map(|account| account.history.iter())
            .map(|transaction| transaction.id)
            .max()
            .unwrap_or(0);
        document.next_id = document.next_id.max(max_id + 1);

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    /// Write `document` to disk, replacing the previous version atomically.
    fn save(&self, document: &LedgerDocument) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(document)
            .map_err(|error| Error::LedgerEncoding(error.to_string()))?;

        let temp_path = self.path.with_extension("tmp");
        write_and_sync(&temp_path, text.as_bytes())
            .map_err(|error| Error::LedgerIo(error.to_string()))?;
        fs::rename(&temp_path, &self.path).map_err(|error| Error::LedgerIo(error.to_string()))?;

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn account(&self, user_id: UserId) -> Option<UserAccount> {
        self.document.lock().unwrap().accounts.get(&user_id).cloned()
    }
}

impl LedgerStore for JsonLedger {
    /// Record a new transaction in the document.
    ///
    /// # Errors
    /// This function will return an [Error::LedgerIo] or
    /// [Error::LedgerEncoding] if the document cannot be rewritten. The
    /// in-memory ledger is left unchanged in that case, so the call can be
    /// retried.
    fn append(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let mut document = self.document.lock().unwrap();
        let mut updated = document.clone();

        let transaction = Transaction {
            id: updated.next_id,
            user_id: new_transaction.user_id,
            date: new_transaction.date,
            kind: new_transaction.kind,
            amount: new_transaction.amount,
            category: new_transaction.category,
            description: new_transaction.description,
        };
        updated.next_id += 1;

        let account = updated.accounts.entry(transaction.user_id).or_default();
        account.history.push(transaction.clone());
        account.balance = balance_of(&account.history);

        self.save(&updated)?;
        *document = updated;

        Ok(transaction)
    }

    /// Remove a transaction from the document.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingTransaction] if `id` is not in the ledger,
    /// - or [Error::LedgerIo]/[Error::LedgerEncoding] if the document cannot
    ///   be rewritten.
    fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let mut document = self.document.lock().unwrap();
        let mut updated = document.clone();

        let Some(account) = updated
            .accounts
            .values_mut()
            .find(|account| account.history.iter().any(|t| t.id == id))
        else {
            return Err(Error::DeleteMissingTransaction);
        };

        account.history.retain(|transaction| transaction.id != id);
        account.balance = balance_of(&account.history);

        self.save(&updated)?;
        *document = updated;

        Ok(())
    }

    /// Replace the amount of a recorded transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingTransaction] if `id` is not in the ledger,
    /// - or [Error::LedgerIo]/[Error::LedgerEncoding] if the document cannot
    ///   be rewritten.
    fn update_amount(&self, id: TransactionId, amount: f64) -> Result<Transaction, Error> {
        let mut document = self.document.lock().unwrap();
        let mut updated = document.clone();

        let mut result = None;
        for account in updated.accounts.values_mut() {
            if let Some(transaction) = account.history.iter_mut().find(|t| t.id == id) {
                transaction.amount = amount;
                result = Some(transaction.clone());
                account.balance = balance_of(&account.history);
                break;
            }
        }

        let Some(transaction) = result else {
            return Err(Error::UpdateMissingTransaction);
        };

        self.save(&updated)?;
        *document = updated;

        Ok(transaction)
    }

    fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, Error> {
        let document = self.document.lock().unwrap();

        let mut transactions = document
            .accounts
            .get(&user_id)
            .map(|account| account.history.clone())
            .unwrap_or_default();
        sort_by_date(&mut transactions);

        Ok(transactions)
    }

    fn transactions_on(&self, user_id: UserId, date: Date) -> Result<Vec<Transaction>, Error> {
        let document = self.document.lock().unwrap();

        let mut transactions: Vec<Transaction> = document
            .accounts
            .get(&user_id)
            .into_iter()
            .flat_map(|account| account.history.iter())
            .filter(|transaction| transaction.date == date)
            .cloned()
            .collect();
        transactions.sort_by_key(|transaction| transaction.id);

        Ok(transactions)
    }

    fn transactions_in_month(
        &self,
        user_id: UserId,
        year: i32,
        month: Month,
    ) -> Result<Vec<Transaction>, Error> {
        let document = self.document.lock().unwrap();

        let mut transactions: Vec<Transaction> = document
            .accounts
            .get(&user_id)
            .into_iter()
            .flat_map(|account| account.history.iter())
            .filter(|transaction| {
                transaction.date.year() == year && transaction.date.month() == month
            })
            .cloned()
            .collect();
        sort_by_date(&mut transactions);

        Ok(transactions)
    }

    fn latest(&self, user_id: UserId) -> Result<Option<Transaction>, Error> {
        let document = self.document.lock().unwrap();

        Ok(document.accounts.get(&user_id).and_then(|account| {
            account
                .history
                .iter()
                .max_by_key(|transaction| transaction.id)
                .cloned()
        }))
    }

    fn expenses_last_n_days(&self, user_id: UserId, n: u32) -> Result<Vec<Transaction>, Error> {
        let document = self.document.lock().unwrap();

        let Some(account) = document.accounts.get(&user_id) else {
            return Ok(Vec::new());
        };

        let expense_dates: BTreeSet<Date> = account
            .history
            .iter()
            .filter(|transaction| transaction.kind.is_expense())
            .map(|transaction| transaction.date)
            .collect();
        let keep: BTreeSet<Date> = expense_dates.into_iter().rev().take(n as usize).collect();

        let mut expenses: Vec<Transaction> = account
            .history
            .iter()
            .filter(|transaction| {
                transaction.kind.is_expense() && keep.contains(&transaction.date)
            })
            .cloned()
            .collect();
        sort_by_date(&mut expenses);

        Ok(expenses)
    }
}

fn balance_of(history: &[Transaction]) -> f64 {
    history.iter().map(Transaction::signed_amount).sum()
}

fn sort_by_date(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod document_tests {
    use time::{Date, Month, macros::date};

    use crate::{
        Error,
        database_id::UserId,
        ledger::{
            json::JsonLedger,
            store::{LedgerStore, NewTransaction, TransactionKind},
        },
    };

    fn get_test_ledger() -> (JsonLedger, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = JsonLedger::open(dir.path().join("ledger.json")).unwrap();

        (ledger, dir)
    }

    fn new_expense(user_id: UserId, date: Date, amount: f64, category: &str) -> NewTransaction {
        NewTransaction {
            user_id,
            date,
            kind: TransactionKind::Expense,
            amount,
            category: category.to_owned(),
            description: String::new(),
        }
    }

    fn new_income(user_id: UserId, date: Date, amount: f64) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Income,
            ..new_expense(user_id, date, amount, "зарплата")
        }
    }

    #[test]
    fn append_assigns_strictly_increasing_ids_across_users() {
        let (ledger, _dir) = get_test_ledger();
        let today = date!(2025 - 10 - 05);

        let first = ledger
            .append(new_expense(1, today, 10.0, "food"))
            .expect("Could not append transaction");
        let second = ledger
            .append(new_expense(2, today, 20.0, "food"))
            .expect("Could not append transaction");

        assert!(second.id > first.id);
    }

    #[test]
    fn balance_tracks_signed_sum_of_history() {
        let (ledger, _dir) = get_test_ledger();
        let today = date!(2025 - 10 - 05);

        ledger
            .append(new_income(1, today, 1000.0))
            .expect("Could not append transaction");
        let expense = ledger
            .append(new_expense(1, today, 150.0, "food"))
            .expect("Could not append transaction");
        ledger
            .update_amount(expense.id, 100.0)
            .expect("Could not update transaction");

        let account = ledger.account(1).expect("Account should exist");

        assert_eq!(account.balance, 900.0);
        let signed_sum: f64 = account
            .history
            .iter()
            .map(|transaction| transaction.signed_amount())
            .sum();
        assert_eq!(account.balance, signed_sum);
    }

    #[test]
    fn delete_restores_balance() {
        let (ledger, _dir) = get_test_ledger();
        let today = date!(2025 - 10 - 05);

        ledger
            .append(new_income(1, today, 1000.0))
            .expect("Could not append transaction");
        let expense = ledger
            .append(new_expense(1, today, 150.0, "food"))
            .expect("Could not append transaction");
        ledger
            .delete(expense.id)
            .expect("Could not delete transaction");

        let account = ledger.account(1).expect("Account should exist");

        assert_eq!(account.balance, 1000.0);
        assert_eq!(account.history.len(), 1);
    }

    #[test]
    fn delete_fails_on_missing_id() {
        let (ledger, _dir) = get_test_ledger();

        let result = ledger.delete(999);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn update_amount_fails_on_missing_id() {
        let (ledger, _dir) = get_test_ledger();

        let result = ledger.update_amount(999, 75.5);

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn ledger_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let recorded = {
            let ledger = JsonLedger::open(&path).unwrap();
            ledger
                .append(new_expense(1, date!(2025 - 10 - 05), 150.0, "food"))
                .expect("Could not append transaction")
        };

        let reopened = JsonLedger::open(&path).unwrap();

        let transactions = reopened
            .transactions(1)
            .expect("Could not get transactions");
        assert_eq!(transactions, vec![recorded.clone()]);

        let next = reopened
            .append(new_expense(1, date!(2025 - 10 - 06), 20.0, "taxi"))
            .expect("Could not append transaction");
        assert!(next.id > recorded.id);
    }

    #[test]
    fn goals_survive_a_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let document = serde_json::json!({
            "next_id": 8,
            "accounts": {
                "1": {
                    "balance": -150.0,
                    "history": [{
                        "id": 7,
                        "user_id": 1,
                        "date": "2025-10-05",
                        "kind": "expense",
                        "amount": 150.0,
                        "category": "food",
                        "description": "супермаркет"
                    }],
                    "goals": { "відпустка": 5000.0 }
                }
            }
        });
        std::fs::write(&path, document.to_string()).unwrap();

        let ledger = JsonLedger::open(&path).unwrap();
        ledger
            .append(new_expense(1, date!(2025 - 10 - 06), 20.0, "taxi"))
            .expect("Could not append transaction");

        let reopened = JsonLedger::open(&path).unwrap();
        let account = reopened.account(1).expect("Account should exist");

        assert_eq!(account.goals.get("відпустка"), Some(&serde_json::json!(5000.0)));
        assert_eq!(account.balance, -170.0);
    }

    #[test]
    fn transactions_sorted_by_date_ascending() {
        let (ledger, _dir) = get_test_ledger();
        for date in [
            date!(2025 - 10 - 05),
            date!(2025 - 10 - 01),
            date!(2025 - 10 - 03),
        ] {
            ledger
                .append(new_expense(1, date, 10.0, "food"))
                .expect("Could not append transaction");
        }

        let transactions = ledger.transactions(1).expect("Could not get transactions");

        let dates: Vec<Date> = transactions
            .iter()
            .map(|transaction| transaction.date)
            .collect();
        assert_eq!(
            dates,
            vec![
                date!(2025 - 10 - 01),
                date!(2025 - 10 - 03),
                date!(2025 - 10 - 05)
            ]
        );
    }

    #[test]
    fn transactions_in_month_excludes_other_months() {
        let (ledger, _dir) = get_test_ledger();
        ledger
            .append(new_expense(1, date!(2025 - 09 - 30), 10.0, "food"))
            .expect("Could not append transaction");
        ledger
            .append(new_expense(1, date!(2025 - 10 - 15), 20.0, "food"))
            .expect("Could not append transaction");

        let transactions = ledger
            .transactions_in_month(1, 2025, Month::October)
            .expect("Could not get transactions");

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 20.0);
    }

    #[test]
    fn latest_returns_most_recently_recorded() {
        let (ledger, _dir) = get_test_ledger();
        ledger
            .append(new_expense(1, date!(2025 - 10 - 05), 10.0, "food"))
            .expect("Could not append transaction");
        let last = ledger
            .append(new_expense(1, date!(2025 - 10 - 01), 20.0, "taxi"))
            .expect("Could not append transaction");

        let latest = ledger.latest(1).expect("Could not get latest transaction");

        assert_eq!(latest, Some(last));
    }

    #[test]
    fn expenses_last_n_days_ignores_income_days() {
        let (ledger, _dir) = get_test_ledger();
        ledger
            .append(new_expense(1, date!(2025 - 10 - 01), 10.0, "food"))
            .expect("Could not append transaction");
        ledger
            .append(new_income(1, date!(2025 - 10 - 02), 1000.0))
            .expect("Could not append transaction");
        ledger
            .append(new_expense(1, date!(2025 - 10 - 03), 30.0, "food"))
            .expect("Could not append transaction");

        let expenses = ledger
            .expenses_last_n_days(1, 2)
            .expect("Could not get expenses");

        let dates: Vec<Date> = expenses.iter().map(|expense| expense.date).collect();
        assert_eq!(dates, vec![date!(2025 - 10 - 01), date!(2025 - 10 - 03)]);
    }
}
