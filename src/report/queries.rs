//! Binds the aggregation functions to a ledger store's query paths.

use time::{Date, Month};

use crate::{
    Error,
    database_id::UserId,
    ledger::LedgerStore,
    report::aggregation::{self, CategoryTotal, DayTotal},
};

/// Read-side reports over a ledger store.
pub struct Reports<'a, S> {
    ledger: &'a S,
}

impl<'a, S: LedgerStore> Reports<'a, S> {
    /// Create reports over `ledger`.
    pub fn new(ledger: &'a S) -> Self {
        Self { ledger }
    }

    /// The user's running balance over everything they ever recorded.
    pub fn balance(&self, user_id: UserId) -> Result<f64, Error> {
        Ok(aggregation::balance(&self.ledger.transactions(user_id)?))
    }

    /// Total spending on `date`.
    pub fn daily_total(&self, user_id: UserId, date: Date) -> Result<f64, Error> {
        Ok(aggregation::expense_total(
            &self.ledger.transactions_on(user_id, date)?,
        ))
    }

    /// Total spending within the given calendar month.
    pub fn monthly_total(&self, user_id: UserId, year: i32, month: Month) -> Result<f64, Error> {
        Ok(aggregation::expense_total(
            &self.ledger.transactions_in_month(user_id, year, month)?,
        ))
    }

    /// The month's spending categories ranked by summed amount descending,
    /// truncated to `limit`.
    pub fn top_categories(
        &self,
        user_id: UserId,
        year: i32,
        month: Month,
        limit: usize,
    ) -> Result<Vec<CategoryTotal>, Error> {
        Ok(aggregation::top_categories(
            &self.ledger.transactions_in_month(user_id, year, month)?,
            limit,
        ))
    }

    /// Per-day spending for the `n` most recent dates with expenses,
    /// chronologically ascending.
    pub fn series_last_n_days(&self, user_id: UserId, n: u32) -> Result<Vec<DayTotal>, Error> {
        Ok(aggregation::daily_series(
            &self.ledger.expenses_last_n_days(user_id, n)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Month, macros::date};

    use crate::{
        db::initialize,
        ledger::{LedgerStore, NewTransaction, SqliteLedger, TransactionKind},
        report::queries::Reports,
    };

    fn get_test_ledger() -> SqliteLedger {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        SqliteLedger::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn reports_cover_balance_totals_and_series() {
        let ledger = get_test_ledger();
        for (date, kind, amount, category) in [
            (date!(2025 - 10 - 01), TransactionKind::Income, 1000.0, "зарплата"),
            (date!(2025 - 10 - 01), TransactionKind::Expense, 150.0, "food"),
            (date!(2025 - 10 - 02), TransactionKind::Expense, 50.0, "taxi"),
            (date!(2025 - 09 - 15), TransactionKind::Expense, 70.0, "food"),
        ] {
            ledger
                .append(NewTransaction {
                    user_id: 1,
                    date,
                    kind,
                    amount,
                    category: category.to_owned(),
                    description: String::new(),
                })
                .expect("Could not append transaction");
        }
        let reports = Reports::new(&ledger);

        assert_eq!(reports.balance(1).unwrap(), 730.0);
        assert_eq!(reports.daily_total(1, date!(2025 - 10 - 01)).unwrap(), 150.0);
        assert_eq!(reports.monthly_total(1, 2025, Month::October).unwrap(), 200.0);

        let top = reports.top_categories(1, 2025, Month::October, 5).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].category, "food");

        let series = reports.series_last_n_days(1, 7).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].date, date!(2025 - 09 - 15));
        assert_eq!(series[2].total, 50.0);
    }
}
