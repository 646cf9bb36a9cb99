//! Pure aggregation over transaction slices.
//!
//! Everything here is a deterministic function of its inputs. The store
//! queries feeding these functions live in [crate::report::Reports].

use time::Date;

use crate::ledger::Transaction;

/// A category and its summed spending.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The category label.
    pub category: String,
    /// Summed expense magnitudes for the category.
    pub total: f64,
}

/// One day of summed spending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayTotal {
    /// The calendar day.
    pub date: Date,
    /// Summed expense magnitudes for the day.
    pub total: f64,
}

/// The signed sum of `transactions`: income adds, expenses subtract.
///
/// # Returns
/// The running balance, `0.0` for an empty slice.
pub fn balance(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(Transaction::signed_amount).sum()
}

/// The summed magnitudes of the expenses in `transactions`.
///
/// Income is not spending, so it is ignored here and only shows up in
/// [balance].
pub fn expense_total(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.kind.is_expense())
        .map(|transaction| transaction.amount)
        .sum()
}

/// Ranks expense categories by summed magnitude, descending.
///
/// Ties keep the order in which the categories first appear in
/// `transactions`, and the result is truncated to `limit` entries.
pub fn top_categories(transactions: &[Transaction], limit: usize) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for transaction in transactions.iter().filter(|t| t.kind.is_expense()) {
        match totals
            .iter_mut()
            .find(|entry| entry.category == transaction.category)
        {
            Some(entry) => entry.total += transaction.amount,
            None => totals.push(CategoryTotal {
                category: transaction.category.clone(),
                total: transaction.amount,
            }),
        }
    }

    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals.truncate(limit);

    totals
}

/// Sums expenses per day for charting.
///
/// `expenses` must be date ascending, as the store queries return them; each
/// distinct date becomes one [DayTotal] in the same order. Days without
/// expenses are absent from the input and stay absent here, never
/// zero-filled.
pub fn daily_series(expenses: &[Transaction]) -> Vec<DayTotal> {
    let mut series: Vec<DayTotal> = Vec::new();

    for expense in expenses.iter().filter(|t| t.kind.is_expense()) {
        match series.last_mut() {
            Some(day) if day.date == expense.date => day.total += expense.amount,
            _ => series.push(DayTotal {
                date: expense.date,
                total: expense.amount,
            }),
        }
    }

    series
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{
        ledger::{Transaction, TransactionKind},
        report::aggregation::{balance, daily_series, expense_total, top_categories},
    };

    fn expense(id: i64, date: Date, amount: f64, category: &str) -> Transaction {
        Transaction {
            id,
            user_id: 1,
            date,
            kind: TransactionKind::Expense,
            amount,
            category: category.to_owned(),
            description: String::new(),
        }
    }

    fn income(id: i64, date: Date, amount: f64) -> Transaction {
        Transaction {
            kind: TransactionKind::Income,
            ..expense(id, date, amount, "зарплата")
        }
    }

    #[test]
    fn balance_sums_signed_amounts() {
        let transactions = vec![
            income(1, date!(2025 - 10 - 01), 1000.0),
            expense(2, date!(2025 - 10 - 02), 150.0, "food"),
            expense(3, date!(2025 - 10 - 03), 50.0, "taxi"),
        ];

        assert_eq!(balance(&transactions), 800.0);
    }

    #[test]
    fn balance_of_nothing_is_zero() {
        assert_eq!(balance(&[]), 0.0);
    }

    #[test]
    fn expense_total_ignores_income() {
        let transactions = vec![
            income(1, date!(2025 - 10 - 01), 1000.0),
            expense(2, date!(2025 - 10 - 01), 150.0, "food"),
            expense(3, date!(2025 - 10 - 01), 50.0, "taxi"),
        ];

        assert_eq!(expense_total(&transactions), 200.0);
    }

    #[test]
    fn top_categories_ranked_descending_and_truncated() {
        let transactions = vec![
            expense(1, date!(2025 - 10 - 01), 30.0, "fun"),
            expense(2, date!(2025 - 10 - 02), 100.0, "food"),
            expense(3, date!(2025 - 10 - 03), 90.0, "taxi"),
            expense(4, date!(2025 - 10 - 04), 80.0, "food"),
        ];

        let result = top_categories(&transactions, 2);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].category, "food");
        assert_eq!(result[0].total, 180.0);
        assert_eq!(result[1].category, "taxi");
        assert_eq!(result[1].total, 90.0);
    }

    #[test]
    fn top_categories_ties_keep_first_appearance() {
        let transactions = vec![
            expense(1, date!(2025 - 10 - 01), 50.0, "кафе"),
            expense(2, date!(2025 - 10 - 02), 50.0, "taxi"),
        ];

        let result = top_categories(&transactions, 5);

        assert_eq!(result[0].category, "кафе");
        assert_eq!(result[1].category, "taxi");
    }

    #[test]
    fn top_categories_of_nothing_is_empty() {
        assert!(top_categories(&[], 5).is_empty());
    }

    #[test]
    fn daily_series_groups_by_date_ascending() {
        let transactions = vec![
            expense(1, date!(2025 - 10 - 01), 10.0, "food"),
            expense(2, date!(2025 - 10 - 01), 15.0, "taxi"),
            expense(3, date!(2025 - 10 - 03), 30.0, "food"),
        ];

        let result = daily_series(&transactions);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].date, date!(2025 - 10 - 01));
        assert_eq!(result[0].total, 25.0);
        assert_eq!(result[1].date, date!(2025 - 10 - 03));
        assert_eq!(result[1].total, 30.0);
    }

    #[test]
    fn daily_series_skips_income() {
        let transactions = vec![
            income(1, date!(2025 - 10 - 01), 1000.0),
            expense(2, date!(2025 - 10 - 02), 30.0, "food"),
        ];

        let result = daily_series(&transactions);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].date, date!(2025 - 10 - 02));
    }
}
