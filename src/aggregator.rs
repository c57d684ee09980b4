// 📊 Aggregator - pure summaries over a transaction snapshot
//
// No state, no persistence. Plain f64 accumulation; rounding is left to
// whoever prints the numbers.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::ops::Index;

use crate::transaction::{Category, Transaction, TransactionType};

// ============================================================================
// TOTALS
// ============================================================================

fn total_of(transactions: &[Transaction], transaction_type: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|tx| tx.transaction_type == transaction_type)
        .map(|tx| tx.amount)
        .sum()
}

/// Sum of `amount` over income entries. Empty input gives 0.
pub fn total_income(transactions: &[Transaction]) -> f64 {
    total_of(transactions, TransactionType::Income)
}

/// Sum of `amount` over expense entries. Empty input gives 0.
pub fn total_expenses(transactions: &[Transaction]) -> f64 {
    total_of(transactions, TransactionType::Expense)
}

/// Income minus expenses; may be negative.
pub fn balance(transactions: &[Transaction]) -> f64 {
    total_income(transactions) - total_expenses(transactions)
}

// ============================================================================
// CATEGORY TOTALS
// ============================================================================

/// Per-category sums with every category always present.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryTotals {
    totals: [f64; Category::ALL.len()],
}

impl CategoryTotals {
    pub fn get(&self, category: Category) -> f64 {
        self.totals[category.index()]
    }

    pub fn add(&mut self, category: Category, amount: f64) {
        self.totals[category.index()] += amount;
    }

    /// (category, total) pairs in `Category::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    pub fn sum(&self) -> f64 {
        self.totals.iter().sum()
    }
}

impl Index<Category> for CategoryTotals {
    type Output = f64;

    fn index(&self, category: Category) -> &f64 {
        &self.totals[category.index()]
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for (category, total) in self.iter() {
            map.serialize_entry(category.as_str(), &total)?;
        }
        map.end()
    }
}

/// Sum of `amount` per category, regardless of type.
///
/// Income and expense amounts land in the same bucket. Callers that want an
/// expense-only breakdown filter first (see `expense_breakdown`).
pub fn by_category(transactions: &[Transaction]) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    for tx in transactions {
        totals.add(tx.category, tx.amount);
    }
    totals
}

// ============================================================================
// EXPENSE BREAKDOWN
// ============================================================================

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub amount: f64,
    /// Share of total expenses, 0..=100
    pub percentage: f64,
}

/// Expense-only category breakdown, skipping empty categories.
pub fn expense_breakdown(transactions: &[Transaction]) -> Vec<CategoryShare> {
    let mut totals = CategoryTotals::default();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        totals.add(tx.category, tx.amount);
    }
    let total = totals.sum();

    totals
        .iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|(category, amount)| CategoryShare {
            category,
            amount,
            percentage: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
        })
        .collect()
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Everything the dashboard shows for one snapshot
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Summary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub by_category: CategoryTotals,
}

impl Summary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let total_income = total_income(transactions);
        let total_expenses = total_expenses(transactions);
        Summary {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
            by_category: by_category(transactions),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::NewTransaction;
    use chrono::{TimeZone, Utc};

    fn tx(amount: f64, transaction_type: TransactionType, category: Category) -> Transaction {
        NewTransaction::new(
            "test",
            amount,
            category,
            transaction_type,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .into_transaction(uuid::Uuid::new_v4().to_string())
    }

    #[test]
    fn test_empty_input_is_zero() {
        assert_eq!(total_income(&[]), 0.0);
        assert_eq!(total_expenses(&[]), 0.0);
        assert_eq!(balance(&[]), 0.0);

        let totals = by_category(&[]);
        for category in Category::ALL {
            assert_eq!(totals[category], 0.0);
        }
    }

    #[test]
    fn test_income_expense_balance() {
        let transactions = vec![
            tx(100.0, TransactionType::Income, Category::Salary),
            tx(40.0, TransactionType::Expense, Category::Food),
        ];

        assert_eq!(total_income(&transactions), 100.0);
        assert_eq!(total_expenses(&transactions), 40.0);
        assert_eq!(balance(&transactions), 60.0);
    }

    #[test]
    fn test_negative_balance() {
        let transactions = vec![
            tx(10.0, TransactionType::Income, Category::Other),
            tx(25.0, TransactionType::Expense, Category::Bills),
        ];

        assert_eq!(balance(&transactions), -15.0);
    }

    #[test]
    fn test_by_category_sums_both_types() {
        let transactions = vec![
            tx(50.0, TransactionType::Expense, Category::Food),
            tx(30.0, TransactionType::Income, Category::Food),
        ];

        let totals = by_category(&transactions);
        assert_eq!(totals.get(Category::Food), 80.0);
        for category in Category::ALL.iter().filter(|c| **c != Category::Food) {
            assert_eq!(totals.get(*category), 0.0, "{} should be zero", category);
        }
        assert_eq!(totals.iter().count(), 7);
    }

    #[test]
    fn test_category_totals_serialize_every_key() {
        let json = serde_json::to_value(by_category(&[])).unwrap();
        let map = json.as_object().unwrap();

        assert_eq!(map.len(), 7);
        for category in Category::ALL {
            assert_eq!(map[category.as_str()], 0.0);
        }
    }

    #[test]
    fn test_expense_breakdown_percentages() {
        let transactions = vec![
            tx(75.0, TransactionType::Expense, Category::Food),
            tx(25.0, TransactionType::Expense, Category::Transport),
            tx(1000.0, TransactionType::Income, Category::Food),
        ];

        let breakdown = expense_breakdown(&transactions);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, Category::Food);
        assert_eq!(breakdown[0].amount, 75.0);
        assert_eq!(breakdown[0].percentage, 75.0);
        assert_eq!(breakdown[1].category, Category::Transport);
        assert_eq!(breakdown[1].percentage, 25.0);
    }

    #[test]
    fn test_expense_breakdown_without_expenses() {
        let transactions = vec![tx(500.0, TransactionType::Income, Category::Salary)];
        assert!(expense_breakdown(&transactions).is_empty());
    }

    #[test]
    fn test_summary_matches_individual_functions() {
        let transactions = vec![
            tx(2000.0, TransactionType::Income, Category::Salary),
            tx(800.0, TransactionType::Expense, Category::Housing),
            tx(120.5, TransactionType::Expense, Category::Bills),
        ];

        let summary = Summary::from_transactions(&transactions);
        assert_eq!(summary.total_income, total_income(&transactions));
        assert_eq!(summary.total_expenses, total_expenses(&transactions));
        assert_eq!(summary.balance, balance(&transactions));
        assert_eq!(summary.by_category, by_category(&transactions));
    }
}
