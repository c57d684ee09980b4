// 💸 Transaction Entity - the only record the store keeps
//
// Identity (id) is assigned by the store and never changes.
// Direction lives in `transaction_type`; `amount` is always a magnitude.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// TRANSACTION TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    Income,

    /// Money going out
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(anyhow!("unknown transaction type '{}' (expected income or expense)", other)),
        }
    }
}

// ============================================================================
// CATEGORY
// ============================================================================

/// Closed set of categories. There are no free-form categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Housing,
    Bills,
    Leisure,
    Salary,
    Other,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Housing,
        Category::Bills,
        Category::Leisure,
        Category::Salary,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Housing => "Housing",
            Category::Bills => "Bills",
            Category::Leisure => "Leisure",
            Category::Salary => "Salary",
            Category::Other => "Other",
        }
    }

    /// Position in `Category::ALL`; used as a fixed-size table index
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| anyhow!("unknown category '{}'", wanted))
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// A single recorded income or expense event.
///
/// Only the store creates these (see `ExpenseStore::add`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identity (UUID) - assigned once, never patched
    pub id: String,

    pub description: String,

    /// Positive magnitude; the sign comes from `transaction_type`
    pub amount: f64,

    pub category: Category,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Serialized as an RFC 3339 timestamp in UTC
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    /// Amount with direction applied (expenses negative)
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// Merge the provided fields over this record. `id` is not part of a
    /// patch, so identity survives every merge.
    pub fn apply(&mut self, patch: TransactionPatch) {
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(transaction_type) = patch.transaction_type {
            self.transaction_type = transaction_type;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
    }
}

// ============================================================================
// INPUT SHAPES
// ============================================================================

/// Everything a transaction has except its id.
///
/// No business validation happens here: callers reject empty descriptions
/// and non-positive amounts before handing one to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub category: Category,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub date: DateTime<Utc>,
}

impl NewTransaction {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: Category,
        transaction_type: TransactionType,
        date: DateTime<Utc>,
    ) -> Self {
        NewTransaction {
            description: description.into(),
            amount,
            category,
            transaction_type,
            date,
        }
    }

    pub fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            description: self.description,
            amount: self.amount,
            category: self.category,
            transaction_type: self.transaction_type,
            date: self.date,
        }
    }
}

/// Partial update: `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl TransactionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.transaction_type.is_none()
            && self.date.is_none()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Transaction {
        NewTransaction::new(
            "Groceries",
            42.5,
            Category::Food,
            TransactionType::Expense,
            Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
        )
        .into_transaction("tx-1".to_string())
    }

    #[test]
    fn test_patch_only_touches_provided_fields() {
        let mut tx = sample();
        let before = tx.clone();

        tx.apply(TransactionPatch::new().description("Supermarket"));

        assert_eq!(tx.description, "Supermarket");
        assert_eq!(tx.id, before.id);
        assert_eq!(tx.amount, before.amount);
        assert_eq!(tx.category, before.category);
        assert_eq!(tx.transaction_type, before.transaction_type);
        assert_eq!(tx.date, before.date);
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut tx = sample();
        let before = tx.clone();

        let patch = TransactionPatch::new();
        assert!(patch.is_empty());
        tx.apply(patch);

        assert_eq!(tx, before);
    }

    #[test]
    fn test_signed_amount() {
        let mut tx = sample();
        assert_eq!(tx.signed_amount(), -42.5);

        tx.apply(TransactionPatch::new().transaction_type(TransactionType::Income));
        assert_eq!(tx.signed_amount(), 42.5);
        assert!(tx.is_income());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!(" Salary ".parse::<Category>().unwrap(), Category::Salary);
        assert!("Groceries".parse::<Category>().is_err());

        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
            assert_eq!(category.as_str().parse::<Category>().unwrap(), *category);
        }
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!("INCOME".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!("expense".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["type"], "expense");
        assert_eq!(json["category"], "Food");
        assert_eq!(json["date"], "2024-03-10T12:00:00Z");
        assert!(json.get("transaction_type").is_none());
    }
}
