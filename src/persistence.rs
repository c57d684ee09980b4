// Persisted layout of the transaction collection
//
// {
//   "transactions": [
//     { "id": "...", "description": "...", "amount": 12.5,
//       "category": "Food", "type": "expense",
//       "date": "2024-03-10T12:00:00Z" }
//   ]
// }

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// Default namespace the collection is stored under
pub const STORAGE_KEY: &str = "expense-tracker-storage";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub transactions: Vec<Transaction>,
}

/// Serialize the collection. Non-finite amounts are rejected: JSON has no
/// NaN or infinity and the record could not be read back.
pub fn encode(transactions: &[Transaction]) -> Result<String> {
    if let Some(tx) = transactions.iter().find(|tx| !tx.amount.is_finite()) {
        bail!("amount for {} is not a finite number", tx.id);
    }

    #[derive(Serialize)]
    struct Borrowed<'a> {
        transactions: &'a [Transaction],
    }

    serde_json::to_string(&Borrowed { transactions }).context("Failed to serialize transactions")
}

/// Parse a stored record. Unknown fields are ignored; missing or
/// mistyped fields are an error.
pub fn decode(raw: &str) -> Result<Vec<Transaction>> {
    let state: PersistedState =
        serde_json::from_str(raw).context("Failed to parse stored transactions")?;
    Ok(state.transactions)
}

// ============================================================================
// TESTS
// ============================================================================
