// Expense Tracker - Core Library
// Transaction store, persistence and pure aggregation, used by the CLI and tests

pub mod transaction;
pub mod aggregator;
pub mod storage;
pub mod persistence;
pub mod store;
pub mod filter;

// Re-export commonly used types
pub use transaction::{
    Category, NewTransaction, Transaction, TransactionPatch, TransactionType,
};
pub use aggregator::{
    balance, by_category, expense_breakdown, total_expenses, total_income,
    CategoryShare, CategoryTotals, Summary,
};
pub use storage::{MemoryStorage, SqliteStorage, Storage};
pub use persistence::{PersistedState, STORAGE_KEY};
pub use store::{ExpenseStore, Snapshot, SubscriptionId};
pub use filter::{sort_newest_first, CategoryFilter, Period, TransactionFilter, TypeFilter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
