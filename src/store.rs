// 🏦 Expense Store - the single mutation authority for transactions
//
// Single writer, many readers. Every committed mutation:
//   1. writes the full collection to storage
//   2. swaps in a fresh shared snapshot
//   3. calls every subscriber synchronously with that snapshot
//
// The write happens first, so a failed write leaves memory, disk and
// subscribers exactly as they were.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::persistence::{self, STORAGE_KEY};
use crate::storage::Storage;
use crate::transaction::{NewTransaction, Transaction, TransactionPatch};

/// Read-only view of the collection at one point in time
pub type Snapshot = Arc<Vec<Transaction>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Snapshot)>;

pub struct ExpenseStore<S: Storage> {
    storage: S,
    key: String,
    transactions: Snapshot,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<S: Storage> ExpenseStore<S> {
    /// Restore the store from `storage` under the default namespace
    pub fn open(storage: S) -> Result<Self> {
        Self::open_with_key(storage, STORAGE_KEY)
    }

    /// Restore the store from `storage` under `key`.
    ///
    /// A missing record gives an empty store, and so does a malformed one
    /// (logged). Only a failure to read storage at all is an error, so a
    /// valid record is never overwritten after a transient read problem.
    pub fn open_with_key(storage: S, key: &str) -> Result<Self> {
        let transactions = restore(&storage, key)?;
        debug!(key, count = transactions.len(), "restored transactions");

        Ok(ExpenseStore {
            storage,
            key: key.to_string(),
            transactions: Arc::new(transactions),
            subscribers: Vec::new(),
            next_subscription: 0,
        })
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Current snapshot; cheap to clone and safe to keep
    pub fn transactions(&self) -> Snapshot {
        Arc::clone(&self.transactions)
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // ========================================================================
    // SUBSCRIPTIONS
    // ========================================================================

    /// Register a callback run after every committed mutation
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&Snapshot) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Append a new transaction with a freshly generated id.
    ///
    /// Fields are stored as given; validating them is the caller's job.
    pub fn add(&mut self, fields: NewTransaction) -> Result<Transaction> {
        let transaction = fields.into_transaction(self.fresh_id());

        let mut next = Vec::with_capacity(self.transactions.len() + 1);
        next.extend(self.transactions.iter().cloned());
        next.push(transaction.clone());

        self.commit(next)?;
        debug!(id = %transaction.id, "added transaction");
        Ok(transaction)
    }

    /// Merge `patch` over the transaction with `id`.
    ///
    /// Unknown ids are a silent no-op: returns `Ok(false)` without writing
    /// or notifying.
    pub fn update(&mut self, id: &str, patch: TransactionPatch) -> Result<bool> {
        let Some(position) = self.position(id) else {
            debug!(id, "update skipped, no such transaction");
            return Ok(false);
        };

        let mut next = self.transactions.as_ref().clone();
        next[position].apply(patch);

        self.commit(next)?;
        debug!(id, "updated transaction");
        Ok(true)
    }

    /// Remove the transaction with `id`. Unknown ids are a silent no-op.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(position) = self.position(id) else {
            debug!(id, "delete skipped, no such transaction");
            return Ok(false);
        };

        let mut next = self.transactions.as_ref().clone();
        next.remove(position);

        self.commit(next)?;
        debug!(id, "deleted transaction");
        Ok(true)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn position(&self, id: &str) -> Option<usize> {
        self.transactions.iter().position(|tx| tx.id == id)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if self.position(&id).is_none() {
                return id;
            }
        }
    }

    fn commit(&mut self, next: Vec<Transaction>) -> Result<()> {
        let raw = persistence::encode(&next)?;
        self.storage.set_item(&self.key, &raw)?;

        self.transactions = Arc::new(next);

        let snapshot = Arc::clone(&self.transactions);
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&snapshot);
        }
        Ok(())
    }
}

/// Load the collection stored under `key`; malformed data degrades to empty
fn restore<S: Storage>(storage: &S, key: &str) -> Result<Vec<Transaction>> {
    let Some(raw) = storage
        .get_item(key)
        .with_context(|| format!("Failed to load transactions from '{}'", key))?
    else {
        return Ok(Vec::new());
    };

    let transactions = match persistence::decode(&raw) {
        Ok(transactions) => transactions,
        Err(e) => {
            let error = format!("{:#}", e);
            warn!(key, %error, "stored transactions are malformed, starting empty");
            return Ok(Vec::new());
        }
    };

    // ids must stay unique; keep the first occurrence
    let mut seen = HashSet::new();
    let total = transactions.len();
    let unique: Vec<Transaction> = transactions
        .into_iter()
        .filter(|tx| seen.insert(tx.id.clone()))
        .collect();
    if unique.len() != total {
        warn!(key, dropped = total - unique.len(), "dropped transactions with duplicate ids");
    }
    Ok(unique)
}

// ============================================================================
// TESTS
// ============================================================================
