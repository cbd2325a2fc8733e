//! The persistence collaborator consumed by the population orchestrator.
//!
//! Only two queries are required to populate: the largest value already
//! stored (to skip work that is done) and an idempotent batch sink. The
//! completion marker distinguishes a finished run from one that was
//! interrupted after some chunks had been written.

use crate::StorageError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;

/// A sink for generated primes.
///
/// Implementations must be safe to share across workers. `store_batch` must
/// be idempotent: writing a value that is already present is not an error and
/// does not duplicate it.
#[async_trait]
pub trait PrimeStore: Send + Sync + 'static {
    /// The largest value stored so far, or `None` for an empty store.
    async fn largest_stored_value(&self) -> Result<Option<u64>, StorageError>;

    /// Persists one chunk's primes as a single write.
    async fn store_batch(&self, values: Vec<u64>) -> Result<(), StorageError>;

    /// Whether a previous run completed every chunk.
    async fn is_populated(&self) -> Result<bool, StorageError>;

    /// Records that every chunk up to and including `up_to` was stored.
    async fn mark_populated(&self, up_to: u64) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct Inner {
    values: BTreeSet<u64>,
    populated_up_to: Option<u64>,
    batch_writes: usize,
}

/// An ordered, deduplicating in-memory [`PrimeStore`].
///
/// # Example
/// ```
/// use primeseq_populate::{MemoryStore, PrimeStore};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = MemoryStore::new();
/// store.store_batch(vec![7, 2, 5]).await.unwrap();
/// store.store_batch(vec![5, 3]).await.unwrap();
///
/// assert_eq!(store.values(), [2, 3, 5, 7]);
/// assert_eq!(store.largest_stored_value().await.unwrap(), Some(7));
/// assert!(!store.is_populated().await.unwrap());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().values.is_empty()
    }

    /// Every stored value in ascending order.
    pub fn values(&self) -> Vec<u64> {
        self.inner.lock().values.iter().copied().collect()
    }

    /// Stored values in `[from, up_to]`, ascending.
    pub fn range(&self, from: u64, up_to: u64) -> Vec<u64> {
        if from > up_to {
            return Vec::new();
        }
        self.inner.lock().values.range(from..=up_to).copied().collect()
    }

    /// How many `store_batch` calls succeeded.
    pub fn batch_writes(&self) -> usize {
        self.inner.lock().batch_writes
    }

    /// The bound recorded by the last completed run.
    pub fn populated_up_to(&self) -> Option<u64> {
        self.inner.lock().populated_up_to
    }
}

#[async_trait]
impl PrimeStore for MemoryStore {
    async fn largest_stored_value(&self) -> Result<Option<u64>, StorageError> {
        Ok(self.inner.lock().values.last().copied())
    }

    async fn store_batch(&self, values: Vec<u64>) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        inner.values.extend(values);
        inner.batch_writes += 1;
        Ok(())
    }

    async fn is_populated(&self) -> Result<bool, StorageError> {
        Ok(self.inner.lock().populated_up_to.is_some())
    }

    async fn mark_populated(&self, up_to: u64) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        inner.populated_up_to = Some(inner.populated_up_to.map_or(up_to, |v| v.max(up_to)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.largest_stored_value().await.unwrap(), None);
        assert!(!store.is_populated().await.unwrap());
        assert_eq!(store.batch_writes(), 0);
    }

    #[tokio::test]
    async fn batches_are_idempotent_and_ordered() {
        let store = MemoryStore::new();
        store.store_batch(vec![11, 13, 17]).await.unwrap();
        store.store_batch(vec![2, 3, 5, 7]).await.unwrap();
        store.store_batch(vec![11, 13, 17]).await.unwrap();

        assert_eq!(store.values(), [2, 3, 5, 7, 11, 13, 17]);
        assert_eq!(store.len(), 7);
        assert_eq!(store.batch_writes(), 3);
        assert_eq!(store.largest_stored_value().await.unwrap(), Some(17));
        assert_eq!(store.range(4, 13), [5, 7, 11, 13]);
        assert!(store.range(13, 4).is_empty());
    }

    #[tokio::test]
    async fn marker_keeps_the_widest_bound() {
        let store = MemoryStore::new();
        store.mark_populated(100).await.unwrap();
        store.mark_populated(50).await.unwrap();
        assert!(store.is_populated().await.unwrap());
        assert_eq!(store.populated_up_to(), Some(100));
    }
}
