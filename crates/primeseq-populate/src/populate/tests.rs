use crate::{
    ChunkError, MemoryStore, PopulateConfig, PopulateError, PopulationOutcome, PopulationState,
    Populator, PrimeStore, StorageError,
};
use async_trait::async_trait;
use core::time::Duration;
use primeseq::{PrimeSequenceGenerator, SieveGenerator};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

fn sieve(from: u64, up_to: u64) -> Vec<u64> {
    SieveGenerator::<u64>::new()
        .generate(from, up_to, true)
        .unwrap()
        .collect()
}

fn config(from: u64, up_to: u64, batch_size: u64, num_workers: usize) -> PopulateConfig {
    PopulateConfig::new(from, up_to, batch_size)
        .unwrap()
        .with_num_workers(num_workers)
        .unwrap()
}

/// Rejects any batch containing one of `poisoned` while `failing` is set.
struct FlakyStore {
    inner: MemoryStore,
    poisoned: Vec<u64>,
    failing: AtomicBool,
}

impl FlakyStore {
    fn poisoned(values: &[u64]) -> Self {
        Self {
            inner: MemoryStore::new(),
            poisoned: values.to_vec(),
            failing: AtomicBool::new(true),
        }
    }

    fn heal(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl PrimeStore for FlakyStore {
    async fn largest_stored_value(&self) -> Result<Option<u64>, StorageError> {
        self.inner.largest_stored_value().await
    }

    async fn store_batch(&self, values: Vec<u64>) -> Result<(), StorageError> {
        let poisoned = values.iter().any(|v| self.poisoned.contains(v));
        if poisoned && self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected {
                len: values.len(),
                context: "poisoned value".to_string(),
            });
        }
        self.inner.store_batch(values).await
    }

    async fn is_populated(&self) -> Result<bool, StorageError> {
        self.inner.is_populated().await
    }

    async fn mark_populated(&self, up_to: u64) -> Result<(), StorageError> {
        self.inner.mark_populated(up_to).await
    }
}

/// Holds every batch for `delay` before storing it.
struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

#[async_trait]
impl PrimeStore for SlowStore {
    async fn largest_stored_value(&self) -> Result<Option<u64>, StorageError> {
        self.inner.largest_stored_value().await
    }

    async fn store_batch(&self, values: Vec<u64>) -> Result<(), StorageError> {
        tokio::time::sleep(self.delay).await;
        self.inner.store_batch(values).await
    }

    async fn is_populated(&self) -> Result<bool, StorageError> {
        self.inner.is_populated().await
    }

    async fn mark_populated(&self, up_to: u64) -> Result<(), StorageError> {
        self.inner.mark_populated(up_to).await
    }
}

/// A store whose every query fails.
struct OfflineStore;

#[async_trait]
impl PrimeStore for OfflineStore {
    async fn largest_stored_value(&self) -> Result<Option<u64>, StorageError> {
        Err(StorageError::Unavailable {
            context: "connection refused".to_string(),
        })
    }

    async fn store_batch(&self, _values: Vec<u64>) -> Result<(), StorageError> {
        unreachable!("population must stop at the skip check")
    }

    async fn is_populated(&self) -> Result<bool, StorageError> {
        unreachable!("population must stop at the skip check")
    }

    async fn mark_populated(&self, _up_to: u64) -> Result<(), StorageError> {
        unreachable!("population must stop at the skip check")
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn matches_a_single_pass_sieve() {
    let store = Arc::new(MemoryStore::new());
    let populator = Populator::new(Arc::clone(&store), config(2, 100_000, 7_919, 4));
    assert_eq!(populator.state(), PopulationState::NotStarted);

    let outcome = populator.populate().await.unwrap();
    let expected = sieve(2, 100_000);

    let PopulationOutcome::Completed(report) = outcome else {
        panic!("expected a completed run, got {outcome:?}");
    };
    assert_eq!(report.chunks, 13);
    assert_eq!(report.primes_stored, 9_592);
    assert_eq!(report.largest, Some(99_991));
    assert_eq!(store.values(), expected);
    assert_eq!(store.batch_writes(), 13);
    assert_eq!(store.populated_up_to(), Some(100_000));
    assert_eq!(populator.state(), PopulationState::Completed);
}

#[tokio::test]
async fn chunk_boundaries_do_not_drop_or_duplicate_primes() {
    // Batches of 10 from 2 put 2, 3, 13, 23 ... on or next to chunk edges.
    let store = Arc::new(MemoryStore::new());
    let populator = Populator::new(Arc::clone(&store), config(2, 1_000, 10, 3));

    populator.populate().await.unwrap();
    assert_eq!(store.values(), sieve(2, 1_000));
    assert_eq!(store.batch_writes(), populator.chunks().len());
}

#[tokio::test]
async fn completed_store_is_skipped() {
    let store = Arc::new(MemoryStore::new());
    let populator = Populator::new(Arc::clone(&store), config(2, 10_000, 1_000, 2));
    populator.populate().await.unwrap();
    let writes = store.batch_writes();

    // A fresh populator over the same store sees the marker.
    let again = Populator::new(Arc::clone(&store), config(2, 10_000, 1_000, 2));
    let outcome = again.populate().await.unwrap();

    assert_eq!(outcome, PopulationOutcome::Skipped { largest: 9_973 });
    assert!(outcome.is_skipped());
    assert_eq!(store.batch_writes(), writes);
    assert_eq!(again.state(), PopulationState::Completed);
}

#[tokio::test]
async fn failed_chunks_are_reported_and_block_completion() {
    // 7_507 falls in chunk #7 and 9_973 in chunk #9.
    let store = Arc::new(FlakyStore::poisoned(&[7_507, 9_973]));
    let populator = Populator::new(Arc::clone(&store), config(2, 10_000, 1_000, 4));

    let err = populator.populate().await.unwrap_err();
    let failures = err.failed_chunks();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].chunk.index, 7);
    assert_eq!(failures[1].chunk.index, 9);
    assert!(failures.iter().all(|f| matches!(
        f.error,
        ChunkError::Storage(StorageError::Rejected { .. })
    )));
    assert!(matches!(err, PopulateError::ChunksFailed { total: 10, .. }));
    assert!(err.to_string().starts_with("2 of 10 chunks failed: chunk #7 [7002, 8002)"));

    // Sibling chunks were not aborted, but the run is not marked complete.
    assert_eq!(store.inner.batch_writes(), 8);
    assert!(!store.is_populated().await.unwrap());
    assert_eq!(populator.state(), PopulationState::Failed);

    // The values without a marker are treated as an interrupted run.
    store.heal();
    let outcome = populator.populate().await.unwrap();
    assert!(!outcome.is_skipped());
    assert_eq!(store.inner.values(), sieve(2, 10_000));
    assert!(store.is_populated().await.unwrap());
    assert_eq!(populator.state(), PopulationState::Completed);
}

#[tokio::test]
async fn interrupted_store_is_repopulated() {
    let store = Arc::new(MemoryStore::new());
    store.store_batch(vec![2, 3, 5, 7]).await.unwrap();

    let populator = Populator::new(Arc::clone(&store), config(2, 500, 100, 2));
    let outcome = populator.populate().await.unwrap();

    assert!(!outcome.is_skipped());
    assert_eq!(outcome.largest_stored_value(), Some(499));
    assert_eq!(store.values(), sieve(2, 500));
    assert_eq!(store.batch_writes(), 1 + populator.chunks().len());
}

#[tokio::test]
async fn prime_free_range_completes_without_values() {
    let store = Arc::new(MemoryStore::new());
    let populator = Populator::new(Arc::clone(&store), config(24, 28, 2, 2));

    let outcome = populator.populate().await.unwrap();
    assert_eq!(outcome.largest_stored_value(), None);
    assert!(store.is_empty());
    assert!(store.is_populated().await.unwrap());

    // An empty store is never skipped, even with the marker present.
    let again = populator.populate().await.unwrap();
    assert!(!again.is_skipped());
}

#[tokio::test]
async fn cancelled_run_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let populator = Populator::new(Arc::clone(&store), config(2, 10_000, 100, 2));
    populator.cancellation_token().cancel();

    let err = populator.populate().await.unwrap_err();
    assert_eq!(err, PopulateError::Cancelled);
    assert!(store.is_empty());
    assert!(!store.is_populated().await.unwrap());
    assert_eq!(populator.state(), PopulationState::Failed);
}

#[tokio::test]
async fn timeout_fails_the_run() {
    let store = Arc::new(SlowStore {
        inner: MemoryStore::new(),
        delay: Duration::from_secs(30),
    });
    let config = config(2, 10_000, 1_000, 2).with_timeout(Some(Duration::from_millis(100)));
    let populator = Populator::new(Arc::clone(&store), config);

    let err = populator.populate().await.unwrap_err();
    let PopulateError::TimedOut { elapsed } = err else {
        panic!("expected a timeout, got {err:?}");
    };
    assert!(elapsed >= Duration::from_millis(100));
    assert!(!store.is_populated().await.unwrap());
    assert_eq!(populator.state(), PopulationState::Failed);
}

#[tokio::test]
async fn timed_out_run_leaves_no_late_writers() {
    let store = Arc::new(SlowStore {
        inner: MemoryStore::new(),
        delay: Duration::from_millis(300),
    });
    let config = config(2, 10_000, 1_000, 2).with_timeout(Some(Duration::from_millis(100)));
    let populator = Populator::new(Arc::clone(&store), config);

    let err = populator.populate().await.unwrap_err();
    assert!(matches!(err, PopulateError::TimedOut { .. }), "{err:?}");
    let writes_at_return = store.inner.batch_writes();
    let values_at_return = store.inner.len();

    // Long enough for any in-flight batch to have landed.
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(store.inner.batch_writes(), writes_at_return);
    assert_eq!(store.inner.len(), values_at_return);
    assert!(!store.is_populated().await.unwrap());
}

#[tokio::test]
async fn concurrent_runs_are_rejected() {
    let store = Arc::new(SlowStore {
        inner: MemoryStore::new(),
        delay: Duration::from_millis(200),
    });
    let populator = Arc::new(Populator::new(store, config(2, 100, 10, 1)));

    let background = {
        let populator = Arc::clone(&populator);
        tokio::spawn(async move { populator.populate().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(populator.state(), PopulationState::Running);
    assert_eq!(
        populator.populate().await.unwrap_err(),
        PopulateError::AlreadyRunning
    );

    populator.cancellation_token().cancel();
    let err = background.await.unwrap().unwrap_err();
    assert_eq!(err, PopulateError::Cancelled);
}

#[tokio::test]
async fn storage_errors_surface_from_the_skip_check() {
    let populator = Populator::new(Arc::new(OfflineStore), config(2, 100, 10, 1));
    let err = populator.populate().await.unwrap_err();
    assert!(matches!(
        err,
        PopulateError::Storage(StorageError::Unavailable { .. })
    ));
    assert_eq!(populator.state(), PopulationState::Failed);
}
