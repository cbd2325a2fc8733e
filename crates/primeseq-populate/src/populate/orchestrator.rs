use super::{PopulationOutcome, PopulationReport, PopulationState};
use crate::{
    ChunkError, ChunkFailure, PopulateConfig, PopulateError, PrimeStore, Result,
    partition::{Chunk, partition},
    pool::{ChunkOutcome, WorkerPool},
};
use futures::future::join_all;
use parking_lot::Mutex;
use primeseq::{BasePrimes, SieveGenerator};
use std::{sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;

#[cfg(feature = "tracing")]
use tracing::instrument;

struct RunSummary {
    chunks: usize,
    primes_stored: u64,
}

/// Fills a [`PrimeStore`] with every prime in the configured range.
///
/// The range is split with [`partition`], each chunk is sieved by one worker
/// of a [`WorkerPool`], and the run waits for every chunk before it reports.
/// A chunk failure never aborts its siblings, but the completion marker is
/// only written when all chunks succeeded, so a failed or interrupted run is
/// repeated in full on the next call.
///
/// # Example
/// ```
/// use primeseq_populate::{MemoryStore, PopulateConfig, PopulationOutcome, Populator};
/// use std::sync::Arc;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = Arc::new(MemoryStore::new());
/// let config = PopulateConfig::new(2, 100, 10).unwrap();
/// let populator = Populator::new(Arc::clone(&store), config);
///
/// let outcome = populator.populate().await.unwrap();
/// assert_eq!(outcome.largest_stored_value(), Some(97));
/// assert_eq!(store.len(), 25);
///
/// // A completed store is never populated twice.
/// let again = populator.populate().await.unwrap();
/// assert_eq!(again, PopulationOutcome::Skipped { largest: 97 });
/// # });
/// ```
pub struct Populator<S: PrimeStore + ?Sized> {
    store: Arc<S>,
    config: PopulateConfig,
    state: Mutex<PopulationState>,
    run_lock: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
}

impl<S: PrimeStore + ?Sized> Populator<S> {
    pub fn new(store: Arc<S>, config: PopulateConfig) -> Self {
        Self {
            store,
            config,
            state: Mutex::new(PopulationState::NotStarted),
            run_lock: tokio::sync::Mutex::new(()),
            cancel: CancellationToken::new(),
        }
    }

    pub const fn config(&self) -> &PopulateConfig {
        &self.config
    }

    pub fn state(&self) -> PopulationState {
        *self.state.lock()
    }

    /// A handle that cancels the current and every later run.
    ///
    /// Chunks already being sieved finish computing but are not stored.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The chunks a run would dispatch.
    pub fn chunks(&self) -> Vec<Chunk> {
        partition(
            self.config.populate_from(),
            self.config.populate_up_to(),
            self.config.batch_size(),
        )
    }

    /// Populates the store unless a previous run already completed.
    ///
    /// # Errors
    ///
    /// - [`PopulateError::AlreadyRunning`] if another call is in progress.
    /// - [`PopulateError::Storage`] if the skip check or the completion
    ///   marker could not be read or written.
    /// - [`PopulateError::ChunksFailed`] listing every chunk that failed.
    /// - [`PopulateError::TimedOut`] if the configured timeout elapsed.
    /// - [`PopulateError::Cancelled`] if the cancellation token fired.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self),
            fields(
                from = self.config.populate_from(),
                up_to = self.config.populate_up_to(),
                batch_size = self.config.batch_size().get(),
            )
        )
    )]
    pub async fn populate(&self) -> Result<PopulationOutcome> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            return Err(PopulateError::AlreadyRunning);
        };

        let result = self.populate_exclusive().await;
        *self.state.lock() = match &result {
            Ok(_) => PopulationState::Completed,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Population failed: {_e}");
                PopulationState::Failed
            }
        };
        result
    }

    async fn populate_exclusive(&self) -> Result<PopulationOutcome> {
        let started = Instant::now();

        if let Some(largest) = self.store.largest_stored_value().await? {
            if self.store.is_populated().await? {
                #[cfg(feature = "tracing")]
                tracing::info!("Store already populated up to {largest}, skipping");
                return Ok(PopulationOutcome::Skipped { largest });
            }
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "Store holds values up to {largest} without a completion marker, re-populating"
            );
        }

        *self.state.lock() = PopulationState::Running;
        let run_token = self.cancel.child_token();
        let deadline = self
            .config
            .timeout()
            .map(|budget| tokio::time::Instant::from_std(started) + budget);
        let summary = self.run_chunks(&run_token, deadline, started).await?;

        let up_to = self.config.populate_up_to();
        self.store.mark_populated(up_to).await?;
        let largest = self.store.largest_stored_value().await?;

        let report = PopulationReport {
            chunks: summary.chunks,
            primes_stored: summary.primes_stored,
            largest,
            elapsed: started.elapsed(),
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Populated {} primes in {} chunks ({:?}), largest stored value {:?}",
            report.primes_stored,
            report.chunks,
            report.elapsed,
            report.largest
        );

        Ok(PopulationOutcome::Completed(report))
    }

    /// Dispatches every chunk and waits for all of them, or until `deadline`.
    ///
    /// On timeout the workers are aborted and awaited before returning, so no
    /// batch reaches the store after the run has reported failure.
    async fn run_chunks(
        &self,
        token: &CancellationToken,
        deadline: Option<tokio::time::Instant>,
        started: Instant,
    ) -> Result<RunSummary> {
        let chunks = self.chunks();
        let up_to = self.config.populate_up_to();

        // Computed once for the whole run; every chunk shares the table.
        let base = tokio::task::spawn_blocking(move || BasePrimes::for_ceiling(up_to))
            .await
            .map_err(|e| PopulateError::SetupPanicked {
                reason: e.to_string(),
            })??;
        let generator = Arc::new(SieveGenerator::with_base_primes(Arc::new(base)));

        let pool = WorkerPool::spawn(
            self.config.num_workers(),
            generator,
            Arc::clone(&self.store),
            token.clone(),
        );

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Dispatching {} chunks to {} workers",
            chunks.len(),
            pool.size()
        );

        let joined = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, dispatch_and_join(&pool, &chunks))
                .await
                .ok(),
            None => Some(dispatch_and_join(&pool, &chunks).await),
        };
        let Some((mut failures, outcomes)) = joined else {
            token.cancel();
            pool.abort().await;
            return Err(PopulateError::TimedOut {
                elapsed: started.elapsed(),
            });
        };

        pool.shutdown().await;

        let mut primes_stored = 0_u64;
        for (chunk, outcome) in outcomes {
            match outcome {
                Ok(report) => primes_stored += report.primes_stored as u64,
                Err(error) => failures.push(ChunkFailure { chunk, error }),
            }
        }

        if token.is_cancelled() {
            return Err(PopulateError::Cancelled);
        }
        if !failures.is_empty() {
            failures.sort_by_key(|failure| failure.chunk.index);
            return Err(PopulateError::ChunksFailed {
                total: chunks.len(),
                failures,
            });
        }

        Ok(RunSummary {
            chunks: chunks.len(),
            primes_stored,
        })
    }
}

/// Hands every chunk to the pool, then waits on every outcome.
///
/// Chunks that could not be dispatched are returned as failures right away.
async fn dispatch_and_join(
    pool: &WorkerPool,
    chunks: &[Chunk],
) -> (Vec<ChunkFailure>, Vec<(Chunk, ChunkOutcome)>) {
    let mut failures = Vec::new();
    let mut pending = Vec::with_capacity(chunks.len());
    for &chunk in chunks {
        match pool.dispatch(chunk).await {
            Ok(rx) => pending.push((chunk, pool.worker_for(&chunk), rx)),
            Err(error) => failures.push(ChunkFailure { chunk, error }),
        }
    }

    let outcomes = join_all(pending.into_iter().map(|(chunk, worker, rx)| async move {
        let outcome: ChunkOutcome = rx
            .await
            .unwrap_or(Err(ChunkError::WorkerUnavailable { worker }));
        (chunk, outcome)
    }))
    .await;

    (failures, outcomes)
}
