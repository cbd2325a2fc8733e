//! Asynchronous worker pool for chunked sieving.
//!
//! [`WorkerPool`] owns a fixed set of Tokio tasks running [`worker_loop`].
//! Each worker listens on its own bounded [`mpsc::Receiver`], so a slow chunk
//! applies backpressure to the dispatcher instead of queueing the whole range
//! in memory. All workers observe one shared [`CancellationToken`].

use super::{ChunkOutcome, WorkRequest, worker_loop};
use crate::{ChunkError, PrimeStore, partition::Chunk};
use core::time::Duration;
use futures::future::join_all;
use primeseq::SieveGenerator;
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::timeout,
};
use tokio_util::sync::CancellationToken;

/// Requests buffered per worker before dispatch waits.
const WORKER_QUEUE_DEPTH: usize = 2;

/// How long shutdown waits for each worker to acknowledge.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// A bounded pool of sieve workers.
///
/// Chunks are assigned by index, `chunk.index % size`, which spreads a
/// partition round-robin without any shared counter.
pub struct WorkerPool {
    workers: Vec<mpsc::Sender<WorkRequest>>,
    handles: Vec<JoinHandle<()>>,
    shutdown_token: CancellationToken,
    shutdown_timeout: Duration,
}

impl WorkerPool {
    /// Spawns `num_workers` workers (at least one) on the current runtime.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<S: PrimeStore + ?Sized>(
        num_workers: usize,
        generator: Arc<SieveGenerator<u64>>,
        store: Arc<S>,
        shutdown_token: CancellationToken,
    ) -> Self {
        let num_workers = num_workers.max(1);
        let mut workers = Vec::with_capacity(num_workers);
        let mut handles = Vec::with_capacity(num_workers);

        for worker_id in 0..num_workers {
            let (tx, rx) = mpsc::channel(WORKER_QUEUE_DEPTH);
            handles.push(tokio::spawn(worker_loop(
                worker_id,
                rx,
                Arc::clone(&generator),
                Arc::clone(&store),
                shutdown_token.clone(),
            )));
            workers.push(tx);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Spawned {num_workers} sieve workers");

        Self {
            workers,
            handles,
            shutdown_token,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Overrides how long [`WorkerPool::shutdown`] waits for each worker.
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    /// Number of workers in the pool.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// The worker responsible for `chunk`.
    pub fn worker_for(&self, chunk: &Chunk) -> usize {
        chunk.index % self.workers.len()
    }

    /// Sends a [`WorkRequest`] to the worker at `worker_idx`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The run was cancelled (`shutdown_token` was cancelled).
    /// - The worker's channel is closed.
    pub async fn send_to_worker(
        &self,
        worker_idx: usize,
        request: WorkRequest,
    ) -> Result<(), ChunkError> {
        if self.shutdown_token.is_cancelled() {
            return Err(ChunkError::Cancelled);
        }

        let worker = self
            .workers
            .get(worker_idx)
            .ok_or(ChunkError::WorkerUnavailable { worker: worker_idx })?;

        worker
            .send(request)
            .await
            .map_err(|_| ChunkError::WorkerUnavailable { worker: worker_idx })
    }

    /// Hands `chunk` to its worker and returns the receiver its outcome will
    /// arrive on.
    ///
    /// # Errors
    ///
    /// See [`WorkerPool::send_to_worker`].
    pub async fn dispatch(
        &self,
        chunk: Chunk,
    ) -> Result<oneshot::Receiver<ChunkOutcome>, ChunkError> {
        let (response, rx) = oneshot::channel();
        let worker_idx = self.worker_for(&chunk);
        self.send_to_worker(worker_idx, WorkRequest::Sieve { chunk, response })
            .await?;
        Ok(rx)
    }

    /// Stops every worker once its queue is drained.
    ///
    /// - Sends a [`WorkRequest::Shutdown`] to each worker.
    /// - Waits up to the shutdown timeout per worker for acknowledgements.
    /// - Aborts any worker task that is still running afterwards.
    ///
    /// This does not cancel the shared token; queued chunks are still
    /// processed.
    #[allow(clippy::used_underscore_binding)]
    pub async fn shutdown(self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("Notifying all workers to shut down");

        let mut acks = Vec::with_capacity(self.workers.len());
        for (i, worker) in self.workers.iter().enumerate() {
            let (tx, rx) = oneshot::channel();
            if let Err(_e) = worker.send(WorkRequest::Shutdown { response: tx }).await {
                #[cfg(feature = "tracing")]
                tracing::error!("Failed to send shutdown to worker {i}: {_e}");
            } else {
                acks.push((i, rx));
            }
        }

        let shutdown_timeout = self.shutdown_timeout;
        let ack_futures = acks.into_iter().map(|(_i, rx)| async move {
            match timeout(shutdown_timeout, rx).await {
                Ok(Ok(())) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("Worker {_i} shutdown acknowledged");
                }
                Ok(Err(_e)) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Worker {_i} dropped its acknowledgement: {_e}");
                }
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Worker {_i} shutdown timed out");
                }
            }
        });
        join_all(ack_futures).await;

        for handle in self.handles {
            if !handle.is_finished() {
                handle.abort();
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker pool shutdown complete");
    }

    /// Aborts every worker and waits until each task has stopped.
    ///
    /// A worker interrupted mid-chunk never completes its store write. A
    /// sieve already running on the blocking pool finishes, but its result
    /// is dropped.
    pub async fn abort(self) {
        for handle in &self.handles {
            handle.abort();
        }
        join_all(self.handles).await;

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker pool aborted");
    }
}
