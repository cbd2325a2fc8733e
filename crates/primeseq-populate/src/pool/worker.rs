use super::{WorkRequest, sieve_chunk};
use crate::PrimeStore;
use primeseq::SieveGenerator;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Worker task responsible for processing [`WorkRequest`] messages.
///
/// Every worker shares the same [`SieveGenerator`], whose base primes were
/// computed once for the whole run, but each chunk allocates its own marks.
/// The worker listens on its MPSC channel until it receives
/// [`WorkRequest::Shutdown`] or every sender is dropped.
///
/// # Request Types
///
/// - [`WorkRequest::Sieve`] sieves and stores one chunk via [`sieve_chunk`],
///   then reports the outcome.
/// - [`WorkRequest::Shutdown`] acknowledges and stops the worker.
#[allow(clippy::used_underscore_binding)]
pub async fn worker_loop<S: PrimeStore + ?Sized>(
    worker_id: usize,
    mut rx: mpsc::Receiver<WorkRequest>,
    generator: Arc<SieveGenerator<u64>>,
    store: Arc<S>,
    cancel: CancellationToken,
) {
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    while let Some(work) = rx.recv().await {
        match work {
            WorkRequest::Sieve { chunk, response } => {
                let outcome =
                    sieve_chunk(worker_id, chunk, &generator, store.as_ref(), &cancel).await;
                if response.send(outcome).is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Worker {worker_id} could not report chunk {chunk}");
                }
            }
            WorkRequest::Shutdown { response } => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Worker {worker_id} received shutdown signal");

                if response.send(()).is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Worker {worker_id} failed to acknowledge shutdown");
                }
                break;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");
}
