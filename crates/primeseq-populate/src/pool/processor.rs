use super::{ChunkOutcome, ChunkReport};
use crate::{ChunkError, PrimeStore, partition::Chunk};
use primeseq::{PrimeSequenceGenerator, SieveGenerator};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Sieves a single chunk and writes its primes to the store as one batch.
///
/// The sieve runs on Tokio's blocking pool so a large chunk never stalls the
/// async workers. The cancellation token is checked before sieving and again
/// before writing; a chunk cancelled in between is computed but never stored.
///
/// # Errors
///
/// - [`ChunkError::Cancelled`] if `cancel` fired before the write.
/// - [`ChunkError::Generation`] if the sieve rejected the chunk.
/// - [`ChunkError::WorkerPanicked`] if the blocking task panicked.
/// - [`ChunkError::Storage`] if the store rejected the batch.
#[allow(clippy::used_underscore_binding)]
pub async fn sieve_chunk<S: PrimeStore + ?Sized>(
    _worker_id: usize,
    chunk: Chunk,
    generator: &Arc<SieveGenerator<u64>>,
    store: &S,
    cancel: &CancellationToken,
) -> ChunkOutcome {
    if cancel.is_cancelled() {
        return Err(ChunkError::Cancelled);
    }

    let sieve = Arc::clone(generator);
    let primes = tokio::task::spawn_blocking(move || {
        sieve
            .generate(chunk.start, chunk.end, chunk.inclusive)
            .map(|primes| primes.collect::<Vec<u64>>())
    })
    .await
    .map_err(|e| ChunkError::WorkerPanicked {
        reason: e.to_string(),
    })??;

    if cancel.is_cancelled() {
        #[cfg(feature = "tracing")]
        tracing::debug!("Worker {_worker_id} discarding chunk {chunk} after cancellation");
        return Err(ChunkError::Cancelled);
    }

    let primes_stored = primes.len();
    let largest = primes.last().copied();
    store.store_batch(primes).await?;

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} stored {primes_stored} primes for chunk {chunk}");

    Ok(ChunkReport {
        chunk,
        primes_stored,
        largest,
    })
}
