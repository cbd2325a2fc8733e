use crate::{ChunkError, partition::Chunk};
use tokio::sync::oneshot;

/// The result of one chunk, delivered back to the orchestrator.
pub type ChunkOutcome = Result<ChunkReport, ChunkError>;

/// What a worker stored for a chunk that succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkReport {
    pub chunk: Chunk,
    pub primes_stored: usize,
    /// The largest prime in the chunk, `None` for a prime-free chunk.
    pub largest: Option<u64>,
}

/// A unit of work sent to a pool worker.
#[derive(Debug)]
pub enum WorkRequest {
    /// Sieve `chunk`, store its primes and report on `response`.
    Sieve {
        chunk: Chunk,
        response: oneshot::Sender<ChunkOutcome>,
    },
    /// Stop the worker after acknowledging on `response`.
    Shutdown { response: oneshot::Sender<()> },
}
