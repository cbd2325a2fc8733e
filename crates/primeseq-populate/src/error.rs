use crate::partition::Chunk;
use core::{fmt, time::Duration};

/// A result type defaulting to [`PopulateError`].
pub type Result<T, E = PopulateError> = core::result::Result<T, E>;

/// Failures reported by a [`PrimeStore`] implementation.
///
/// Storage errors are propagated as-is and never retried.
///
/// [`PrimeStore`]: crate::PrimeStore
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("store unavailable: {context}")]
    Unavailable { context: String },

    #[error("batch of {len} values rejected: {context}")]
    Rejected { len: usize, context: String },
}

/// Why a single chunk did not complete.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error("generation failed: {0}")]
    Generation(#[from] primeseq::Error),

    #[error("worker panicked: {reason}")]
    WorkerPanicked { reason: String },

    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("cancelled before completion")]
    Cancelled,

    #[error("worker {worker} is unavailable")]
    WorkerUnavailable { worker: usize },
}

/// A chunk paired with the reason it failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkFailure {
    pub chunk: Chunk,
    pub error: ChunkError,
}

impl fmt::Display for ChunkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {}: {}", self.chunk, self.error)
    }
}

/// Errors that end a population run.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PopulateError {
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The shared base primes for the run could not be computed.
    #[error("generation setup failed: {0}")]
    Generation(#[from] primeseq::Error),

    #[error("generation setup panicked: {reason}")]
    SetupPanicked { reason: String },

    /// At least one chunk failed. Every failure is listed, in chunk order.
    #[error("{} of {total} chunks failed: {}", .failures.len(), summarize(.failures))]
    ChunksFailed {
        total: usize,
        failures: Vec<ChunkFailure>,
    },

    #[error("population timed out after {elapsed:?}")]
    TimedOut { elapsed: Duration },

    #[error("population cancelled")]
    Cancelled,

    #[error("a population run is already in progress")]
    AlreadyRunning,
}

impl PopulateError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// The chunks that failed, if this is [`PopulateError::ChunksFailed`].
    pub fn failed_chunks(&self) -> &[ChunkFailure] {
        match self {
            Self::ChunksFailed { failures, .. } => failures,
            _ => &[],
        }
    }
}

fn summarize(failures: &[ChunkFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
