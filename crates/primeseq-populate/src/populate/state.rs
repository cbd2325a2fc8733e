use core::{fmt, time::Duration};

/// Lifecycle of a [`Populator`].
///
/// A skipped run moves straight from `NotStarted` to `Completed`. A `Failed`
/// populator may be run again.
///
/// [`Populator`]: crate::Populator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PopulationState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for PopulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "not started",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// How a successful call to [`Populator::populate`] ended.
///
/// [`Populator::populate`]: crate::Populator::populate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopulationOutcome {
    /// The store was already populated; nothing was generated.
    Skipped { largest: u64 },
    /// Every chunk was generated and stored.
    Completed(PopulationReport),
}

impl PopulationOutcome {
    /// The largest value in the store when the run ended.
    pub const fn largest_stored_value(&self) -> Option<u64> {
        match self {
            Self::Skipped { largest } => Some(*largest),
            Self::Completed(report) => report.largest,
        }
    }

    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Totals for a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PopulationReport {
    pub chunks: usize,
    /// Primes written by this run, including any that were already stored.
    pub primes_stored: u64,
    pub largest: Option<u64>,
    pub elapsed: Duration,
}
