use crate::{PopulateError, Result};
use core::{num::NonZeroU64, time::Duration};
use primeseq::DEFAULT_MAX_SPAN;

pub const DEFAULT_BATCH_SIZE: NonZeroU64 = match NonZeroU64::new(1_000_000) {
    Some(batch_size) => batch_size,
    None => panic!("default batch size must be non-zero"),
};
pub const DEFAULT_POPULATE_FROM: u64 = 2;
pub const DEFAULT_POPULATE_UP_TO: u64 = 10_000_000;

/// Validated settings for a population run.
///
/// Construct with [`PopulateConfig::new`]; the fields can only hold values
/// that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateConfig {
    batch_size: NonZeroU64,
    populate_from: u64,
    populate_up_to: u64,
    num_workers: usize,
    timeout: Option<Duration>,
}

impl Default for PopulateConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            populate_from: DEFAULT_POPULATE_FROM,
            populate_up_to: DEFAULT_POPULATE_UP_TO,
            num_workers: num_cpus::get().max(1),
            timeout: None,
        }
    }
}

impl PopulateConfig {
    /// Validates the population range and batch size.
    ///
    /// # Errors
    ///
    /// Returns [`PopulateError::InvalidConfig`] if:
    /// - `batch_size` is zero or wider than a single sieve may span
    /// - `populate_from` is below 2
    /// - `populate_up_to` is below `populate_from`
    pub fn new(populate_from: u64, populate_up_to: u64, batch_size: u64) -> Result<Self> {
        let Some(batch_size) = NonZeroU64::new(batch_size) else {
            return Err(PopulateError::invalid_config(
                "BATCH_SIZE must be greater than 0",
            ));
        };
        // The final chunk also carries the closing bound.
        if batch_size.get() >= DEFAULT_MAX_SPAN {
            return Err(PopulateError::invalid_config(format!(
                "BATCH_SIZE ({batch_size}) must be less than {DEFAULT_MAX_SPAN}"
            )));
        }
        if populate_from < 2 {
            return Err(PopulateError::invalid_config(format!(
                "POPULATE_FROM ({populate_from}) must be at least 2"
            )));
        }
        if populate_up_to < populate_from {
            return Err(PopulateError::invalid_config(format!(
                "POPULATE_UP_TO ({populate_up_to}) must be greater than or equal to POPULATE_FROM ({populate_from})"
            )));
        }
        Ok(Self {
            batch_size,
            populate_from,
            populate_up_to,
            ..Self::default()
        })
    }

    /// Sets the size of the worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`PopulateError::InvalidConfig`] if `num_workers` is zero.
    pub fn with_num_workers(mut self, num_workers: usize) -> Result<Self> {
        if num_workers == 0 {
            return Err(PopulateError::invalid_config(
                "NUM_WORKERS must be greater than 0",
            ));
        }
        self.num_workers = num_workers;
        Ok(self)
    }

    /// Bounds the wall-clock duration of a run.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn batch_size(&self) -> NonZeroU64 {
        self.batch_size
    }

    pub const fn populate_from(&self) -> u64 {
        self.populate_from
    }

    pub const fn populate_up_to(&self) -> u64 {
        self.populate_up_to
    }

    pub const fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
