use crate::{
    Error, Result,
    generator::{PrimeSequenceGenerator, RestartableSequence},
    primality::{MILLER_RABIN_ROUNDS, next_probable_prime_with_rounds},
};
use core::{cmp::Ordering, iter::FusedIterator};
use num_bigint::BigUint;
use num_traits::Zero;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// An arbitrary-precision generator that walks a range by repeatedly probing
/// for the next probable prime.
///
/// Every emitted value passed a Miller-Rabin test whose false-positive
/// probability is bounded by `2^-`[`CERTAINTY`]. Values below `3.3 * 10^24`
/// are decided exactly.
///
/// ## Features
/// - ✅ Unbounded numeric domain
/// - ✅ Constant memory, no allocation proportional to the span
/// - ❌ Slower than [`SieveGenerator`] for dense ranges
///
/// ## Recommended When
/// - The bounds exceed `u64`
/// - The range is a sparse window between large bounds
///
/// [`CERTAINTY`]: crate::CERTAINTY
/// [`SieveGenerator`]: crate::SieveGenerator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbabilisticGenerator {
    rounds: u32,
}

impl Default for ProbabilisticGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbabilisticGenerator {
    /// Creates a generator using [`MILLER_RABIN_ROUNDS`] rounds per candidate.
    ///
    /// [`MILLER_RABIN_ROUNDS`]: crate::MILLER_RABIN_ROUNDS
    pub const fn new() -> Self {
        Self {
            rounds: MILLER_RABIN_ROUNDS,
        }
    }

    /// Creates a generator with an explicit number of Miller-Rabin rounds.
    ///
    /// Lowering the rounds below [`MILLER_RABIN_ROUNDS`] weakens the declared
    /// bound for candidates above `3.3 * 10^24` only.
    ///
    /// [`MILLER_RABIN_ROUNDS`]: crate::MILLER_RABIN_ROUNDS
    pub const fn with_rounds(rounds: u32) -> Self {
        Self { rounds }
    }

    pub const fn rounds(&self) -> u32 {
        self.rounds
    }
}

impl PrimeSequenceGenerator for ProbabilisticGenerator {
    type Number = BigUint;
    type Sequence = ProbablePrimes;

    /// # Example
    /// ```
    /// use num_bigint::BigUint;
    /// use primeseq::{PrimeSequenceGenerator, ProbabilisticGenerator};
    ///
    /// let generator = ProbabilisticGenerator::new();
    /// let primes: Vec<BigUint> = generator
    ///     .generate(BigUint::from(2_u32), BigUint::from(13_u32), false)
    ///     .unwrap()
    ///     .collect();
    /// assert_eq!(primes, [2_u32, 3, 5, 7, 11].map(BigUint::from));
    /// ```
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(%from, %up_to, inclusive))
    )]
    fn generate(&self, from: BigUint, up_to: BigUint, inclusive: bool) -> Result<ProbablePrimes> {
        if from > up_to {
            return Err(Error::invalid_range(&from, &up_to));
        }
        Ok(ProbablePrimes {
            from,
            up_to,
            inclusive,
            rounds: self.rounds,
            tracker: None,
            done: false,
        })
    }
}

/// The lazy output of [`ProbabilisticGenerator::generate`].
///
/// Each call to [`Iterator::next`] probes forward from the last emitted
/// value, so only primes that are actually consumed are ever computed.
#[derive(Clone, Debug)]
pub struct ProbablePrimes {
    from: BigUint,
    up_to: BigUint,
    inclusive: bool,
    rounds: u32,
    tracker: Option<BigUint>,
    done: bool,
}

impl Iterator for ProbablePrimes {
    type Item = BigUint;

    fn next(&mut self) -> Option<BigUint> {
        if self.done {
            return None;
        }

        let candidate = match &self.tracker {
            Some(last) => next_probable_prime_with_rounds(last, self.rounds),
            None if self.from.is_zero() => next_probable_prime_with_rounds(&self.from, self.rounds),
            None => next_probable_prime_with_rounds(&(&self.from - 1_u32), self.rounds),
        };

        match candidate.cmp(&self.up_to) {
            Ordering::Less => {}
            Ordering::Equal if self.inclusive => {}
            _ => {
                self.done = true;
                return None;
            }
        }

        self.tracker = Some(candidate.clone());
        Some(candidate)
    }
}

impl FusedIterator for ProbablePrimes {}

impl RestartableSequence for ProbablePrimes {
    fn rewind(&mut self) {
        self.tracker = None;
        self.done = false;
    }
}
