use crate::{
    Error, ProbabilisticGenerator, ProbablePrimes, Result, SieveGenerator, SievePrimes,
    generator::{PrimeSequenceGenerator, RestartableSequence},
};
use core::iter::FusedIterator;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// Below this many base primes to compute, the sieve's setup cost is
/// negligible regardless of the segment's span.
const BASE_PRIME_BUDGET: u64 = 1 << 20;

/// The generation algorithm chosen for a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Exact segmented sieve over `u64`.
    Sieve,
    /// Miller-Rabin probing over arbitrary precision.
    Probabilistic,
}

impl Strategy {
    /// Picks an algorithm from the characteristics of `[from, up_to]`.
    ///
    /// The sieve is chosen when both bounds fit in `u64`, the span fits in
    /// `max_span` marks, and the base primes (`<= isqrt(up_to)`) do not
    /// dwarf the segment itself. Otherwise the range is either not
    /// representable or so sparse that probing beats sieving.
    ///
    /// # Example
    /// ```
    /// use num_bigint::BigUint;
    /// use primeseq::{DEFAULT_MAX_SPAN, Strategy};
    ///
    /// let small = Strategy::for_range(&BigUint::from(2_u32), &BigUint::from(1_000_u32), DEFAULT_MAX_SPAN);
    /// assert_eq!(small, Strategy::Sieve);
    ///
    /// let huge = BigUint::from(u64::MAX) * 4_u32;
    /// assert_eq!(Strategy::for_range(&huge, &huge, DEFAULT_MAX_SPAN), Strategy::Probabilistic);
    /// ```
    pub fn for_range(from: &BigUint, up_to: &BigUint, max_span: u64) -> Self {
        if sieve_bounds(from, up_to, max_span).is_some() {
            Self::Sieve
        } else {
            Self::Probabilistic
        }
    }
}

fn sieve_bounds(from: &BigUint, up_to: &BigUint, max_span: u64) -> Option<(u64, u64)> {
    let from = from.to_u64()?;
    let up_to = up_to.to_u64()?;
    let span = up_to.saturating_sub(from).saturating_add(1);
    let dense = up_to.isqrt() <= span.max(BASE_PRIME_BUDGET);
    (span <= max_span && dense).then_some((from, up_to))
}

/// A generator over arbitrary-precision bounds that selects the sieve or the
/// probabilistic variant per call, based on [`Strategy::for_range`].
///
/// # Example
/// ```
/// use num_bigint::BigUint;
/// use primeseq::{AutoGenerator, PrimeSequenceGenerator, Primes};
///
/// let generator = AutoGenerator::new();
/// let primes = generator.generate(BigUint::from(2_u32), BigUint::from(14_u32), true).unwrap();
/// assert!(matches!(primes, Primes::Sieve(_)));
/// assert_eq!(primes.count(), 6);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AutoGenerator {
    sieve: SieveGenerator<u64>,
    probabilistic: ProbabilisticGenerator,
}

impl AutoGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combines explicitly configured variants.
    pub fn from_parts(sieve: SieveGenerator<u64>, probabilistic: ProbabilisticGenerator) -> Self {
        Self {
            sieve,
            probabilistic,
        }
    }

    /// The strategy [`PrimeSequenceGenerator::generate`] would use.
    pub fn strategy_for(&self, from: &BigUint, up_to: &BigUint) -> Strategy {
        Strategy::for_range(from, up_to, self.sieve.max_span())
    }
}

impl PrimeSequenceGenerator for AutoGenerator {
    type Number = BigUint;
    type Sequence = Primes;

    fn generate(&self, from: BigUint, up_to: BigUint, inclusive: bool) -> Result<Primes> {
        if from > up_to {
            return Err(Error::invalid_range(&from, &up_to));
        }
        match sieve_bounds(&from, &up_to, self.sieve.max_span()) {
            Some((lo, hi)) => self.sieve.generate(lo, hi, inclusive).map(Primes::Sieve),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%from, %up_to, "range outside sieve domain, probing");
                self.probabilistic
                    .generate(from, up_to, inclusive)
                    .map(Primes::Probable)
            }
        }
    }
}

/// The sequence produced by [`AutoGenerator`].
#[derive(Clone, Debug)]
pub enum Primes {
    Sieve(SievePrimes<u64>),
    Probable(ProbablePrimes),
}

impl Primes {
    pub const fn strategy(&self) -> Strategy {
        match self {
            Self::Sieve(_) => Strategy::Sieve,
            Self::Probable(_) => Strategy::Probabilistic,
        }
    }
}

impl Iterator for Primes {
    type Item = BigUint;

    fn next(&mut self) -> Option<BigUint> {
        match self {
            Self::Sieve(primes) => primes.next().map(BigUint::from),
            Self::Probable(primes) => primes.next(),
        }
    }
}

impl FusedIterator for Primes {}

impl RestartableSequence for Primes {
    fn rewind(&mut self) {
        match self {
            Self::Sieve(primes) => primes.rewind(),
            Self::Probable(primes) => primes.rewind(),
        }
    }
}
