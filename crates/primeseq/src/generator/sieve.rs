use crate::{
    BasePrimes, Error, Result,
    generator::{PrimeSequenceGenerator, RestartableSequence},
    marks::Marks,
};
use core::{fmt, iter::FusedIterator, marker::PhantomData};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The largest number of candidates a [`SieveGenerator`] sieves in one call
/// unless configured otherwise (`2^32` marks, 512 MiB).
pub const DEFAULT_MAX_SPAN: u64 = 1 << 32;

/// A bounded unsigned integer domain that a [`SieveGenerator`] can sieve.
///
/// All sieve arithmetic is performed exactly in `u64`/`u128`; the domain type
/// only bounds which values may be requested and returned.
pub trait SieveInt: Copy + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The largest representable candidate.
    const MAX: Self;

    /// Widens the value losslessly.
    fn to_u64(self) -> u64;

    /// Narrows a value, returning `None` when it is not representable.
    fn from_u64(value: u64) -> Option<Self>;

    /// Narrows a wide value, returning `None` when it is not representable.
    fn from_u128(value: u128) -> Option<Self>;
}

macro_rules! impl_sieve_int {
    ($($ty:ty),*) => {
        $(
            impl SieveInt for $ty {
                const MAX: Self = <$ty>::MAX;

                #[inline]
                fn to_u64(self) -> u64 {
                    u64::from(self)
                }

                #[inline]
                fn from_u64(value: u64) -> Option<Self> {
                    Self::try_from(value).ok()
                }

                #[inline]
                fn from_u128(value: u128) -> Option<Self> {
                    Self::try_from(value).ok()
                }
            }
        )*
    };
}

impl_sieve_int!(u32, u64);

/// A deterministic, segmented Sieve of Eratosthenes over a bounded integer
/// domain.
///
/// Each call allocates one bit per candidate in `[from, effective_up_to]` and
/// strikes the multiples of every prime up to `isqrt(effective_up_to)`. Unlike
/// [`ProbabilisticGenerator`], the output never contains false positives, but
/// memory grows linearly with the span of the range.
///
/// ## Features
/// - ✅ Exact primality
/// - ✅ O(n log log n) time, O(n) bits of memory
/// - ❌ Limited to `T::MAX` and to [`Self::max_span`] candidates per call
///
/// ## Recommended When
/// - The range is dense and fits in a native integer
/// - Many adjacent segments are sieved with shared [`BasePrimes`]
///
/// [`ProbabilisticGenerator`]: crate::ProbabilisticGenerator
#[derive(Clone, Debug)]
pub struct SieveGenerator<T: SieveInt = u64> {
    max_span: u64,
    base: Option<Arc<BasePrimes>>,
    _domain: PhantomData<fn() -> T>,
}

impl<T: SieveInt> Default for SieveGenerator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SieveInt> SieveGenerator<T> {
    /// Creates a generator that computes its base primes on every call.
    pub const fn new() -> Self {
        Self {
            max_span: DEFAULT_MAX_SPAN,
            base: None,
            _domain: PhantomData,
        }
    }

    /// Creates a generator that reuses a precomputed table of base primes for
    /// every range it covers.
    ///
    /// Ranges whose upper bound exceeds the table fall back to computing
    /// their own base primes.
    ///
    /// # Example
    /// ```
    /// use primeseq::{BasePrimes, PrimeSequenceGenerator, SieveGenerator};
    /// use std::sync::Arc;
    ///
    /// let base = Arc::new(BasePrimes::for_ceiling(10_000_000).unwrap());
    /// let generator = SieveGenerator::<u64>::with_base_primes(base);
    /// let primes: Vec<u64> = generator.generate(9_999_900, 10_000_000, true).unwrap().collect();
    /// assert_eq!(primes.last(), Some(&9_999_991));
    /// ```
    pub fn with_base_primes(base: Arc<BasePrimes>) -> Self {
        Self {
            max_span: DEFAULT_MAX_SPAN,
            base: Some(base),
            _domain: PhantomData,
        }
    }

    /// Overrides the largest number of candidates sieved in a single call.
    #[must_use]
    pub fn with_max_span(mut self, max_span: u64) -> Self {
        self.max_span = max_span;
        self
    }

    /// The largest number of candidates sieved in a single call.
    pub const fn max_span(&self) -> u64 {
        self.max_span
    }

    /// Like [`PrimeSequenceGenerator::generate`], but accepts bounds wider
    /// than `T` and reports [`Error::DomainOverflow`] instead of truncating
    /// them.
    ///
    /// # Example
    /// ```
    /// use primeseq::SieveGenerator;
    ///
    /// let generator = SieveGenerator::<u32>::new();
    /// let err = generator.generate_wide(2, u128::from(u32::MAX) + 1, true).unwrap_err();
    /// assert!(err.is_domain_overflow());
    /// ```
    pub fn generate_wide(&self, from: u128, up_to: u128, inclusive: bool) -> Result<SievePrimes<T>> {
        if from > up_to {
            return Err(Error::invalid_range(from, up_to));
        }
        let from = T::from_u128(from).ok_or_else(|| Error::overflow("from", from, T::MAX))?;
        let up_to = T::from_u128(up_to).ok_or_else(|| Error::overflow("upTo", up_to, T::MAX))?;
        self.generate(from, up_to, inclusive)
    }

    fn base_for(&self, ceiling: u64) -> Result<Arc<BasePrimes>> {
        match &self.base {
            Some(base) if base.covers(ceiling) => Ok(Arc::clone(base)),
            _ => {
                #[cfg(feature = "tracing")]
                tracing::trace!(ceiling, "computing base primes");
                BasePrimes::for_ceiling(ceiling).map(Arc::new)
            }
        }
    }
}

impl<T: SieveInt> PrimeSequenceGenerator for SieveGenerator<T> {
    type Number = T;
    type Sequence = SievePrimes<T>;

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    fn generate(&self, from: T, up_to: T, inclusive: bool) -> Result<SievePrimes<T>> {
        if from > up_to {
            return Err(Error::invalid_range(from, up_to));
        }

        let from = from.to_u64();
        let up_to = up_to.to_u64();
        let ceiling = if inclusive {
            Some(up_to)
        } else {
            up_to.checked_sub(1)
        };
        let ceiling = match ceiling {
            Some(ceiling) if ceiling >= from => ceiling,
            _ => return Ok(SievePrimes::empty(from)),
        };

        // `ceiling - from + 1` overflows only for the full `0..=u64::MAX` span.
        let span = (ceiling - from)
            .checked_add(1)
            .filter(|&span| span <= self.max_span)
            .ok_or_else(|| {
                Error::overflow("span", u128::from(ceiling - from) + 1, self.max_span)
            })?;
        let len = usize::try_from(span).map_err(|_| Error::overflow("span", span, usize::MAX))?;

        let base = self.base_for(ceiling)?;
        let mut marks = Marks::assume_prime(len)?;

        // 0 and 1 are neither prime nor composite.
        for value in from..=ceiling.min(1) {
            marks.strike((value - from) as usize);
        }

        let lo = u128::from(from);
        for p in base.striking(ceiling) {
            let wide = u128::from(p);
            let first_multiple = lo.div_ceil(wide) * wide;
            let start = first_multiple.max(wide * wide);
            if start > u128::from(ceiling) {
                continue;
            }
            let step = usize::try_from(p).unwrap_or(usize::MAX);
            marks.strike_every((start - lo) as usize, step);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(from, ceiling, span, "sieved segment");

        Ok(SievePrimes {
            marks: Arc::new(marks),
            from,
            cursor: 0,
            _domain: PhantomData,
        })
    }
}

/// The lazy output of [`SieveGenerator::generate`].
///
/// The marks are shared behind an [`Arc`], so cloning the sequence (to replay
/// it) does not copy the sieve.
#[derive(Clone, Debug)]
pub struct SievePrimes<T> {
    marks: Arc<Marks>,
    from: u64,
    cursor: usize,
    _domain: PhantomData<fn() -> T>,
}

impl<T: SieveInt> SievePrimes<T> {
    fn empty(from: u64) -> Self {
        Self {
            marks: Arc::new(Marks::empty()),
            from,
            cursor: 0,
            _domain: PhantomData,
        }
    }

    /// The number of candidates that were sieved for this sequence.
    pub fn span(&self) -> usize {
        self.marks.len()
    }
}

impl<T: SieveInt> Iterator for SievePrimes<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let idx = self.marks.next_unstruck(self.cursor)?;
        self.cursor = idx + 1;
        T::from_u64(self.from + idx as u64)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.marks.len().saturating_sub(self.cursor)))
    }
}

impl<T: SieveInt> FusedIterator for SievePrimes<T> {}

impl<T: SieveInt> RestartableSequence for SievePrimes<T> {
    fn rewind(&mut self) {
        self.cursor = 0;
    }
}
