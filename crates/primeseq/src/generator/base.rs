use crate::{Error, Result, marks::Marks};

/// The primes `2..=limit`, used to strike composites inside a sieve segment.
///
/// A segment `[from, ceiling]` is only sieved correctly when *every* prime up
/// to `isqrt(ceiling)` is used, including primes smaller than `from`. This
/// table is computed once from 2 upward and can be shared between segments
/// (see [`SieveGenerator::with_base_primes`]).
///
/// [`SieveGenerator::with_base_primes`]: crate::SieveGenerator::with_base_primes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasePrimes {
    limit: u64,
    primes: Vec<u64>,
}

impl BasePrimes {
    /// Computes every prime `<= limit` with a plain Sieve of Eratosthenes.
    ///
    /// # Errors
    ///
    /// - [`Error::DomainOverflow`] if `limit + 1` marks are not addressable on
    ///   this platform.
    /// - [`Error::AllocationFailed`] if the marks cannot be allocated.
    ///
    /// # Example
    /// ```
    /// use primeseq::BasePrimes;
    ///
    /// let base = BasePrimes::up_to(20).unwrap();
    /// assert_eq!(base.as_slice(), &[2, 3, 5, 7, 11, 13, 17, 19]);
    /// ```
    pub fn up_to(limit: u64) -> Result<Self> {
        let len = limit
            .checked_add(1)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| Error::overflow("base prime limit", limit, usize::MAX - 1))?;

        let mut marks = Marks::assume_prime(len)?;
        for idx in 0..len.min(2) {
            marks.strike(idx);
        }

        let mut p = 2_usize;
        while p.saturating_mul(p) < len {
            if !marks.is_struck(p) {
                marks.strike_every(p * p, p);
            }
            p += 1;
        }

        let mut primes = Vec::with_capacity(marks.count_unstruck());
        let mut cursor = 0;
        while let Some(idx) = marks.next_unstruck(cursor) {
            primes.push(idx as u64);
            cursor = idx + 1;
        }

        Ok(Self { limit, primes })
    }

    /// Computes the base primes needed to sieve any segment ending at
    /// `ceiling`, i.e. every prime `<= isqrt(ceiling)`.
    pub fn for_ceiling(ceiling: u64) -> Result<Self> {
        Self::up_to(ceiling.isqrt())
    }

    /// The largest value this table was computed for.
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Whether this table holds every prime needed to sieve up to `ceiling`.
    pub const fn covers(&self, ceiling: u64) -> bool {
        self.limit >= ceiling.isqrt()
    }

    /// All base primes in ascending order.
    pub fn as_slice(&self) -> &[u64] {
        &self.primes
    }

    /// The base primes whose square does not exceed `ceiling`.
    pub fn striking(&self, ceiling: u64) -> impl Iterator<Item = u64> + '_ {
        let root = ceiling.isqrt();
        self.primes.iter().copied().take_while(move |&p| p <= root)
    }
}
