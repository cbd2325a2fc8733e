use crate::{Error, Result};
use core::fmt;

/// A validated `[from, up_to]` range with an optional exclusive upper bound.
///
/// `from` is always inclusive. `up_to` only appears in generated output when
/// `inclusive` is set and `up_to` is itself prime. Construction fails with
/// [`Error::InvalidRange`] when `from > up_to`; `from == up_to` is valid and
/// yields at most one value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrimeRange<T> {
    from: T,
    up_to: T,
    inclusive: bool,
}

impl<T> PrimeRange<T>
where
    T: PartialOrd + fmt::Display,
{
    /// Creates a new range, validating `from <= up_to`.
    ///
    /// # Example
    /// ```
    /// use primeseq::PrimeRange;
    ///
    /// let range = PrimeRange::new(2_u64, 13, true).unwrap();
    /// assert_eq!(*range.from(), 2);
    /// assert!(PrimeRange::new(2_u64, 1, true).is_err());
    /// ```
    pub fn new(from: T, up_to: T, inclusive: bool) -> Result<Self> {
        if from > up_to {
            return Err(Error::invalid_range(&from, &up_to));
        }
        Ok(Self {
            from,
            up_to,
            inclusive,
        })
    }
}

impl<T> PrimeRange<T> {
    /// The first candidate of the range (always inclusive).
    pub const fn from(&self) -> &T {
        &self.from
    }

    /// The upper bound of the range.
    pub const fn up_to(&self) -> &T {
        &self.up_to
    }

    /// Whether `up_to` itself may appear in the output.
    pub const fn inclusive(&self) -> bool {
        self.inclusive
    }

    /// Splits the range back into its parts.
    pub fn into_parts(self) -> (T, T, bool) {
        (self.from, self.up_to, self.inclusive)
    }
}

impl<T: fmt::Display> fmt::Display for PrimeRange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let close = if self.inclusive { ']' } else { ')' };
        write!(f, "[{}, {}{close}", self.from, self.up_to)
    }
}
