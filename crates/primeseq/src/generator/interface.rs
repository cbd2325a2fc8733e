use crate::{PrimeRange, Result};

/// A unit that generates the primes found within a numeric range.
///
/// Implementations differ in the numeric domain they operate on and in how
/// primality is established, but share one contract:
///
/// - `from` is always inclusive; `up_to` is included only when `inclusive` is
///   set and `up_to` is itself prime.
/// - `from > up_to` fails with [`crate::Error::InvalidRange`] before any work
///   is performed. `from == up_to` is valid.
/// - The returned sequence is lazy, strictly ascending and finite. It is
///   [`Clone`], so a copy taken before iterating can be replayed, and
///   [`RestartableSequence::rewind`] restarts it in place.
pub trait PrimeSequenceGenerator {
    /// The numeric domain of the generated primes.
    type Number;

    /// The sequence returned by [`Self::generate`].
    type Sequence: RestartableSequence<Item = Self::Number>;

    /// Generates the primes in `[from, up_to]` (or `[from, up_to)` when
    /// `inclusive` is `false`).
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidRange`] if `from > up_to`.
    /// - Any domain specific error of the implementation.
    fn generate(&self, from: Self::Number, up_to: Self::Number, inclusive: bool)
    -> Result<Self::Sequence>;

    /// Generates the primes of an already validated [`PrimeRange`].
    fn generate_range(&self, range: PrimeRange<Self::Number>) -> Result<Self::Sequence> {
        let (from, up_to, inclusive) = range.into_parts();
        self.generate(from, up_to, inclusive)
    }
}

/// A finite, ascending iterator that can be restarted from its first element.
pub trait RestartableSequence: Iterator + Clone {
    /// Moves the cursor back to the beginning of the sequence.
    fn rewind(&mut self);
}
