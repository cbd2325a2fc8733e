use crate::{Error, Result};

const WORD_BITS: usize = u64::BITS as usize;

/// A packed, fixed-length bitset of "struck" (composite) flags.
///
/// A clear bit means the candidate is still assumed prime. Bits past `len` are
/// never set and never reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Marks {
    words: Vec<u64>,
    len: usize,
}

impl Marks {
    /// Allocates `len` marks, all assumed prime.
    ///
    /// The allocation is fallible so that huge ranges report
    /// [`Error::AllocationFailed`] instead of aborting the process.
    pub(crate) fn assume_prime(len: usize) -> Result<Self> {
        let words_len = len.div_ceil(WORD_BITS);
        let mut words = Vec::new();
        words
            .try_reserve_exact(words_len)
            .map_err(|_| Error::AllocationFailed { bits: len as u64 })?;
        words.resize(words_len, 0);
        Ok(Self { words, len })
    }

    pub(crate) const fn empty() -> Self {
        Self {
            words: Vec::new(),
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn strike(&mut self, idx: usize) {
        debug_assert!(idx < self.len);
        self.words[idx / WORD_BITS] |= 1 << (idx % WORD_BITS);
    }

    #[inline]
    pub(crate) fn is_struck(&self, idx: usize) -> bool {
        self.words[idx / WORD_BITS] & (1 << (idx % WORD_BITS)) != 0
    }

    /// Strikes `start, start + step, ...` while below `len`.
    pub(crate) fn strike_every(&mut self, start: usize, step: usize) {
        let mut idx = start;
        while idx < self.len {
            self.strike(idx);
            idx = match idx.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    }

    /// Returns the first index `>= from` that is not struck.
    ///
    /// Scans a whole word at a time, so sparse regions are skipped quickly.
    pub(crate) fn next_unstruck(&self, from: usize) -> Option<usize> {
        if from >= self.len {
            return None;
        }
        let mut w = from / WORD_BITS;
        let mut word = !self.words[w] & (u64::MAX << (from % WORD_BITS));
        loop {
            if word != 0 {
                let idx = w * WORD_BITS + word.trailing_zeros() as usize;
                return (idx < self.len).then_some(idx);
            }
            w += 1;
            if w == self.words.len() {
                return None;
            }
            word = !self.words[w];
        }
    }

    /// Number of marks still assumed prime.
    pub(crate) fn count_unstruck(&self) -> usize {
        let full = self.len / WORD_BITS;
        let mut count: usize = self.words[..full]
            .iter()
            .map(|w| w.count_zeros() as usize)
            .sum();
        let tail = self.len % WORD_BITS;
        if tail != 0 {
            let mask = (1_u64 << tail) - 1;
            count += (!self.words[full] & mask).count_ones() as usize;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_across_word_boundaries() {
        let mut marks = Marks::assume_prime(200).unwrap();
        for i in 0..200 {
            if i != 63 && i != 64 && i != 199 {
                marks.strike(i);
            }
        }
        assert_eq!(marks.next_unstruck(0), Some(63));
        assert_eq!(marks.next_unstruck(64), Some(64));
        assert_eq!(marks.next_unstruck(65), Some(199));
        assert_eq!(marks.next_unstruck(200), None);
        assert_eq!(marks.count_unstruck(), 3);
    }

    #[test]
    fn tail_bits_are_never_reported() {
        let mut marks = Marks::assume_prime(70).unwrap();
        marks.strike_every(0, 1);
        assert_eq!(marks.next_unstruck(0), None);
        assert_eq!(marks.count_unstruck(), 0);
        assert!(marks.is_struck(69));
    }

    #[test]
    fn empty_marks() {
        let marks = Marks::assume_prime(0).unwrap();
        assert_eq!(marks.len(), 0);
        assert_eq!(marks.next_unstruck(0), None);
        assert_eq!(marks.count_unstruck(), 0);
    }
}
