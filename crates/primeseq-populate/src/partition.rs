use core::{fmt, num::NonZeroU64};

/// A contiguous slice of the population range handled by one worker.
///
/// Every chunk but the last is half-open, `[start, end)`. The last one is
/// closed, `[start, end]`, so the configured upper bound is always covered.
///
/// Chunks are only built by [`partition`], which guarantees each covers at
/// least one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Chunk {
    pub(crate) index: usize,
    pub(crate) start: u64,
    pub(crate) end: u64,
    pub(crate) inclusive: bool,
}

impl Chunk {
    /// Position of the chunk within its partition.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The first value the chunk covers.
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// The upper bound, excluded unless [`Chunk::inclusive`].
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Whether `end` itself belongs to the chunk. Only the last chunk of a
    /// partition is inclusive.
    pub const fn inclusive(&self) -> bool {
        self.inclusive
    }

    /// The largest value the chunk covers.
    pub const fn last_value(&self) -> u64 {
        if self.inclusive {
            self.end
        } else {
            self.end - 1
        }
    }

    /// Number of candidate values in the chunk. Never zero.
    pub const fn candidates(&self) -> u64 {
        self.last_value() - self.start + 1
    }

    pub const fn contains(&self, value: u64) -> bool {
        value >= self.start && value <= self.last_value()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let close = if self.inclusive { ']' } else { ')' };
        write!(f, "#{} [{}, {}{close}", self.index, self.start, self.end)
    }
}

/// Splits `[from, up_to]` into chunks of `batch_size` candidates.
///
/// Chunks are contiguous and never overlap; a boundary value belongs to the
/// chunk it starts. The final chunk absorbs the remainder and may hold up to
/// `batch_size` candidates plus the closing bound. Returns no chunks when
/// `from > up_to`.
///
/// # Example
/// ```
/// use core::num::NonZeroU64;
/// use primeseq_populate::partition;
///
/// let chunks = partition(2, 20, NonZeroU64::new(10).unwrap());
/// let bounds: Vec<_> = chunks.iter().map(|c| (c.start(), c.end(), c.inclusive())).collect();
/// assert_eq!(bounds, [(2, 12, false), (12, 20, true)]);
/// ```
pub fn partition(from: u64, up_to: u64, batch_size: NonZeroU64) -> Vec<Chunk> {
    if from > up_to {
        return Vec::new();
    }
    let batch = batch_size.get();
    let expected = (up_to - from) / batch + 1;
    let mut chunks = Vec::with_capacity(usize::try_from(expected).map_or(0, |n| n.min(1 << 16)));

    let mut start = from;
    loop {
        let index = chunks.len();
        match start.checked_add(batch).filter(|&end| end < up_to) {
            Some(end) => {
                chunks.push(Chunk {
                    index,
                    start,
                    end,
                    inclusive: false,
                });
                start = end;
            }
            None => {
                chunks.push(Chunk {
                    index,
                    start,
                    end: up_to,
                    inclusive: true,
                });
                return chunks;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    fn assert_tiles(chunks: &[Chunk], from: u64, up_to: u64) {
        assert_eq!(chunks.first().unwrap().start, from);
        assert_eq!(chunks.last().unwrap().last_value(), up_to);
        for (i, pair) in chunks.windows(2).enumerate() {
            assert_eq!(pair[0].index, i);
            assert!(!pair[0].inclusive);
            assert_eq!(pair[0].last_value() + 1, pair[1].start, "gap or overlap at {i}");
        }
        assert!(chunks.last().unwrap().inclusive);
        let covered: u64 = chunks.iter().map(Chunk::candidates).sum();
        assert_eq!(covered, up_to - from + 1);
    }

    #[test]
    fn ten_million_in_millions() {
        let chunks = partition(2, 10_000_000, batch(1_000_000));
        assert_eq!(chunks.len(), 10);
        assert_tiles(&chunks, 2, 10_000_000);

        assert_eq!(
            chunks[0],
            Chunk {
                index: 0,
                start: 2,
                end: 1_000_002,
                inclusive: false
            }
        );
        assert_eq!(
            chunks[9],
            Chunk {
                index: 9,
                start: 9_000_002,
                end: 10_000_000,
                inclusive: true
            }
        );
    }

    #[test]
    fn each_boundary_belongs_to_one_chunk() {
        let chunks = partition(2, 10_000_000, batch(1_000_000));
        for boundary in (1..10).map(|i| 2 + i * 1_000_000) {
            let owners: Vec<_> = chunks.iter().filter(|c| c.contains(boundary)).collect();
            assert_eq!(owners.len(), 1, "{boundary}");
            assert_eq!(owners[0].start, boundary);
        }
    }

    #[test]
    fn single_value_range() {
        let chunks = partition(7, 7, batch(100));
        assert_eq!(
            chunks,
            [Chunk {
                index: 0,
                start: 7,
                end: 7,
                inclusive: true
            }]
        );
        assert_eq!(chunks[0].candidates(), 1);
    }

    #[test]
    fn batch_larger_than_range() {
        let chunks = partition(2, 50, batch(1_000));
        assert_eq!(chunks.len(), 1);
        assert_tiles(&chunks, 2, 50);
    }

    #[test]
    fn exact_multiple_does_not_leave_a_sliver() {
        let chunks = partition(0, 30, batch(10));
        let bounds: Vec<_> = chunks.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(bounds, [(0, 10), (10, 20), (20, 30)]);
        assert_tiles(&chunks, 0, 30);
    }

    #[test]
    fn near_the_top_of_the_domain() {
        let from = u64::MAX - 25;
        let chunks = partition(from, u64::MAX, batch(10));
        assert_tiles(&chunks, from, u64::MAX);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn accessors_expose_partitioned_bounds() {
        let chunks = partition(2, 20, batch(10));
        let last = chunks[1];
        assert_eq!(last.index(), 1);
        assert_eq!(last.start(), 12);
        assert_eq!(last.end(), 20);
        assert!(last.inclusive());
        assert!(!chunks[0].inclusive());
        assert!(chunks.iter().all(|c| c.candidates() > 0));
    }

    #[test]
    fn reversed_range_is_empty() {
        assert!(partition(10, 2, batch(1)).is_empty());
    }

    #[test]
    fn display() {
        let chunks = partition(2, 20, batch(10));
        assert_eq!(chunks[0].to_string(), "#0 [2, 12)");
        assert_eq!(chunks[1].to_string(), "#1 [12, 20]");
    }
}
