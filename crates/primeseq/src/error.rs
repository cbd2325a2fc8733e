/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `primeseq` generators can emit.
///
/// Every variant is raised eagerly, before any marking structure is allocated
/// or any candidate is probed, except [`Error::AllocationFailed`] which is
/// raised by the allocation itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The lower bound of a range is greater than its upper bound.
    ///
    /// Both bounds are kept in their decimal form so the same variant can be
    /// reported by the bounded and the arbitrary-precision generators.
    #[error("{{from}} ({from}) must be less than or equal to {{upTo}} ({up_to})")]
    InvalidRange { from: String, up_to: String },

    /// The requested range cannot be represented by the sieve's integer
    /// domain, or its span exceeds the sieve's configured limit.
    ///
    /// Values are never truncated to fit; callers should fall back to the
    /// probabilistic generator instead.
    #[error("{what} ({value}) exceeds the sieve domain limit ({limit})")]
    DomainOverflow {
        what: &'static str,
        value: String,
        limit: String,
    },

    /// The marking structure for a range could not be allocated.
    #[error("failed to allocate {bits} sieve marks")]
    AllocationFailed { bits: u64 },
}

impl Error {
    pub(crate) fn invalid_range(from: impl ToString, up_to: impl ToString) -> Self {
        Self::InvalidRange {
            from: from.to_string(),
            up_to: up_to.to_string(),
        }
    }

    pub(crate) fn overflow(what: &'static str, value: impl ToString, limit: impl ToString) -> Self {
        Self::DomainOverflow {
            what,
            value: value.to_string(),
            limit: limit.to_string(),
        }
    }

    /// Returns `true` for [`Error::InvalidRange`].
    pub const fn is_invalid_range(&self) -> bool {
        matches!(self, Self::InvalidRange { .. })
    }

    /// Returns `true` for [`Error::DomainOverflow`].
    pub const fn is_domain_overflow(&self) -> bool {
        matches!(self, Self::DomainOverflow { .. })
    }
}
