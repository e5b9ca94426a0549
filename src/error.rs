//! Failure: the single error type of the crate.
//!
//! Fallible operations come in pairs. `try_xxx` returns `Result<_, Failure>`;
//! the plain `xxx` form calls it and panics on failure, the same way
//! `Vec::push` panics when it cannot grow.
//!
//! A missing key is never a `Failure`: lookups and erasures answer with
//! `bool` or `Option`.

use std::collections::TryReserveError;

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, thiserror::Error)]
pub enum Failure {
    /// A bucket count of zero was requested.
    #[error("bucket count must be at least 1")]
    ZeroBuckets,
    /// The max load factor was NaN, infinite, zero or negative.
    #[error("max load factor must be finite and greater than 0")]
    InvalidLoadFactor,
    /// The bucket count needed to honor the load factor does not fit in `usize`.
    #[error("required bucket count overflows usize")]
    BucketsOverflow,
    /// The allocator refused to provide bucket storage.
    #[error("out of memory while allocating buckets")]
    OutOfMemory,
}

impl Failure {
    /// Invalid construction or configuration argument; the caller is at fault.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Failure::ZeroBuckets | Failure::InvalidLoadFactor)
    }

    /// The table could not obtain the storage it needed. The table is left in
    /// its last valid state.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Failure::BucketsOverflow | Failure::OutOfMemory)
    }
}

impl From<TryReserveError> for Failure {
    fn from(_: TryReserveError) -> Self {
        Failure::OutOfMemory
    }
}

pub type Result<T> = core::result::Result<T, Failure>;

/// Backs the panicking convenience forms of `try_xxx` methods.
#[track_caller]
pub(crate) fn or_panic<T>(res: Result<T>) -> T {
    match res {
        Ok(v) => v,
        Err(failure) => panic!("hash table operation failed: {failure}"),
    }
}
