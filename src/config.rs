//! HashConfig: the bucket count / max load factor pair shared by the engine
//! and both adapters.

use crate::error::{Failure, Result};

/// Construction parameters of a table.
///
/// ```
/// use chained_hashmap::{ChainedHashMap, HashConfig};
///
/// let config = HashConfig::new().bucket_count(64).max_load_factor(0.75);
/// let map: ChainedHashMap<u32, u32> = ChainedHashMap::with_config(config).unwrap();
/// assert_eq!(map.bucket_count(), 64);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HashConfig {
    pub bucket_count: usize,
    pub max_load_factor: f32,
}

impl HashConfig {
    pub const DEFAULT_BUCKET_COUNT: usize = 10;
    pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 1.0;

    pub const fn new() -> Self {
        Self {
            bucket_count: Self::DEFAULT_BUCKET_COUNT,
            max_load_factor: Self::DEFAULT_MAX_LOAD_FACTOR,
        }
    }

    /// Set the initial number of buckets.
    pub const fn bucket_count(mut self, n: usize) -> Self {
        self.bucket_count = n;
        self
    }

    /// Set the load factor above which an insert grows the table.
    pub const fn max_load_factor(mut self, f: f32) -> Self {
        self.max_load_factor = f;
        self
    }

    /// Reject a zero bucket count or an unusable load factor. Values are
    /// never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.bucket_count == 0 {
            return Err(Failure::ZeroBuckets);
        }
        check_load_factor(self.max_load_factor)
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn check_load_factor(f: f32) -> Result<()> {
    if f.is_finite() && f > 0.0 {
        Ok(())
    } else {
        Err(Failure::InvalidLoadFactor)
    }
}
