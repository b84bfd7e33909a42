//! Cache Statistics Module
//!
//! Point-in-time view of the counters and gauges a cache reports.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of the metrics recorded for one cache instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of `put` calls, counted once per batch
    pub added: u64,
    /// Number of keys that were not already cached when written
    pub added_new: u64,
    /// Number of entries overwritten to make room for a new key
    pub evicted: u64,
    /// Number of `get` calls
    pub gets: u64,
    /// Number of `get` calls that found no valid entry
    pub misses: u64,
    /// Number of `get` calls that found an entry past its validity
    pub stale_gets: u64,
    /// Current number of occupied slots
    pub entries_current: usize,
    /// Best-effort estimate of the bytes held by the cache
    pub memory_bytes_approx: i64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls that returned a value.
    pub fn hits(&self) -> u64 {
        self.gets.saturating_sub(self.misses)
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / gets, or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits() as f64 / self.gets as f64
        }
    }
}
