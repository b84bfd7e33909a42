//! Metrics Module
//!
//! The cache reports what it does through a [`MetricsSink`] handed to it at
//! construction. Registration and export belong to whoever owns the sink;
//! the cache only records.
//!
//! - [`CacheMetrics`]: atomic counters with [`snapshot`](CacheMetrics::snapshot),
//!   for tests and for exporters that poll.
//! - [`NoopMetrics`]: discards everything.

use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};

use crate::cache::CacheStats;

/// Receives counter and gauge updates from one cache instance.
pub trait MetricsSink: Send + Sync + fmt::Debug {
    /// A `put` call was made (once per batch).
    fn record_added(&self);
    /// A key not yet cached was written.
    fn record_added_new(&self);
    /// An entry was overwritten to make room for a new key.
    fn record_evicted(&self);
    /// A `get` call was made.
    fn record_get(&self);
    /// A `get` call found no valid entry.
    fn record_miss(&self);
    /// A `get` call found an entry past its validity.
    fn record_stale_get(&self);
    fn set_entries_current(&self, entries: usize);
    fn set_memory_bytes(&self, bytes: i64);
    fn add_memory_bytes(&self, delta: i64);
}

// == Cache Metrics ==
/// In-memory metrics backed by atomics.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    added: AtomicU64,
    added_new: AtomicU64,
    evicted: AtomicU64,
    gets: AtomicU64,
    misses: AtomicU64,
    stale_gets: AtomicU64,
    entries_current: AtomicUsize,
    memory_bytes: AtomicI64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every counter and gauge.
    ///
    /// Counters are read one at a time, so a snapshot taken under concurrent
    /// traffic may mix values from slightly different moments.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            added: self.added.load(Ordering::Relaxed),
            added_new: self.added_new.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            gets: self.gets.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale_gets: self.stale_gets.load(Ordering::Relaxed),
            entries_current: self.entries_current.load(Ordering::Relaxed),
            memory_bytes_approx: self.memory_bytes.load(Ordering::Relaxed),
        }
    }

    /// Zeroes the counters. Gauges keep describing the live cache.
    pub fn reset(&self) {
        for counter in [
            &self.added,
            &self.added_new,
            &self.evicted,
            &self.gets,
            &self.misses,
            &self.stale_gets,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl MetricsSink for CacheMetrics {
    fn record_added(&self) {
        self.added.fetch_add(1, Ordering::Relaxed);
    }

    fn record_added_new(&self) {
        self.added_new.fetch_add(1, Ordering::Relaxed);
    }

    fn record_evicted(&self) {
        self.evicted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_stale_get(&self) {
        self.stale_gets.fetch_add(1, Ordering::Relaxed);
    }

    fn set_entries_current(&self, entries: usize) {
        self.entries_current.store(entries, Ordering::Relaxed);
    }

    fn set_memory_bytes(&self, bytes: i64) {
        self.memory_bytes.store(bytes, Ordering::Relaxed);
    }

    fn add_memory_bytes(&self, delta: i64) {
        self.memory_bytes.fetch_add(delta, Ordering::Relaxed);
    }
}

// == Noop Metrics ==
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_added(&self) {}
    fn record_added_new(&self) {}
    fn record_evicted(&self) {}
    fn record_get(&self) {}
    fn record_miss(&self) {}
    fn record_stale_get(&self) {}
    fn set_entries_current(&self, _entries: usize) {}
    fn set_memory_bytes(&self, _bytes: i64) {}
    fn add_memory_bytes(&self, _delta: i64) {}
}
