//! FIFO Cache Module
//!
//! Main cache engine combining a key index with the slot ring and lazy
//! expiry. Eviction follows write order: re-writing a key makes it the
//! newest entry, reading it changes nothing.

use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::cache::{Cache, CacheEntry, CallContext, EstimateSize, Fetched, SlotRing};
use crate::clock::{Clock, SystemClock};
use crate::config::FifoCacheConfig;
use crate::error::{CacheError, Result};
use crate::metrics::MetricsSink;

/// Index and ring, guarded together by one lock.
#[derive(Debug)]
struct FifoState<V> {
    ring: SlotRing<V>,
    index: HashMap<String, usize>,
}

// == FIFO Cache ==
/// Fixed-capacity string-keyed cache with write-order eviction.
///
/// - Writes take the exclusive lock once per batch.
/// - Reads take the shared lock once per key and never reorder anything.
/// - Entries older than `validity` read as misses but stay in place until
///   rewritten or evicted.
/// - A capacity of zero disables the cache without taking any lock.
pub struct FifoCache<V> {
    name: String,
    capacity: usize,
    validity: Duration,
    state: RwLock<FifoState<V>>,
    metrics: Arc<dyn MetricsSink>,
    clock: Arc<dyn Clock>,
}

impl<V: EstimateSize> FifoCache<V> {
    // == Constructor ==
    /// Creates a new named cache reporting to `metrics`.
    ///
    /// # Arguments
    /// * `name` - Instance name, attached to log events
    /// * `config` - Capacity and validity window
    /// * `metrics` - Sink receiving this instance's counters and gauges
    pub fn new(
        name: impl Into<String>,
        config: FifoCacheConfig,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self::with_clock(name, config, metrics, Arc::new(SystemClock))
    }

    /// Same as [`new`](Self::new) with an explicit time source.
    pub fn with_clock(
        name: impl Into<String>,
        config: FifoCacheConfig,
        metrics: Arc<dyn MetricsSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let name = name.into();

        if config.is_enabled() {
            warn!(cache = %name, "In-memory (FIFO) cache is experimental");
            info!(
                cache = %name,
                capacity = config.size,
                validity = ?config.validity,
                "FIFO cache initialized"
            );
        } else {
            info!(cache = %name, "FIFO cache disabled (size 0)");
        }

        // The slot array is reserved up front, so account for it right away
        let reserved = mem::size_of::<CacheEntry<V>>().saturating_mul(config.size);
        metrics.set_memory_bytes(i64::try_from(reserved).unwrap_or(i64::MAX));
        metrics.set_entries_current(0);

        Self {
            name,
            capacity: config.size,
            validity: config.validity,
            state: RwLock::new(FifoState {
                ring: SlotRing::with_capacity(config.size),
                index: HashMap::with_capacity(config.size),
            }),
            metrics,
            clock,
        }
    }

    // == Put ==
    /// Writes a batch of key/value pairs, in order, under one exclusive lock.
    ///
    /// For each pair:
    /// 1. an existing key gets the new value and moves to the head;
    /// 2. a new key in a full cache takes over the oldest written slot;
    /// 3. otherwise a new slot is appended.
    ///
    /// # Errors
    /// [`CacheError::LengthMismatch`] when `keys` and `values` differ in
    /// length. Nothing is written or counted in that case.
    pub fn put(&self, _ctx: &CallContext, keys: Vec<String>, values: Vec<V>) -> Result<()> {
        if keys.len() != values.len() {
            return Err(CacheError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        self.metrics.record_added();
        if self.capacity == 0 {
            return Ok(());
        }

        let mut state = self.state.write();
        let now = self.clock.now();
        for (key, value) in keys.into_iter().zip(values) {
            self.put_locked(&mut state, key, value, now);
        }

        Ok(())
    }

    fn put_locked(&self, state: &mut FifoState<V>, key: String, value: V, now: Instant) {
        // Update in place
        if let Some(&index) = state.index.get(&key) {
            let new_size = value.estimate_size();
            let old_value = state.ring.refresh_slot(index, value, now);
            let delta = size_delta(new_size, old_value.estimate_size());

            state.ring.unlink(index);
            state.ring.link_at_head(index);

            self.metrics.add_memory_bytes(delta);
            return;
        }
        self.metrics.record_added_new();

        let new_size = key.estimate_size() + value.estimate_size();

        // Full: reuse the oldest written slot
        if state.ring.len() >= self.capacity {
            let index = state.ring.rotate_last_to_head();
            let (old_key, old_value) = state.ring.write_slot(index, key.clone(), value, now);
            let old_size = old_key.estimate_size() + old_value.estimate_size();

            state.index.remove(&old_key);
            state.index.insert(key, index);

            trace!(cache = %self.name, evicted = %old_key, slot = index, "Evicted oldest entry");
            self.metrics.record_evicted();
            self.metrics.add_memory_bytes(size_delta(new_size, old_size));
            return;
        }

        // Spare capacity: append
        let index = state.ring.push(key.clone(), value, now);
        state.index.insert(key, index);

        self.metrics.set_entries_current(state.ring.len());
        self.metrics.add_memory_bytes(size_delta(new_size, 0));
    }
}

impl<V: Clone> FifoCache<V> {
    // == Get ==
    /// Returns the value stored for `key` if it is still inside its validity
    /// window.
    ///
    /// A stale entry counts as a miss and as a stale get, and is left where
    /// it is.
    pub fn get(&self, _ctx: &CallContext, key: &str) -> Option<V> {
        self.metrics.record_get();
        if self.capacity == 0 {
            self.metrics.record_miss();
            return None;
        }

        let state = self.state.read();
        let entry = match state.index.get(key).and_then(|&index| state.ring.entry(index)) {
            Some(entry) => entry,
            None => {
                self.metrics.record_miss();
                return None;
            }
        };

        if entry.is_fresh(self.clock.now(), self.validity) {
            return Some(entry.value.clone());
        }

        self.metrics.record_miss();
        self.metrics.record_stale_get();
        None
    }

    // == Fetch ==
    /// Looks up each key with its own [`get`](Self::get).
    ///
    /// The batch is not atomic: writes may land between two lookups.
    pub fn fetch(&self, ctx: &CallContext, keys: &[String]) -> Fetched<V> {
        let mut fetched = Fetched::with_capacity(keys.len());
        for key in keys {
            match self.get(ctx, key) {
                Some(value) => {
                    fetched.found.push(key.clone());
                    fetched.values.push(value);
                }
                None => fetched.missing.push(key.clone()),
            }
        }
        fetched
    }
}

impl<V> FifoCache<V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    // == Length ==
    /// Returns the number of occupied slots, stale ones included.
    pub fn len(&self) -> usize {
        self.state.read().ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached keys from most to least recently written.
    ///
    /// The last key is the next eviction victim.
    pub fn keys(&self) -> Vec<String> {
        let state = self.state.read();
        state.ring.iter().map(|(_, entry)| entry.key.clone()).collect()
    }

    // == Stop ==
    /// No-op; the cache owns no background work or external resources.
    pub fn stop(&self) {
        debug!(cache = %self.name, "FIFO cache stopped");
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let state = self.state.read();
        state.ring.is_consistent()
            && state.index.len() == state.ring.len()
            && state
                .index
                .iter()
                .all(|(key, &index)| state.ring.entry(index).is_some_and(|e| &e.key == key))
    }
}

impl<V> fmt::Debug for FifoCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoCache")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("validity", &self.validity)
            .field("len", &self.len())
            .finish()
    }
}

impl Cache for FifoCache<Vec<u8>> {
    fn store(&self, ctx: &CallContext, keys: Vec<String>, bufs: Vec<Vec<u8>>) -> Result<()> {
        self.put(ctx, keys, bufs)
    }

    fn fetch(&self, ctx: &CallContext, keys: &[String]) -> Fetched<Vec<u8>> {
        FifoCache::fetch(self, ctx, keys)
    }

    fn stop(&self) {
        FifoCache::stop(self)
    }
}

fn size_delta(new: usize, old: usize) -> i64 {
    let new = i64::try_from(new).unwrap_or(i64::MAX);
    let old = i64::try_from(old).unwrap_or(i64::MAX);
    new - old
}
