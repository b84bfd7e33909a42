//! Cache Entry Module
//!
//! Defines the slot payload of the recency ring.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// One cached key/value pair occupying a slot.
///
/// `prev` and `next` are slot indices into the owning ring, not pointers.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The key this slot currently holds
    pub key: String,
    /// The stored value
    pub value: V,
    /// Time of the last write to this slot
    pub updated: Instant,
    /// Slot written just after this one (towards the head)
    pub prev: usize,
    /// Slot written just before this one (towards the tail)
    pub next: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that is not yet linked anywhere.
    pub fn new(key: String, value: V, updated: Instant) -> Self {
        Self {
            key,
            value,
            updated,
            prev: 0,
            next: 0,
        }
    }

    // == Is Fresh ==
    /// Checks whether the entry is still inside its validity window at `now`.
    ///
    /// A zero `validity` means the entry never expires. Otherwise the entry is
    /// fresh while `now - updated < validity`; at exactly `validity` it is
    /// stale.
    pub fn is_fresh(&self, now: Instant, validity: Duration) -> bool {
        validity.is_zero() || self.age(now) < validity
    }

    /// Time since the last write, as seen at `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.updated)
    }
}
