//! Slot Ring Module
//!
//! Fixed set of entry slots linked into a circular doubly-linked list by
//! integer indices. The list is ordered by write recency: `first` is the most
//! recently written slot and `last` the least recently written one, which is
//! the next eviction victim.
//!
//! ```text
//!        prev                 prev                 prev
//!   first <──── slot ... <──── slot <──── last
//!     │   ────>             ────>     ────>  │
//!     │   next              next      next   │
//!     └──────────── last.next == first ──────┘
//! ```
//!
//! Slots are never freed or compacted. A slot changes owner when the engine
//! rewrites it with another key.

use std::mem;
use std::time::Instant;

use crate::cache::CacheEntry;

// == Slot Ring ==
#[derive(Debug)]
pub struct SlotRing<V> {
    entries: Vec<CacheEntry<V>>,
    /// Most recently written slot
    first: usize,
    /// Least recently written slot
    last: usize,
}

impl<V> SlotRing<V> {
    // == Constructor ==
    /// Creates an empty ring with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            first: 0,
            last: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slot index of the most recently written entry.
    #[cfg(test)]
    pub(crate) fn first(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.first)
    }

    /// Slot index of the least recently written entry.
    #[cfg(test)]
    pub(crate) fn last(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.last)
    }

    pub fn entry(&self, index: usize) -> Option<&CacheEntry<V>> {
        self.entries.get(index)
    }

    // == Push ==
    /// Appends a new slot and links it in as the head.
    ///
    /// The first push forms a ring of one slot pointing at itself.
    pub fn push(&mut self, key: String, value: V, now: Instant) -> usize {
        let index = self.entries.len();
        let mut entry = CacheEntry::new(key, value, now);

        if self.entries.is_empty() {
            entry.prev = index;
            entry.next = index;
            self.entries.push(entry);
            self.first = index;
            self.last = index;
            return index;
        }

        entry.prev = self.last;
        entry.next = self.first;
        self.entries.push(entry);
        self.entries[self.first].prev = index;
        self.entries[self.last].next = index;
        self.first = index;
        index
    }

    // == Unlink ==
    /// Splices slot `index` out of the ring.
    ///
    /// `first` and `last` move to the neighbours when they pointed at the
    /// removed slot. A single-slot ring is left pointing at itself.
    pub fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let entry = &self.entries[index];
            (entry.prev, entry.next)
        };

        self.entries[prev].next = next;
        self.entries[next].prev = prev;

        if self.last == index {
            self.last = prev;
        }
        if self.first == index {
            self.first = next;
        }
    }

    // == Link At Head ==
    /// Links an unlinked slot in as the new `first`.
    pub fn link_at_head(&mut self, index: usize) {
        let (first, last) = (self.first, self.last);
        {
            let entry = &mut self.entries[index];
            entry.next = first;
            entry.prev = last;
        }
        self.entries[first].prev = index;
        self.entries[last].next = index;
        self.first = index;
    }

    // == Rotate ==
    /// Makes the current tail the head and returns its slot index.
    ///
    /// Since the ring is circular the tail already sits right before the
    /// head, so only the `first`/`last` markers move.
    pub fn rotate_last_to_head(&mut self) -> usize {
        let victim = self.last;
        self.last = self.entries[victim].prev;
        self.first = victim;
        victim
    }

    // == Write Slot ==
    /// Overwrites key, value and timestamp at `index`, returning the old key
    /// and value.
    pub fn write_slot(
        &mut self,
        index: usize,
        key: String,
        value: V,
        now: Instant,
    ) -> (String, V) {
        let entry = &mut self.entries[index];
        entry.updated = now;
        let old_key = mem::replace(&mut entry.key, key);
        let old_value = mem::replace(&mut entry.value, value);
        (old_key, old_value)
    }

    /// Overwrites value and timestamp at `index`, keeping the key.
    pub fn refresh_slot(&mut self, index: usize, value: V, now: Instant) -> V {
        let entry = &mut self.entries[index];
        entry.updated = now;
        mem::replace(&mut entry.value, value)
    }

    // == Iteration ==
    /// Iterates slots from most to least recently written.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CacheEntry<V>)> + '_ {
        let mut cursor = self.first;
        (0..self.entries.len()).map(move |_| {
            let index = cursor;
            let entry = &self.entries[index];
            cursor = entry.next;
            (index, entry)
        })
    }

    /// Walks the ring in both directions and checks every link.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let len = self.entries.len();
        if len == 0 {
            return true;
        }
        if self.entries[self.last].next != self.first
            || self.entries[self.first].prev != self.last
        {
            return false;
        }

        let mut seen = vec![false; len];
        let mut cursor = self.first;
        for _ in 0..len {
            if seen[cursor] {
                return false;
            }
            seen[cursor] = true;
            let next = self.entries[cursor].next;
            if self.entries[next].prev != cursor {
                return false;
            }
            cursor = next;
        }
        cursor == self.first && seen.iter().all(|s| *s)
    }
}
