//! Backend Interface Module
//!
//! Byte-buffer interface shared with other cache backends, so a FIFO cache
//! can sit behind the same trait object as any of them.

use crate::error::Result;

// == Call Context ==
/// Per-call context accepted by every cache operation.
///
/// This is the slot where deadlines and cancellation travel in other
/// backends. The in-memory FIFO cache never reads it: its operations are
/// short, synchronous and run to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext;

impl CallContext {
    pub const fn background() -> Self {
        CallContext
    }
}

// == Fetched ==
/// Result of a batch lookup, partitioned in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<V> {
    /// Keys that had a valid entry
    pub found: Vec<String>,
    /// Values for `found`, position by position
    pub values: Vec<V>,
    /// Keys with no valid entry
    pub missing: Vec<String>,
}

impl<V> Fetched<V> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            found: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            missing: Vec::with_capacity(capacity),
        }
    }
}

impl<V> Default for Fetched<V> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

// == Cache Trait ==
/// A cache of byte buffers.
pub trait Cache: Send + Sync {
    /// Stores every key/buffer pair as one batch.
    ///
    /// Fails only when `keys` and `bufs` have different lengths.
    fn store(&self, ctx: &CallContext, keys: Vec<String>, bufs: Vec<Vec<u8>>) -> Result<()>;

    /// Looks up every key independently.
    fn fetch(&self, ctx: &CallContext, keys: &[String]) -> Fetched<Vec<u8>>;

    /// Releases whatever the backend holds.
    fn stop(&self);
}
