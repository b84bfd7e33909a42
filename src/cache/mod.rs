//! Cache Module
//!
//! Provides a fixed-capacity in-memory cache with write-order (FIFO) eviction
//! and lazy TTL invalidation.

mod backend;
mod entry;
mod fifo;
mod ring;
mod size;
mod stats;


// Re-export public types
pub use backend::{Cache, CallContext, Fetched};
pub use entry::CacheEntry;
pub use fifo::FifoCache;
pub(crate) use ring::SlotRing;
pub use size::EstimateSize;
pub use stats::CacheStats;
