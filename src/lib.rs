//! FIFO Cache - A fixed-capacity in-process key/value cache
//!
//! O(1) inserts, updates, lookups and evictions. Eviction follows write
//! order, and expired entries are detected lazily on read.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;

pub use cache::{Cache, CacheStats, CallContext, EstimateSize, Fetched, FifoCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::FifoCacheConfig;
pub use error::{CacheError, Result};
pub use metrics::{CacheMetrics, MetricsSink, NoopMetrics};
