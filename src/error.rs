//! Error types for the FIFO cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// The cache itself has no runtime failure modes; these variants cover caller
/// contract violations and configuration parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A batch write was given a different number of keys and values
    #[error("Batch length mismatch: {keys} keys but {values} values")]
    LengthMismatch { keys: usize, values: usize },

    /// A validity duration could not be parsed
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
