//! Configuration Module
//!
//! Handles loading and managing FIFO cache configuration from environment
//! variables or any serde-compatible source.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CacheError, Result};

/// FIFO cache configuration parameters.
///
/// Both values default to zero: a zero `size` disables the cache entirely and
/// a zero `validity` disables time-based expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FifoCacheConfig {
    /// Maximum number of entries the cache can hold
    pub size: usize,
    /// How long an entry stays valid after its last write
    #[serde(with = "humantime_validity")]
    pub validity: Duration,
}

impl FifoCacheConfig {
    /// Creates a config with explicit size and validity.
    pub fn new(size: usize, validity: Duration) -> Self {
        Self { size, validity }
    }

    /// Creates a new config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FIFOCACHE_SIZE` - Number of entries to cache (default: 0)
    /// - `FIFOCACHE_DURATION` - Expiry duration, e.g. `30s` or `1h30m` (default: 0)
    pub fn from_env() -> Self {
        Self::from_env_with_prefix("")
    }

    /// Same as [`from_env`](Self::from_env), with every variable name
    /// prefixed.
    ///
    /// The prefix is upper-cased and `.`/`-` become `_`, so a prefix of
    /// `"store.chunks."` reads `STORE_CHUNKS_FIFOCACHE_SIZE`.
    pub fn from_env_with_prefix(prefix: &str) -> Self {
        let prefix = env_prefix(prefix);
        let defaults = Self::default();

        let size_var = format!("{prefix}FIFOCACHE_SIZE");
        let size = match env::var(&size_var) {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(var = %size_var, value = %raw, "Ignoring unparsable cache size");
                defaults.size
            }),
            Err(_) => defaults.size,
        };

        let validity_var = format!("{prefix}FIFOCACHE_DURATION");
        let validity = match env::var(&validity_var) {
            Ok(raw) => parse_duration(&raw).unwrap_or_else(|err| {
                warn!(var = %validity_var, error = %err, "Ignoring unparsable cache validity");
                defaults.validity
            }),
            Err(_) => defaults.validity,
        };

        Self { size, validity }
    }

    /// Returns true if the configuration describes a usable cache.
    pub fn is_enabled(&self) -> bool {
        self.size > 0
    }
}

fn env_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

// == Duration Parsing ==
/// Parses a duration string such as `"300ms"`, `"30s"` or `"1h 30m"`.
///
/// Anything [`humantime`] understands is accepted. A bare integer is read as
/// whole seconds.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let text = input.trim();
    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(text)
        .map_err(|err| CacheError::InvalidDuration(format!("{input:?}: {err}")))
}

/// Serde adapter for the validity field: written as a humantime string,
/// read from either a humantime string or integer seconds.
mod humantime_validity {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawValidity {
            Seconds(u64),
            Text(String),
        }

        match RawValidity::deserialize(deserializer)? {
            RawValidity::Seconds(secs) => Ok(Duration::from_secs(secs)),
            RawValidity::Text(text) => {
                super::parse_duration(&text).map_err(serde::de::Error::custom)
            }
        }
    }
}
