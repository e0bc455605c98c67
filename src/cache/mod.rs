//! Hot-Key Cache Module
//!
//! Read-through cache in front of the range-catalog store, selectable at
//! runtime.
//!
//! # Example
//! ```ignore
//! use cardrange::cache::{CacheConfig, CacheMode};
//!
//! // Unbounded, no expiry
//! let cache = CacheConfig::new(CacheMode::Memory).build();
//!
//! // Every lookup goes to the store
//! let cache = CacheConfig::new(CacheMode::Disabled).build();
//! ```

mod memory;
mod noop;
mod traits;

pub use memory::MemoryCache;
pub use noop::NoOpCache;
pub use traits::HotCache;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Cache mode - selectable at runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// No caching
    Disabled,

    /// In-process map - DEFAULT
    #[default]
    Memory,
}

impl CacheMode {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "off" | "disabled" | "none" | "noop" => CacheMode::Disabled,
            "memory" | "mem" | "in-memory" => CacheMode::Memory,
            _ => CacheMode::default(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    /// Cache mode
    pub mode: CacheMode,
    /// Entry lifetime in seconds (`None` = until evicted or deleted)
    pub ttl_secs: Option<u64>,
    /// Entry bound (`None` = unbounded)
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    /// Create config with specific mode
    pub fn new(mode: CacheMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set entry lifetime
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = Some(ttl.as_secs());
        self
    }

    /// Set entry bound
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Create cache instance based on config
    pub fn build(&self) -> Arc<dyn HotCache> {
        match self.mode {
            CacheMode::Disabled => Arc::new(NoOpCache::new()),
            CacheMode::Memory => Arc::new(MemoryCache::with_limits(
                self.ttl_secs.map(Duration::from_secs),
                self.max_entries,
            )),
        }
    }
}

/// JSON helpers. Failures are logged and reported as `false` / `None`,
/// never as errors.
impl dyn HotCache {
    /// Serialize `value` to JSON and store it under `key`.
    pub fn write_one<T: Serialize>(&self, key: &str, value: &T) -> bool {
        if key.trim().is_empty() {
            warn!("Cannot write to cache: key is empty");
            return false;
        }
        let bytes = match serde_json::to_vec(value) {
            Ok(b) => b,
            Err(e) => {
                error!(key, error = %e, "Failed to serialize cache value");
                return false;
            }
        };
        match self.put(key, &bytes) {
            Ok(()) => {
                debug!(key, "Wrote value to cache");
                true
            }
            Err(e) => {
                error!(key, error = %e, "Failed to write value to cache");
                false
            }
        }
    }

    /// Fetch and deserialize the value under `key`. Undecodable values count
    /// as a miss.
    pub fn find_one<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if key.trim().is_empty() {
            warn!("Cannot read from cache: key is empty");
            return None;
        }
        let bytes = match self.get(key) {
            Ok(Some(b)) => b,
            Ok(None) => {
                debug!(key, "Cache miss");
                return None;
            }
            Err(e) => {
                error!(key, error = %e, "Failed to read value from cache");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(v) => {
                debug!(key, "Cache hit");
                Some(v)
            }
            Err(e) => {
                error!(key, error = %e, "Failed to deserialize cached value");
                None
            }
        }
    }

    /// Remove `key`; `true` only if a value was actually removed.
    pub fn delete_one(&self, key: &str) -> bool {
        if key.trim().is_empty() {
            warn!("Cannot delete from cache: key is empty");
            return false;
        }
        match self.delete(key) {
            Ok(removed) => removed,
            Err(e) => {
                error!(key, error = %e, "Failed to delete key from cache");
                false
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        if key.trim().is_empty() {
            return false;
        }
        self.exists(key).unwrap_or_else(|e| {
            error!(key, error = %e, "Failed to check key existence in cache");
            false
        })
    }
}
