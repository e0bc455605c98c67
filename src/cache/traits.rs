//! Hot-Key Cache Trait Definitions

use crate::error::CacheError;

/// Opaque key/value cache with string keys and byte values.
///
/// Implementations:
/// - `NoOpCache`: stores nothing, every read misses
/// - `MemoryCache`: in-process sharded map with optional TTL and bound
///
/// Callers on the lookup path go through the JSON helpers on `dyn HotCache`
/// (`write_one`, `find_one`, ...), which log and swallow errors.
pub trait HotCache: Send + Sync {
    /// Fetch the raw value for `key`
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Remove `key`; `true` if something was removed
    fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Whether `key` currently holds a live value
    fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Number of stored entries (may include not-yet-reaped expired ones)
    fn len(&self) -> usize;

    /// Whether the cache stores anything at all
    fn is_enabled(&self) -> bool;
}
