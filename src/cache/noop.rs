//! No-Op Cache Implementation
//!
//! Stores nothing. Every lookup falls through to the store.

use super::HotCache;
use crate::error::CacheError;

/// A cache that never holds anything (null object pattern)
///
/// Use for:
/// - Deployments that want every lookup served by the store or index
/// - Tests that must observe store traffic
pub struct NoOpCache;

impl NoOpCache {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HotCache for NoOpCache {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    fn put(&self, _key: &str, _value: &[u8]) -> Result<(), CacheError> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    fn len(&self) -> usize {
        0
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_cache() {
        let cache = NoOpCache::new();
        cache.put("look_up_1", b"{}").unwrap();
        assert_eq!(cache.get("look_up_1").unwrap(), None);
        assert!(!cache.exists("look_up_1").unwrap());
        assert!(!cache.delete("look_up_1").unwrap());
        assert_eq!(cache.len(), 0);
        assert!(!cache.is_enabled());
    }
}
