//! In-Memory Cache Implementation
//!
//! Sharded map (DashMap) keyed by string.
//! - Optional TTL, checked lazily on read
//! - Optional entry bound, evicting the oldest-inserted key first; a key
//!   that is deleted and put again counts as newly inserted

use super::HotCache;
use crate::error::CacheError;
use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Stale queue slack tolerated before the order queue is compacted.
const ORDER_SLACK: usize = 64;

struct CacheEntry {
    value: Vec<u8>,
    inserted_at: Instant,
    /// Insertion sequence; matches exactly one live item in `order`
    seq: u64,
}

/// In-process hot-key cache
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry, RandomState>,
    /// Insertion order for bounded eviction, as `(key, seq)`. An item whose
    /// seq no longer matches the live entry is stale and gets skipped.
    order: Mutex<VecDeque<(String, u64)>>,
    next_seq: AtomicU64,
    ttl: Option<Duration>,
    max_entries: Option<usize>,
}

impl MemoryCache {
    /// Unbounded cache without expiry
    pub fn new() -> Self {
        Self::with_limits(None, None)
    }

    pub fn with_limits(ttl: Option<Duration>, max_entries: Option<usize>) -> Self {
        Self {
            entries: DashMap::with_hasher(RandomState::new()),
            order: Mutex::new(VecDeque::new()),
            next_seq: AtomicU64::new(0),
            ttl,
            max_entries,
        }
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl.map_or(false, |ttl| entry.inserted_at.elapsed() >= ttl)
    }

    fn is_live(&self, key: &str, seq: u64) -> bool {
        self.entries.get(key).map_or(false, |e| e.seq == seq)
    }

    fn track(&self, key: &str, seq: u64, max: usize) {
        let mut order = self.order.lock();
        order.push_back((key.to_string(), seq));

        while self.entries.len() > max {
            let Some((key, seq)) = order.pop_front() else { break };
            self.entries.remove_if(&key, |_, e| e.seq == seq);
        }

        // Deletes and expiry leave stale items behind
        if order.len() > max.saturating_mul(2) + ORDER_SLACK {
            order.retain(|(key, seq)| self.is_live(key, *seq));
        }
    }

    #[cfg(test)]
    fn queued(&self) -> usize {
        self.order.lock().len()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HotCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        if let Some(entry) = self.entries.get(key) {
            if !self.is_expired(&entry) {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Only drop the entry if it is still the expired one
        self.entries.remove_if(key, |_, e| self.is_expired(e));
        Ok(None)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let entry = CacheEntry {
            value: value.to_vec(),
            inserted_at: Instant::now(),
            seq,
        };
        self.entries.insert(key.to_string(), entry);
        if let Some(max) = self.max_entries {
            self.track(key, seq, max);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let cache = MemoryCache::new();
        cache.put("look_up_1", b"one").unwrap();

        assert_eq!(cache.get("look_up_1").unwrap(), Some(b"one".to_vec()));
        assert!(cache.exists("look_up_1").unwrap());
        assert_eq!(cache.len(), 1);

        assert!(cache.delete("look_up_1").unwrap());
        assert!(!cache.delete("look_up_1").unwrap());
        assert_eq!(cache.get("look_up_1").unwrap(), None);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = MemoryCache::new();
        cache.put("k", b"first").unwrap();
        cache.put("k", b"second").unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(b"second".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = MemoryCache::with_limits(Some(Duration::from_millis(20)), None);
        cache.put("k", b"v").unwrap();
        assert!(cache.exists("k").unwrap());

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("k").unwrap(), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_bounded_evicts_oldest() {
        let cache = MemoryCache::with_limits(None, Some(2));
        cache.put("a", b"1").unwrap();
        cache.put("b", b"2").unwrap();
        cache.put("c", b"3").unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").unwrap(), None);
        assert!(cache.exists("b").unwrap());
        assert!(cache.exists("c").unwrap());
    }

    #[test]
    fn test_concurrent_puts() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(MemoryCache::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..500 {
                        cache.put(&format!("look_up_{}", t * 500 + i), b"{}").unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 4000);
    }

    #[test]
    fn test_reinserted_key_is_newest() {
        let cache = MemoryCache::with_limits(None, Some(2));
        cache.put("a", b"1").unwrap();
        cache.put("b", b"2").unwrap();
        cache.delete("a").unwrap();
        cache.put("a", b"1").unwrap();
        cache.put("c", b"3").unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b").unwrap(), None);
        assert!(cache.exists("a").unwrap());
        assert!(cache.exists("c").unwrap());
    }

    #[test]
    fn test_overwrite_refreshes_order() {
        let cache = MemoryCache::with_limits(None, Some(2));
        cache.put("a", b"1").unwrap();
        cache.put("b", b"2").unwrap();
        cache.put("a", b"1'").unwrap();
        cache.put("c", b"3").unwrap();

        assert_eq!(cache.get("b").unwrap(), None);
        assert_eq!(cache.get("a").unwrap(), Some(b"1'".to_vec()));
        assert!(cache.exists("c").unwrap());
    }

    #[test]
    fn test_order_stays_bounded_under_churn() {
        let cache = MemoryCache::with_limits(None, Some(10));
        for _ in 0..100_000 {
            cache.put("k", b"v").unwrap();
            cache.delete("k").unwrap();
        }
        assert_eq!(cache.len(), 0);
        assert!(cache.queued() <= 2 * 10 + ORDER_SLACK + 1, "queued {}", cache.queued());

        // Eviction still follows insertion order afterwards
        for i in 0..11 {
            cache.put(&format!("k{}", i), b"v").unwrap();
        }
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.get("k0").unwrap(), None);
        assert!(cache.exists("k10").unwrap());
    }

    #[test]
    fn test_expired_key_reput_survives() {
        let cache = MemoryCache::with_limits(Some(Duration::from_millis(20)), Some(4));
        cache.put("k", b"old").unwrap();
        std::thread::sleep(Duration::from_millis(40));

        cache.put("k", b"new").unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(b"new".to_vec()));
        assert_eq!(cache.len(), 1);
    }
}
