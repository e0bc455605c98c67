//! Tests for M1: Lookup Path
//! Covers TC-1.1 (hit), TC-1.2 (miss), TC-1.3 (missing PAN),
//! TC-1.4 (cache then store), TC-1.5 (degraded tiers), TC-1.6 (index-first)
//!
//! Run individual tests with:
//! cargo test tc_1_4 -- --nocapture
//! cargo test m1_lookup_path -- --nocapture

use cardrange::cache::{CacheConfig, CacheMode, MemoryCache};
use cardrange::pan::lookup_key;
use cardrange::store::MemoryRangeStore;
use cardrange::{
    CacheError, CardRange, CardRangeData, HotCache, LookupConfig, LookupPath, PResMessage,
    RangeDirectory, RangeError, RangeStore, StoreError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Store that counts every call it forwards.
#[derive(Default)]
struct CountingStore {
    inner: MemoryRangeStore,
    finds: AtomicUsize,
}

impl RangeStore for CountingStore {
    fn insert(&self, range: &CardRange) -> Result<u64, StoreError> {
        self.inner.insert(range)
    }
    fn find_containing(&self, pan: u64) -> Result<Option<CardRange>, StoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_containing(pan)
    }
    fn scan_all(&self) -> Result<Vec<CardRange>, StoreError> {
        self.inner.scan_all()
    }
    fn count(&self) -> Result<usize, StoreError> {
        self.inner.count()
    }
    fn name(&self) -> &str {
        "counting"
    }
}

/// Cache that counts reads and writes.
#[derive(Default)]
struct CountingCache {
    inner: MemoryCache,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl HotCache for CountingCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }
    fn put(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value)
    }
    fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.inner.delete(key)
    }
    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.inner.exists(key)
    }
    fn len(&self) -> usize {
        self.inner.len()
    }
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Cache whose backend is unreachable.
struct DownCache;

impl HotCache for DownCache {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
    fn put(&self, _key: &str, _value: &[u8]) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
    fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
    fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
    fn len(&self) -> usize {
        0
    }
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Store whose backend is unreachable.
struct DownStore;

impl RangeStore for DownStore {
    fn insert(&self, _range: &CardRange) -> Result<u64, StoreError> {
        Err(StoreError::Backend("database is down".to_string()))
    }
    fn find_containing(&self, _pan: u64) -> Result<Option<CardRange>, StoreError> {
        Err(StoreError::Backend("database is down".to_string()))
    }
    fn scan_all(&self) -> Result<Vec<CardRange>, StoreError> {
        Err(StoreError::Backend("database is down".to_string()))
    }
    fn count(&self) -> Result<usize, StoreError> {
        Err(StoreError::Backend("database is down".to_string()))
    }
    fn name(&self) -> &str {
        "down"
    }
}

const START: i64 = 1234567890000000;
const END: i64 = 1234567890999999;
const PAN: i64 = 1234567890123456;

fn sample_range() -> CardRangeData {
    CardRangeData {
        action_ind: Some("Y".to_string()),
        acs_start_protocol_version: Some("2.1.0".to_string()),
        acs_end_protocol_version: Some("2.2.0".to_string()),
        three_ds_method_url: Some("https://acs.example.com/3ds-method".to_string()),
        acs_info_ind: Some(vec!["01".to_string(), "02".to_string()]),
        ..CardRangeData::new(START, END)
    }
}

fn pres(ranges: Vec<CardRangeData>) -> PResMessage {
    PResMessage {
        serial_num: Some("SN-0001".to_string()),
        message_type: Some("PRes".to_string()),
        ds_trans_id: Some("6f3a2c1e".to_string()),
        card_range_data: ranges,
    }
}

fn setup_counting(lookup: LookupConfig) -> (RangeDirectory, Arc<CountingStore>, Arc<CountingCache>) {
    let store = Arc::new(CountingStore::default());
    let cache = Arc::new(CountingCache::default());
    let dir = RangeDirectory::from_parts(store.clone(), cache.clone(), lookup);
    (dir, store, cache)
}

mod tc_1_1_single_range_hit {
    use super::*;

    #[test]
    fn test_lookup_returns_containing_range() {
        let (dir, _store, _cache) = setup_counting(LookupConfig::default());
        let summary = dir.ranges().process_pres(&pres(vec![sample_range()]));
        assert_eq!(summary.success_count, 1);

        let found = dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(found, Some(sample_range()));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let (dir, _store, _cache) = setup_counting(LookupConfig::default());
        dir.ranges().process_pres(&pres(vec![sample_range()]));

        assert!(dir.lookups().by_pan(Some(START)).unwrap().is_some());
        assert!(dir.lookups().by_pan(Some(END)).unwrap().is_some());
        assert!(dir.lookups().by_pan(Some(START - 1)).unwrap().is_none());
        assert!(dir.lookups().by_pan(Some(END + 1)).unwrap().is_none());
    }
}

mod tc_1_2_miss {
    use super::*;

    #[test]
    fn test_pan_outside_every_range() {
        let (dir, store, cache) = setup_counting(LookupConfig::default());
        dir.ranges().process_pres(&pres(vec![sample_range()]));

        let found = dir.lookups().by_pan(Some(9999999999999999)).unwrap();
        assert!(found.is_none());
        assert_eq!(store.finds.load(Ordering::SeqCst), 1);
        // Misses are not cached
        assert_eq!(cache.puts.load(Ordering::SeqCst), 0);
    }
}

mod tc_1_3_missing_pan {
    use super::*;

    #[test]
    fn test_missing_pan_touches_nothing() {
        let (dir, store, cache) = setup_counting(LookupConfig::default());
        dir.ranges().process_pres(&pres(vec![sample_range()]));

        assert!(dir.lookups().by_pan(None).unwrap().is_none());
        assert_eq!(store.finds.load(Ordering::SeqCst), 0);
        assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_negative_pan_touches_nothing() {
        let (dir, store, cache) = setup_counting(LookupConfig::default());
        assert!(dir.lookups().by_pan(Some(-1)).unwrap().is_none());
        assert_eq!(store.finds.load(Ordering::SeqCst), 0);
        assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
    }
}

mod tc_1_4_cache_then_store {
    use super::*;

    #[test]
    fn test_prepopulated_cache_skips_store() {
        let (dir, store, cache) = setup_counting(LookupConfig::default());
        let cached = CardRangeData {
            action_ind: Some("C".to_string()),
            ..CardRangeData::new(START, END)
        };
        let bytes = serde_json::to_vec(&cached).unwrap();
        cache.put(&lookup_key(PAN as u64), &bytes).unwrap();

        let found = dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(found, Some(cached));
        assert_eq!(store.finds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_store_hit_populates_cache() {
        let (dir, store, cache) = setup_counting(LookupConfig::default());
        dir.ranges().process_pres(&pres(vec![sample_range()]));

        let first = dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(store.finds.load(Ordering::SeqCst), 1);
        assert!(cache.exists(&lookup_key(PAN as u64)).unwrap());

        let second = dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.finds.load(Ordering::SeqCst), 1, "second lookup must be served by the cache");

        // Clear the cache: the store is consulted once more, then the cache again
        assert!(cache.delete(&lookup_key(PAN as u64)).unwrap());
        let third = dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(third, first);
        assert_eq!(store.finds.load(Ordering::SeqCst), 2);

        dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(store.finds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_undecodable_cache_value_falls_through() {
        let (dir, store, cache) = setup_counting(LookupConfig::default());
        dir.ranges().process_pres(&pres(vec![sample_range()]));
        cache.put(&lookup_key(PAN as u64), b"{broken").unwrap();

        let found = dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(found, Some(sample_range()));
        assert_eq!(store.finds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_cache_always_hits_store() {
        let store = Arc::new(CountingStore::default());
        let dir = RangeDirectory::from_parts(
            store.clone(),
            CacheConfig::new(CacheMode::Disabled).build(),
            LookupConfig::default(),
        );
        dir.ranges().process_pres(&pres(vec![sample_range()]));

        for _ in 0..3 {
            assert!(dir.lookups().by_pan(Some(PAN)).unwrap().is_some());
        }
        assert_eq!(store.finds.load(Ordering::SeqCst), 3);
    }
}

mod tc_1_5_degraded_tiers {
    use super::*;

    #[test]
    fn test_cache_down_still_serves_from_store() {
        let store = Arc::new(MemoryRangeStore::new());
        let dir = RangeDirectory::from_parts(store, Arc::new(DownCache), LookupConfig::default());
        dir.ranges().process_pres(&pres(vec![sample_range()]));

        let found = dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(found, Some(sample_range()));
    }

    #[test]
    fn test_store_fault_propagates() {
        let dir = RangeDirectory::from_parts(
            Arc::new(DownStore),
            CacheConfig::default().build(),
            LookupConfig::default(),
        );
        let err = dir.lookups().by_pan(Some(PAN)).unwrap_err();
        assert!(matches!(err, RangeError::Store(StoreError::Backend(_))));
    }
}

mod tc_1_6_index_first {
    use super::*;

    fn index_first() -> LookupConfig {
        LookupConfig {
            path: LookupPath::IndexFirst,
            rebuild_after_ingest: true,
        }
    }

    #[test]
    fn test_index_answers_without_cache_or_store() {
        let (dir, store, cache) = setup_counting(index_first());
        dir.ranges().process_pres(&pres(vec![sample_range()]));
        assert_eq!(dir.index_stats().size, 1);

        let found = dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(found, Some(sample_range()));
        assert_eq!(store.finds.load(Ordering::SeqCst), 0);
        assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_index_miss_falls_back_to_store() {
        let config = LookupConfig {
            path: LookupPath::IndexFirst,
            rebuild_after_ingest: false,
        };
        let (dir, store, _cache) = setup_counting(config);
        dir.ranges().process_pres(&pres(vec![sample_range()]));
        assert_eq!(dir.index_stats().size, 0, "index is only refreshed on demand");

        let found = dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(found, Some(sample_range()));
        assert_eq!(store.finds.load(Ordering::SeqCst), 1);

        dir.ranges().rebuild_index().unwrap();
        dir.lookups().by_pan(Some(PAN)).unwrap();
        assert_eq!(store.finds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lossy_string_lookup() {
        let (dir, _store, _cache) = setup_counting(index_first());
        dir.ranges().process_pres(&pres(vec![sample_range()]));

        // 12345678901 pads to 1234567890100000
        assert!(dir.lookups().by_pan_str("12345678901").unwrap().is_some());
        // Trailing digits past 16 are dropped
        assert!(dir.lookups().by_pan_str("1234567890123456999").unwrap().is_some());
        assert!(dir.lookups().by_pan_str("4111-1111").unwrap().is_none());
    }
}
