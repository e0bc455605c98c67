//! RangeDirectory - owns the store, the cache and the interval index
//!
//! Operations are grouped behind borrowed accessors:
//! - [`lookups()`](RangeDirectory::lookups) - the read path
//! - [`ranges()`](RangeDirectory::ranges) - bulk ingest and index refresh

use crate::cache::HotCache;
use crate::config::{AppConfig, LookupConfig};
use crate::error::Result;
use crate::index::{IndexStats, SharedIndex};
use crate::ingest::Ranges;
use crate::lookup::Lookups;
use crate::store::RangeStore;
use std::sync::Arc;
use tracing::info;

pub struct RangeDirectory {
    store: Arc<dyn RangeStore>,
    cache: Arc<dyn HotCache>,
    index: SharedIndex,
    lookup: LookupConfig,
}

impl RangeDirectory {
    /// Open the store and cache named by `config`.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let store = config.store.build()?;
        let cache = config.cache.build();
        info!(
            store = store.name(),
            cache_enabled = cache.is_enabled(),
            lookup_path = ?config.lookup.path,
            "Opened range directory"
        );
        Ok(Self::from_parts(store, cache, config.lookup))
    }

    /// Assemble from already-built handles.
    pub fn from_parts(
        store: Arc<dyn RangeStore>,
        cache: Arc<dyn HotCache>,
        lookup: LookupConfig,
    ) -> Self {
        let index = SharedIndex::new();
        index.initialize();
        Self {
            store,
            cache,
            index,
            lookup,
        }
    }

    pub fn lookups(&self) -> Lookups<'_> {
        Lookups::new(self)
    }

    pub fn ranges(&self) -> Ranges<'_> {
        Ranges::new(self)
    }

    pub fn index(&self) -> &SharedIndex {
        &self.index
    }

    pub fn index_stats(&self) -> IndexStats {
        self.index.statistics()
    }

    pub fn store(&self) -> &Arc<dyn RangeStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn HotCache> {
        &self.cache
    }

    pub fn lookup_config(&self) -> LookupConfig {
        self.lookup
    }
}
