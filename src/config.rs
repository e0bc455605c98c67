//! Application configuration
//!
//! One JSON document with kebab-case keys; every section is optional.
//!
//! ```json
//! {
//!   "data":   { "init": { "enabled": true, "file": "file:./pres.json", "clear-existing": false } },
//!   "cache":  { "mode": "memory", "ttl-secs": 3600, "max-entries": 100000 },
//!   "store":  { "mode": "sqlite", "path": "./data/card_ranges.db" },
//!   "lookup": { "path": "index-first", "rebuild-after-ingest": true }
//! }
//! ```

use crate::cache::CacheConfig;
use crate::error::{RangeError, Result};
use crate::store::StoreConfig;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppConfig {
    pub data: DataConfig,
    pub cache: CacheConfig,
    pub store: StoreConfig,
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DataConfig {
    pub init: DataInitConfig,
}

/// Startup bulk load
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DataInitConfig {
    pub enabled: bool,
    /// PRes JSON file, optionally prefixed with `file:`
    pub file: Option<String>,
    /// Parsed and logged, never acted on
    pub clear_existing: bool,
}

/// Which tiers a lookup consults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupPath {
    /// cache → store - DEFAULT
    #[default]
    StoreOnly,

    /// index → cache → store
    IndexFirst,
}

impl LookupPath {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().replace('_', "-").as_str() {
            "index-first" | "index" | "tree" => LookupPath::IndexFirst,
            "store-only" | "store" | "cache-store" => LookupPath::StoreOnly,
            _ => LookupPath::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LookupConfig {
    pub path: LookupPath,
    /// Refresh the index from the store after every bulk ingest
    pub rebuild_after_ingest: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            path: LookupPath::default(),
            rebuild_after_ingest: true,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RangeError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that cannot work.
    pub fn validate(&self) -> Result<()> {
        let init = &self.data.init;
        if init.enabled && init.file.as_deref().map_or(true, |f| f.trim().is_empty()) {
            return Err(RangeError::Config(
                "data.init.enabled is set but data.init.file is empty".to_string(),
            ));
        }
        if self.cache.max_entries == Some(0) {
            return Err(RangeError::Config(
                "cache.max-entries must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
