//! Range-Catalog Store Module
//!
//! The durable source of truth for card ranges.
//!
//! # Example
//! ```ignore
//! use cardrange::store::{StoreConfig, StoreMode};
//!
//! let store = StoreConfig::new(StoreMode::Memory).build()?;
//! let store = StoreConfig::sqlite("./data/ranges.db").build()?;
//! ```

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;
mod traits;

pub use memory::MemoryRangeStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRangeStore;
pub use traits::RangeStore;

use crate::error::StoreError;
use serde::Deserialize;
use std::sync::Arc;

/// Default catalog file for the SQLite backend
pub const DEFAULT_SQLITE_PATH: &str = "./data/card_ranges.db";

/// Store backend - selectable at runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreMode {
    /// In-process ordered map - DEFAULT
    #[default]
    Memory,

    /// SQLite file
    Sqlite,
}

impl StoreMode {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" | "db" | "file" => StoreMode::Sqlite,
            "memory" | "mem" | "in-memory" => StoreMode::Memory,
            _ => StoreMode::default(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StoreConfig {
    /// Backend
    pub mode: StoreMode,
    /// Catalog file (SQLite only, defaults to [`DEFAULT_SQLITE_PATH`])
    pub path: Option<String>,
}

impl StoreConfig {
    /// Create config with specific mode
    pub fn new(mode: StoreMode) -> Self {
        Self { mode, path: None }
    }

    /// SQLite store at `path`
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            mode: StoreMode::Sqlite,
            path: Some(path.into()),
        }
    }

    /// Open the configured backend
    pub fn build(&self) -> Result<Arc<dyn RangeStore>, StoreError> {
        match self.mode {
            StoreMode::Memory => Ok(Arc::new(MemoryRangeStore::new())),
            #[cfg(feature = "sqlite")]
            StoreMode::Sqlite => {
                let path = self.path.as_deref().unwrap_or(DEFAULT_SQLITE_PATH);
                Ok(Arc::new(SqliteRangeStore::open(std::path::Path::new(path))?))
            }
            #[cfg(not(feature = "sqlite"))]
            StoreMode::Sqlite => Err(StoreError::Backend(
                "built without the `sqlite` feature".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!(StoreMode::from_str("SQLite"), StoreMode::Sqlite);
        assert_eq!(StoreMode::from_str("mem"), StoreMode::Memory);
        assert_eq!(StoreMode::from_str("unknown"), StoreMode::Memory);
    }

    #[test]
    fn test_config_deserialize() {
        let cfg: StoreConfig =
            serde_json::from_str(r#"{"mode": "sqlite", "path": "/tmp/x.db"}"#).unwrap();
        assert_eq!(cfg.mode, StoreMode::Sqlite);
        assert_eq!(cfg.path.as_deref(), Some("/tmp/x.db"));

        let cfg: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.mode, StoreMode::Memory);
    }

    #[test]
    fn test_build_memory() {
        let store = StoreConfig::default().build().unwrap();
        assert_eq!(store.name(), "memory");
        assert_eq!(store.count().unwrap(), 0);
    }
}
