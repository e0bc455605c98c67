// cardrange v0.1.0 - 3-D Secure Card-Range Directory
// AVL interval index + read-through cache over a range-catalog store

pub mod types;
pub mod error;
pub mod pan;
pub mod index;
pub mod cache;
pub mod store;
pub mod config;
pub mod directory;
pub mod lookup;
pub mod ingest;
pub mod init;

// Re-export main types
pub use directory::RangeDirectory;
pub use error::{CacheError, IndexError, RangeError, Result, StoreError};
pub use types::{BulkImportResponse, CachedRecord, CardRange, CardRangeData, PResMessage};
pub use index::{IndexStats, Interval, IntervalTree, RebuildReport, SharedIndex};
pub use cache::{CacheConfig, CacheMode, HotCache};
pub use store::{RangeStore, StoreConfig, StoreMode};
pub use config::{AppConfig, LookupConfig, LookupPath};
pub use lookup::Lookups;
pub use ingest::Ranges;
pub use init::DataInitializer;
