//! Error types for the card-range directory
//!
//! Each seam has its own enum: the store, the cache and the interval index.
//! `RangeError` is what the coordinators hand back to callers.

use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, RangeError>;

/// Errors surfaced by the lookup / ingest coordinators and the loaders.
#[derive(Debug, Error)]
pub enum RangeError {
    /// Missing, negative or malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Range-catalog store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Unexpected fault while building a replacement index.
    /// The previously published index stays in force.
    #[error("Index rebuild failed: {0}")]
    IndexFatal(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (config and PRes files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decode error (config and PRes files)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a [`RangeStore`](crate::store::RangeStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Row violates a column or range constraint
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Row collides with an existing one
    #[error("Uniqueness violation: {0}")]
    Unique(String),

    /// Backend is unreachable or misbehaving
    #[error("Backend failure: {0}")]
    Backend(String),

    /// SQLite driver error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors raised by a [`HotCache`](crate::cache::HotCache).
///
/// These never leave the lookup path: a read error is a miss and a write
/// error is a no-op.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Cache backend cannot be reached
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Value could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the interval index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Payload has a missing bound
    #[error("Invalid interval: {0}")]
    InvalidInput(String),
}
