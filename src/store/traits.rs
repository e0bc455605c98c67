//! Range-Catalog Store Trait Definitions

use crate::error::StoreError;
use crate::types::CardRange;

/// Persistent row store of card ranges (the source of truth).
///
/// Implementations:
/// - `MemoryRangeStore`: ordered in-process map, lost on exit
/// - `SqliteRangeStore`: `card_range` table with a unique
///   `(start_range, end_range)` index
///
/// Both answer `find_containing` by locating the range with the greatest
/// start not above the PAN, so the answer is only exact for non-overlapping
/// catalogs.
pub trait RangeStore: Send + Sync {
    /// Persist one range, returning the id assigned to it
    fn insert(&self, range: &CardRange) -> Result<u64, StoreError>;

    /// The range whose `[start, end]` contains `pan`
    fn find_containing(&self, pan: u64) -> Result<Option<CardRange>, StoreError>;

    /// Every stored range, ordered by start (feeds index rebuilds)
    fn scan_all(&self) -> Result<Vec<CardRange>, StoreError>;

    /// Number of stored ranges
    fn count(&self) -> Result<usize, StoreError>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
