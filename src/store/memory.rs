//! In-Memory Range Store
//!
//! BTreeMap keyed by (start_range, id). Point lookups take the greatest key
//! at or below the PAN, then check its end.

use super::RangeStore;
use crate::error::StoreError;
use crate::types::CardRange;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct MemoryRangeStore {
    rows: RwLock<BTreeMap<(u64, u64), CardRange>>,
    next_id: AtomicU64,
}

impl MemoryRangeStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryRangeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeStore for MemoryRangeStore {
    fn insert(&self, range: &CardRange) -> Result<u64, StoreError> {
        range.check_constraints()?;

        let mut rows = self.rows.write();
        let start = range.start_range;
        let duplicate = rows
            .range((start, 0)..=(start, u64::MAX))
            .any(|(_, r)| r.end_range == range.end_range);
        if duplicate {
            return Err(StoreError::Unique(format!(
                "range {}-{} already exists",
                range.start_range, range.end_range
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut row = range.clone();
        row.id = Some(id);
        rows.insert((start, id), row);
        Ok(id)
    }

    fn find_containing(&self, pan: u64) -> Result<Option<CardRange>, StoreError> {
        let rows = self.rows.read();
        let candidate = rows
            .range(..=(pan, u64::MAX))
            .next_back()
            .map(|(_, r)| r)
            .filter(|r| r.contains(pan));
        Ok(candidate.cloned())
    }

    fn scan_all(&self) -> Result<Vec<CardRange>, StoreError> {
        Ok(self.rows.read().values().cloned().collect())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.rows.read().len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
