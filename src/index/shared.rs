//! Shared Index Envelope
//!
//! Holds the currently published `IntervalTree` behind an `Arc`. Readers
//! clone the `Arc` under a brief read lock and search without holding it.
//! A rebuild constructs a brand-new tree off to the side, then swaps the
//! pointer under the write lock, so readers are only blocked for the swap.
//! Rebuilds are serialized against each other.

use super::{Interval, IntervalTree};
use crate::error::{RangeError, Result};
use crate::types::CardRange;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Progress is logged every this many inserted ranges.
const REBUILD_PROGRESS_EVERY: usize = 50_000;

/// Point-in-time metrics of the published index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub size: usize,
    pub height: u32,
    pub initialized: bool,
}

/// Outcome of a successful rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    /// Entries offered to the rebuild
    pub total: usize,
    /// Entries inserted into the new tree
    pub processed: usize,
    /// Entries dropped for a missing, negative or inverted bound
    pub skipped: usize,
    pub size: usize,
    pub height: u32,
    pub elapsed: Duration,
}

pub struct SharedIndex<T = CardRange> {
    current: RwLock<Option<Arc<IntervalTree<T>>>>,
    rebuild_lock: Mutex<()>,
}

impl<T: Interval> SharedIndex<T> {
    /// An envelope with nothing published. Every lookup misses until
    /// [`initialize`](Self::initialize) or [`rebuild`](Self::rebuild).
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Publish an empty tree.
    pub fn initialize(&self) {
        let _serial = self.rebuild_lock.lock();
        *self.current.write() = Some(Arc::new(IntervalTree::new()));
        info!("Shared interval index initialized");
    }

    /// The published tree, if any. Stays valid (and unchanged) even if a
    /// rebuild replaces it afterwards.
    pub fn snapshot(&self) -> Option<Arc<IntervalTree<T>>> {
        self.current.read().clone()
    }

    /// Find the range containing `pan` in the published tree.
    pub fn lookup(&self, pan: u64) -> Option<T>
    where
        T: Clone,
    {
        let Some(tree) = self.snapshot() else {
            warn!("Interval index not initialized yet");
            return None;
        };
        let hit = tree.find_containing(pan).cloned();
        if hit.is_some() {
            debug!(pan, "Found card range in shared index");
        } else {
            debug!(pan, "No card range in shared index");
        }
        hit
    }

    /// Build a fresh tree from `ranges` and publish it.
    ///
    /// Entries with a missing/negative bound or with start > end are skipped
    /// with a warning. If an insert still fails the rebuild is abandoned and
    /// the previous tree stays published.
    pub fn rebuild<I>(&self, ranges: I) -> Result<RebuildReport>
    where
        I: IntoIterator<Item = T>,
    {
        let _serial = self.rebuild_lock.lock();
        self.build_and_publish(ranges)
    }

    /// Like [`rebuild`](Self::rebuild), but `load` runs after the rebuild
    /// lock is taken, so the snapshot it reads is never published over a
    /// newer one. A `load` error leaves the previous tree published.
    pub fn rebuild_from<F, I>(&self, load: F) -> Result<RebuildReport>
    where
        F: FnOnce() -> Result<I>,
        I: IntoIterator<Item = T>,
    {
        let _serial = self.rebuild_lock.lock();
        let ranges = load()?;
        self.build_and_publish(ranges)
    }

    // Caller holds `rebuild_lock`.
    fn build_and_publish<I>(&self, ranges: I) -> Result<RebuildReport>
    where
        I: IntoIterator<Item = T>,
    {
        let started = Instant::now();
        let ranges = ranges.into_iter();
        let (hint, _) = ranges.size_hint();
        info!(ranges = hint, "Starting interval index rebuild");

        let mut tree = IntervalTree::new();
        let mut total = 0usize;
        let mut processed = 0usize;
        let mut skipped = 0usize;

        for range in ranges {
            total += 1;
            match (range.interval_start(), range.interval_end()) {
                (Some(start), Some(end)) if start <= end => {}
                (start, end) => {
                    warn!(position = total, ?start, ?end, "Skipping invalid card range");
                    skipped += 1;
                    continue;
                }
            }
            tree.insert(range).map_err(|e| {
                error!(position = total, error = %e, "Rebuild abandoned, keeping previous index");
                RangeError::IndexFatal(format!("insert of range {} failed: {}", total, e))
            })?;
            processed += 1;
            if processed % REBUILD_PROGRESS_EVERY == 0 {
                info!(processed, "Rebuild progress");
            }
        }

        let size = tree.size();
        let height = tree.height();
        *self.current.write() = Some(Arc::new(tree));

        let elapsed = started.elapsed();
        info!(
            processed,
            total,
            skipped,
            size,
            height,
            elapsed_ms = elapsed.as_millis() as u64,
            "Interval index rebuild completed"
        );
        Ok(RebuildReport {
            total,
            processed,
            skipped,
            size,
            height,
            elapsed,
        })
    }

    pub fn statistics(&self) -> IndexStats {
        match self.snapshot() {
            Some(tree) => IndexStats {
                size: tree.size(),
                height: tree.height(),
                initialized: true,
            },
            None => IndexStats {
                size: 0,
                height: 0,
                initialized: false,
            },
        }
    }

    pub fn ready(&self) -> bool {
        self.current.read().is_some()
    }
}

impl<T: Interval> Default for SharedIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}
