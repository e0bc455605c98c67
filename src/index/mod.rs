//! Interval Index Module
//!
//! Point-in-interval lookup over non-overlapping card ranges.
//!
//! Design:
//! - IntervalTree: AVL tree keyed by interval start, each node carrying the
//!   max end of its subtree so whole subtrees can be skipped on search
//! - SharedIndex: publishes one immutable tree at a time; readers never see
//!   a half-built tree, rebuilds swap a fresh tree in

mod interval_tree;
mod shared;

pub use interval_tree::IntervalTree;
pub use shared::{IndexStats, RebuildReport, SharedIndex};

/// Anything with an inclusive `[start, end]` range.
///
/// `None` stands for a missing (or unrepresentable) bound; the tree refuses
/// such payloads.
pub trait Interval {
    /// Inclusive lower bound
    fn interval_start(&self) -> Option<u64>;

    /// Inclusive upper bound
    fn interval_end(&self) -> Option<u64>;
}

impl Interval for (u64, u64) {
    fn interval_start(&self) -> Option<u64> {
        Some(self.0)
    }

    fn interval_end(&self) -> Option<u64> {
        Some(self.1)
    }
}
