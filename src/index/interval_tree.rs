//! AVL Interval Tree
//!
//! O(log n) insert and point-containment search. Nodes are ordered by
//! interval start (ties go right) and augmented with the maximum end found
//! in their subtree.

use super::Interval;
use crate::error::IndexError;
use crate::pan;

struct Node<T> {
    start: u64,
    end: u64,
    /// max(end, left.max_end, right.max_end)
    max_end: u64,
    /// 1 for a leaf
    height: u32,
    left: Option<Box<Node<T>>>,
    right: Option<Box<Node<T>>>,
    payload: T,
}

impl<T> Node<T> {
    fn leaf(start: u64, end: u64, payload: T) -> Box<Self> {
        Box::new(Self {
            start,
            end,
            max_end: end,
            height: 1,
            left: None,
            right: None,
            payload,
        })
    }

    /// Recompute height and max_end from the children.
    fn update(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
        let mut max_end = self.end;
        if let Some(l) = &self.left {
            max_end = max_end.max(l.max_end);
        }
        if let Some(r) = &self.right {
            max_end = max_end.max(r.max_end);
        }
        self.max_end = max_end;
    }

    fn balance_factor(&self) -> i64 {
        height(&self.left) as i64 - height(&self.right) as i64
    }
}

fn height<T>(node: &Option<Box<Node<T>>>) -> u32 {
    node.as_ref().map_or(0, |n| n.height)
}

/// Self-balancing interval tree for non-overlapping ranges.
///
/// Overlap is not detected. With overlapping input a search still returns a
/// range that contains the value, but which one is unspecified.
pub struct IntervalTree<T> {
    root: Option<Box<Node<T>>>,
    size: usize,
}

impl<T: Interval> IntervalTree<T> {
    pub fn new() -> Self {
        Self { root: None, size: 0 }
    }

    /// Insert a payload. Fails only when a bound is missing.
    pub fn insert(&mut self, payload: T) -> Result<(), IndexError> {
        let (start, end) = match (payload.interval_start(), payload.interval_end()) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                return Err(IndexError::InvalidInput(
                    "interval must have both start and end".to_string(),
                ))
            }
        };
        let root = self.root.take();
        self.root = Some(Self::insert_at(root, Node::leaf(start, end, payload)));
        self.size += 1;
        Ok(())
    }

    fn insert_at(node: Option<Box<Node<T>>>, new: Box<Node<T>>) -> Box<Node<T>> {
        let mut node = match node {
            Some(n) => n,
            None => return new,
        };
        if new.start < node.start {
            node.left = Some(Self::insert_at(node.left.take(), new));
        } else {
            node.right = Some(Self::insert_at(node.right.take(), new));
        }
        node.update();
        Self::rebalance(node)
    }

    fn rebalance(mut node: Box<Node<T>>) -> Box<Node<T>> {
        let bf = node.balance_factor();
        if bf > 1 {
            // left-right case: straighten the left child first
            if node.left.as_ref().map_or(false, |l| l.balance_factor() < 0) {
                node.left = node.left.take().map(Self::rotate_left);
            }
            node = Self::rotate_right(node);
        } else if bf < -1 {
            // right-left case
            if node.right.as_ref().map_or(false, |r| r.balance_factor() > 0) {
                node.right = node.right.take().map(Self::rotate_right);
            }
            node = Self::rotate_left(node);
        }
        node
    }

    fn rotate_left(mut x: Box<Node<T>>) -> Box<Node<T>> {
        match x.right.take() {
            Some(mut y) => {
                x.right = y.left.take();
                x.update();
                y.left = Some(x);
                y.update();
                y
            }
            None => x,
        }
    }

    fn rotate_right(mut y: Box<Node<T>>) -> Box<Node<T>> {
        match y.left.take() {
            Some(mut x) => {
                y.left = x.right.take();
                y.update();
                x.right = Some(y);
                x.update();
                x
            }
            None => y,
        }
    }

    /// Find the interval containing `value`, if any.
    pub fn find_containing(&self, value: u64) -> Option<&T> {
        Self::find_at(self.root.as_deref(), value).map(|n| &n.payload)
    }

    /// Same as [`find_containing`](Self::find_containing), keyed by a PAN
    /// string run through the 16-digit coercion.
    pub fn find_containing_str(&self, value: &str) -> Option<&T> {
        pan::coerce(value).and_then(|v| self.find_containing(v))
    }

    fn find_at(node: Option<&Node<T>>, value: u64) -> Option<&Node<T>> {
        let node = node?;
        if node.start <= value && value <= node.end {
            return Some(node);
        }
        if let Some(left) = node.left.as_deref() {
            if value <= left.max_end {
                if let Some(hit) = Self::find_at(Some(left), value) {
                    return Some(hit);
                }
            }
        }
        if node.start <= value {
            return Self::find_at(node.right.as_deref(), value);
        }
        None
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Height of the root, 0 when empty.
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }

    /// Payloads in start order.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }

    /// Check ordering, heights, AVL balance and the max-end augmentation.
    pub fn validate(&self) -> Result<(), String> {
        let mut count = 0usize;
        Self::validate_at(self.root.as_deref(), None, None, &mut count)?;
        if count != self.size {
            return Err(format!("size counter {} but {} nodes reachable", self.size, count));
        }
        Ok(())
    }

    /// Returns (height, max_end) of the subtree.
    fn validate_at(
        node: Option<&Node<T>>,
        lower: Option<u64>,
        upper: Option<u64>,
        count: &mut usize,
    ) -> Result<(u32, Option<u64>), String> {
        let node = match node {
            Some(n) => n,
            None => return Ok((0, None)),
        };
        *count += 1;
        if lower.map_or(false, |lo| node.start < lo) {
            return Err(format!("node {} sits left of its lower bound", node.start));
        }
        if upper.map_or(false, |hi| node.start > hi) {
            return Err(format!("node {} sits right of its upper bound", node.start));
        }
        let (lh, lmax) = Self::validate_at(node.left.as_deref(), lower, Some(node.start), count)?;
        let (rh, rmax) = Self::validate_at(node.right.as_deref(), Some(node.start), upper, count)?;

        let expected_height = 1 + lh.max(rh);
        if node.height != expected_height {
            return Err(format!(
                "node {} height {} expected {}",
                node.start, node.height, expected_height
            ));
        }
        if (lh as i64 - rh as i64).abs() > 1 {
            return Err(format!("node {} unbalanced ({} vs {})", node.start, lh, rh));
        }
        let expected_max = [Some(node.end), lmax, rmax].into_iter().flatten().max();
        if Some(node.max_end) != expected_max {
            return Err(format!(
                "node {} max_end {} expected {:?}",
                node.start, node.max_end, expected_max
            ));
        }
        Ok((node.height, Some(node.max_end)))
    }
}

impl<T: Interval> Default for IntervalTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-order iterator over tree payloads.
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(&node.payload)
    }
}
