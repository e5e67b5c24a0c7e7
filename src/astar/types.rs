//! Search nodes and the bounded open set.

use crate::design::Design;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A frontier entry of the best-first search.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// The design this node stands for.
    pub design: Design,
    /// Raw criterion value of `design`.
    pub value: f64,
    /// Accumulated move cost from the root (one per expansion step).
    pub g: f64,
    /// Heuristic: the criterion value oriented so lower is better.
    pub h: f64,
    /// Priority key `g + h`.
    pub f: f64,
    /// Depth in the search tree.
    pub depth: usize,
    /// Index of the expanded parent in the engine's trace, `None` for the root.
    pub parent: Option<usize>,
    /// Layout fingerprint used for deduplication.
    pub fingerprint: u64,
    /// Insertion order, used to break ties in favour of older nodes.
    pub seq: u64,
}

impl SearchNode {
    /// Orders nodes by `(f, seq)`: smaller is better.
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.f.total_cmp(&other.f).then(self.seq.cmp(&other.seq))
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    /// Reversed key order, so the max-heap yields the best node first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key_cmp(self)
    }
}

/// Capacity-limited frontier ordered by `(f, insertion order)`.
///
/// Backed by a binary heap; [`trim`](Self::trim) drops the worst entries
/// once the size exceeds capacity.
#[derive(Debug)]
pub struct OpenSet {
    heap: BinaryHeap<SearchNode>,
    capacity: usize,
}

impl OpenSet {
    /// Creates an empty open set holding at most `capacity` nodes after a trim.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Number of queued nodes.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the frontier is exhausted.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Maximum size kept by [`trim`](Self::trim).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queues a node.
    pub fn push(&mut self, node: SearchNode) {
        self.heap.push(node);
    }

    /// Removes the node with the lowest `f` (oldest first on ties).
    pub fn pop(&mut self) -> Option<SearchNode> {
        self.heap.pop()
    }

    /// Peeks at the node [`pop`](Self::pop) would return.
    pub fn peek(&self) -> Option<&SearchNode> {
        self.heap.peek()
    }

    /// Evicts the worst nodes until the set is back at capacity.
    ///
    /// Returns the number of evicted nodes.
    pub fn trim(&mut self) -> usize {
        let excess = self.heap.len().saturating_sub(self.capacity);
        if excess == 0 {
            return 0;
        }
        // Ascending heap order puts the worst keys first.
        let mut nodes = std::mem::take(&mut self.heap).into_sorted_vec();
        nodes.drain(..excess);
        self.heap = BinaryHeap::from(nodes);
        excess
    }
}
