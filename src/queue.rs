//! FIFO primitive for breadth-first walks
//!
//! Carries (node handle, integer id) pairs. Persistence uses the id slot for
//! breadth-first numbering; the integrity sweep carries it along unused.

use std::collections::VecDeque;

use crate::tree::NodeId;

/// FIFO queue of (node, id) pairs
#[derive(Debug)]
pub struct BfsQueue {
    entries: VecDeque<(NodeId, u32)>,
}

impl BfsQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append a (node, id) pair at the tail
    pub fn push_back(&mut self, node: NodeId, id: u32) {
        self.entries.push_back((node, id));
    }

    /// Remove and return the head pair, or `None` when empty
    pub fn pop_front(&mut self) -> Option<(NodeId, u32)> {
        self.entries.pop_front()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of queued pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_returns_in_insertion_order() {
        let mut queue = BfsQueue::new();
        let a = NodeId::new(0, 0);
        let b = NodeId::new(1, 0);
        queue.push_back(a, 10);
        queue.push_back(b, 11);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_front(), Some((a, 10)));
        assert_eq!(queue.pop_front(), Some((b, 11)));
        assert_eq!(queue.pop_front(), None);
        assert!(queue.is_empty());
    }
}
