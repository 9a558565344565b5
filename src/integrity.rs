//! Independent invariant sweep
//!
//! Breadth-first walk over the whole tree checking the node invariants:
//! every question has both children, every leaf has none, and every handle
//! encountered still resolves. Used as a standalone diagnostic and as the
//! final gate after a load.

use crate::queue::BfsQueue;
use crate::tree::DecisionTree;

/// Check the Question/Leaf invariants over every reachable node
///
/// An absent root is vacuously valid. Returns `false` on the first question
/// missing a child, leaf holding one, or handle that no longer resolves.
pub fn check(tree: &DecisionTree) -> bool {
    let Some(root) = tree.root() else {
        return true;
    };

    // The sweep does no numbering; the queue's id slot rides along as 0
    let mut queue = BfsQueue::new();
    queue.push_back(root, 0);

    while let Some((current, _)) = queue.pop_front() {
        let Ok(node) = tree.node(current) else {
            return false;
        };
        if node.is_question() {
            let (Some(yes), Some(no)) = (node.yes(), node.no()) else {
                return false;
            };
            queue.push_back(yes, 0);
            queue.push_back(no, 0);
        } else if node.yes().is_some() || node.no().is_some() {
            return false;
        }
    }
    true
}
