//! Undo/redo edit log
//!
//! Two stacks of [`EditRecord`]. Undo and redo only repoint branch handles;
//! they never allocate or free nodes, so a node created by a split stays
//! allocated while the record that references it is still replayable. A new
//! split invalidates the whole redo history: the tree has diverged, and
//! replaying those records would attach nodes into the wrong shape. The
//! nodes reachable only through the discarded records are reclaimed then.

use tracing::debug;

use crate::stack::Stack;
use crate::tree::{Branch, DecisionTree, NodeId};
use crate::KbError;

/// Where a split attached: the parent node plus the branch that was rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    /// Question node whose branch was rewritten
    pub node: NodeId,
    /// Which branch pointed at the replaced leaf
    pub branch: Branch,
}

/// One recorded split mutation
///
/// Stores handles only, never text: a record is valid solely against the
/// arena that produced it and must not outlive it.
#[derive(Debug, Clone, Copy)]
pub struct EditRecord {
    /// Rewritten attachment point; `None` when the split replaced the root
    pub parent: Option<ParentLink>,
    /// The leaf that was disproven and replaced
    pub old_leaf: NodeId,
    /// The distinguishing question created by the split
    pub new_question: NodeId,
    /// The leaf created for the newly supplied animal
    pub new_leaf: NodeId,
}

/// Paired undo/redo stacks over split mutations
#[derive(Debug)]
pub struct EditLog {
    undo: Stack<EditRecord>,
    redo: Stack<EditRecord>,
}

impl EditLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            undo: Stack::new(),
            redo: Stack::new(),
        }
    }

    /// Pending undo records
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Pending redo records
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Record a fresh split, invalidating any redo history
    pub fn record(&mut self, tree: &mut DecisionTree, record: EditRecord) -> Result<(), KbError> {
        self.clear_redo(tree)?;
        self.undo.push(record);
        Ok(())
    }

    /// Reverse the most recent split: point the attachment back at the old leaf
    pub fn undo(&mut self, tree: &mut DecisionTree) -> Result<(), KbError> {
        let record = self.undo.pop().ok_or(KbError::NothingToUndo)?;
        Self::attach(tree, record.parent, record.old_leaf)?;
        debug!(old_leaf = %record.old_leaf, "undid split");
        self.redo.push(record);
        Ok(())
    }

    /// Replay the most recently undone split: reattach the new question
    pub fn redo(&mut self, tree: &mut DecisionTree) -> Result<(), KbError> {
        let record = self.redo.pop().ok_or(KbError::NothingToRedo)?;
        Self::attach(tree, record.parent, record.new_question)?;
        debug!(new_question = %record.new_question, "redid split");
        self.undo.push(record);
        Ok(())
    }

    fn attach(
        tree: &mut DecisionTree,
        parent: Option<ParentLink>,
        child: NodeId,
    ) -> Result<(), KbError> {
        match parent {
            None => tree.set_root(Some(child)),
            Some(link) => tree.set_branch(link.node, link.branch, Some(child)),
        }
    }

    /// Discard the redo history, reclaiming its now-unreachable nodes
    ///
    /// Each discarded record's `new_question` and `new_leaf` are freed
    /// individually: the question's other branch points at a leaf that is
    /// still live in the tree, so a subtree destroy would free too much.
    fn clear_redo(&mut self, tree: &mut DecisionTree) -> Result<(), KbError> {
        while let Some(record) = self.redo.pop() {
            tree.free_slot(record.new_question)?;
            tree.free_slot(record.new_leaf)?;
            debug!(new_question = %record.new_question, "discarded redo record");
        }
        Ok(())
    }
}
