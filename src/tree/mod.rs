//! Arena-allocated binary decision tree
//!
//! The tree owns every reachable node. Nodes live in a `Vec`-based arena and
//! are addressed by generational [`NodeId`] handles; freed slots go on a free
//! list and bump their generation, so stale handles are detected rather than
//! resolved. Destroy and count walk the tree with an explicit work stack -
//! auxiliary memory is bounded by tree size, never by call depth.

mod node;

pub use node::{Branch, Node, NodeId, NodeKind};

use crate::stack::Stack;
use crate::KbError;

/// One arena slot: its current generation plus the node occupying it, if any
#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The decision tree: node arena plus the root handle
#[derive(Debug)]
pub struct DecisionTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
    root: Option<NodeId>,
}

impl DecisionTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            root: None,
        }
    }

    /// The root handle, if the tree is non-empty
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Point the root at `root`, which must be live (or `None`)
    pub fn set_root(&mut self, root: Option<NodeId>) -> Result<(), KbError> {
        if let Some(id) = root {
            self.node(id)?;
        }
        self.root = root;
        Ok(())
    }

    /// Number of occupied arena slots, reachable or not
    ///
    /// Differs from [`count_from_root`](Self::count_from_root) while undone
    /// splits are still replayable: their nodes stay allocated but detached.
    pub fn live_nodes(&self) -> usize {
        self.live
    }

    // ===== Construction =====

    /// Allocate a new question node owning a copy of `text`
    pub fn make_question(&mut self, text: &str) -> Result<NodeId, KbError> {
        self.alloc(NodeKind::Question, text)
    }

    /// Allocate a new leaf (animal) node owning a copy of `text`
    pub fn make_leaf(&mut self, text: &str) -> Result<NodeId, KbError> {
        self.alloc(NodeKind::Leaf, text)
    }

    fn alloc(&mut self, kind: NodeKind, text: &str) -> Result<NodeId, KbError> {
        if text.is_empty() {
            return Err(KbError::EmptyText);
        }
        let node = Node::new(kind, text.to_owned());
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            Ok(NodeId::new(index, slot.generation))
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            Ok(NodeId::new(index, 0))
        }
    }

    // ===== Access =====

    /// Resolve `id`, failing on stale or out-of-range handles
    pub fn node(&self, id: NodeId) -> Result<&Node, KbError> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(KbError::StaleHandle {
                index: id.index,
                generation: id.generation,
            })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, KbError> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(KbError::StaleHandle {
                index: id.index,
                generation: id.generation,
            })
    }

    /// True if `id` still resolves to a live node
    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Rewrite one child edge of `parent`
    pub fn set_branch(
        &mut self,
        parent: NodeId,
        branch: Branch,
        child: Option<NodeId>,
    ) -> Result<(), KbError> {
        if let Some(c) = child {
            self.node(c)?;
        }
        let node = self.node_mut(parent)?;
        match branch {
            Branch::Yes => node.yes = child,
            Branch::No => node.no = child,
        }
        Ok(())
    }

    // ===== Destruction =====

    /// Free `id` and everything reachable from it, children before parent
    ///
    /// Uses an explicit work stack; each entry is (handle, children-pushed).
    /// A node is freed only after both its subtrees have been freed.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), KbError> {
        let mut work: Stack<(NodeId, bool)> = Stack::new();
        work.push((id, false));
        while let Some((current, expanded)) = work.pop() {
            if expanded {
                self.free_slot(current)?;
                continue;
            }
            let node = self.node(current)?;
            let yes = node.yes;
            let no = node.no;
            work.push((current, true));
            if let Some(child) = yes {
                work.push((child, false));
            }
            if let Some(child) = no {
                work.push((child, false));
            }
        }
        Ok(())
    }

    /// Free every node and forget the root
    pub fn clear(&mut self) -> Result<(), KbError> {
        if let Some(root) = self.root.take() {
            self.destroy(root)?;
        }
        Ok(())
    }

    /// Free exactly one slot without touching its children
    ///
    /// Used when discarding redo records: the record's nodes must be
    /// reclaimed individually because their `old_leaf` child is still live
    /// in the tree.
    pub(crate) fn free_slot(&mut self, id: NodeId) -> Result<(), KbError> {
        let slot = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation && slot.node.is_some())
            .ok_or(KbError::StaleHandle {
                index: id.index,
                generation: id.generation,
            })?;
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.live -= 1;
        Ok(())
    }

    // ===== Measurement =====

    /// Number of nodes in the subtree rooted at `id`
    pub fn count(&self, id: NodeId) -> Result<u32, KbError> {
        let mut work: Stack<NodeId> = Stack::new();
        work.push(id);
        let mut total = 0u32;
        while let Some(current) = work.pop() {
            total += 1;
            let node = self.node(current)?;
            if let Some(child) = node.yes {
                work.push(child);
            }
            if let Some(child) = node.no {
                work.push(child);
            }
        }
        Ok(total)
    }

    /// Number of nodes reachable from the root; 0 for an empty tree
    pub fn count_from_root(&self) -> Result<u32, KbError> {
        match self.root {
            Some(root) => self.count(root),
            None => Ok(0),
        }
    }
}
