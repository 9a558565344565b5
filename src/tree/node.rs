//! Node representation for the arena tree
//!
//! Nodes are addressed by generational handles, never by reference: a
//! [`NodeId`] carries the arena slot index plus the generation the slot had
//! when the node was created, so a handle into a freed slot is detectable
//! instead of silently resolving to a recycled node.

use std::fmt;

/// Generational handle to a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Which role a node plays in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Internal node: owns text and, once fully constructed, two children
    Question,
    /// Terminal node: a guessable animal, no children
    Leaf,
}

/// Which child edge of a question node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// The `yes` edge
    Yes,
    /// The `no` edge
    No,
}

/// One tree node: kind, owned text, optional children
///
/// Invariant (checked by the integrity sweep, not by construction): a fully
/// constructed `Question` has both children `Some`; a `Leaf` has both `None`.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) text: String,
    pub(crate) yes: Option<NodeId>,
    pub(crate) no: Option<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, text: String) -> Self {
        Self {
            kind,
            text,
            yes: None,
            no: None,
        }
    }

    /// Node kind
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// True for question nodes
    pub fn is_question(&self) -> bool {
        self.kind == NodeKind::Question
    }

    /// True for leaf (animal) nodes
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    /// Question or animal text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The `yes` child, if linked
    pub fn yes(&self) -> Option<NodeId> {
        self.yes
    }

    /// The `no` child, if linked
    pub fn no(&self) -> Option<NodeId> {
        self.no
    }

    /// Child along `branch`
    pub fn child(&self, branch: Branch) -> Option<NodeId> {
        match branch {
            Branch::Yes => self.yes,
            Branch::No => self.no,
        }
    }
}
