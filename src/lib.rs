//! # Mutable Binary Decision-Tree Knowledge Base
//!
//! This library implements a "20 questions" style knowledge base: a binary
//! decision tree of yes/no questions with animal leaves, queried and grown
//! through an interactive learning protocol.
//!
//! ## Core Components
//!
//! 1. **Arena tree**: nodes addressed by generational handles, no raw pointers
//! 2. **Iterative engine**: explicit frame stack, no call-stack recursion
//! 3. **Edit log**: undo/redo over split mutations via handle repointing
//! 4. **Text index**: djb2-chained hash table over canonicalized question text
//! 5. **Binary persistence**: breadth-first numbered, fixed-layout records
//!
//! ## Usage Example
//!
//! ```ignore
//! use linnaeus::{Session, Oracle};
//!
//! let mut session = Session::new();
//! session.load("animals.kb")?;
//! let outcome = session.play(&mut oracle)?;
//! session.save("animals.kb")?;
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules - each implements a key component of the knowledge base
pub mod tree;      // Arena-allocated decision tree
pub mod queue;     // FIFO primitive for breadth-first walks
pub mod stack;     // Growable stack primitive
pub mod index;     // Canonicalizing text index
pub mod editlog;   // Undo/redo edit log
pub mod engine;    // Iterative traversal and split mutation
pub mod persist;   // Binary save/load
pub mod integrity; // Independent invariant sweep

// Re-exports for convenience
pub use editlog::{EditLog, EditRecord, ParentLink};
pub use engine::{Oracle, RoundOutcome};
pub use index::{canonicalize, TextIndex};
pub use tree::{Branch, DecisionTree, Node, NodeId, NodeKind};

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while operating on the knowledge base
#[derive(Error, Debug)]
pub enum KbError {
    /// Node construction was given empty text
    #[error("node text must not be empty")]
    EmptyText,

    /// A handle referred to a freed or recycled arena slot
    #[error("stale node handle: slot {index} generation {generation}")]
    StaleHandle {
        /// Arena slot index of the offending handle
        index: u32,
        /// Generation the handle carried
        generation: u32,
    },

    /// Save was requested on a tree with no root
    #[error("nothing to save: the tree is empty")]
    EmptyTree,

    /// Undo was requested with an empty undo log
    #[error("nothing to undo")]
    NothingToUndo,

    /// Redo was requested with an empty redo log
    #[error("nothing to redo")]
    NothingToRedo,

    /// Persisted file did not start with the expected magic constant
    #[error("bad magic: found {found:#010x}")]
    BadMagic {
        /// Magic value found in the file
        found: u32,
    },

    /// Persisted file carried an unsupported format version
    #[error("unsupported format version {found}")]
    BadVersion {
        /// Version value found in the file
        found: u32,
    },

    /// A persisted record declared a text length over the fixed maximum
    #[error("record text length {len} exceeds maximum {max}")]
    TextTooLong {
        /// Declared length
        len: u32,
        /// Fixed maximum
        max: u32,
    },

    /// A persisted record's text bytes were not valid UTF-8
    #[error("record text is not valid UTF-8")]
    TextNotUtf8,

    /// A persisted child id fell outside [-1, nodeCount)
    #[error("child id {id} out of range for {count} nodes")]
    BadChildId {
        /// Offending child id
        id: i32,
        /// Node count declared by the file
        count: u32,
    },

    /// Reconstructed or live tree violated the Question/Leaf invariants
    #[error("tree integrity check failed")]
    CorruptTree,

    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The oracle (terminal, script) failed to produce an answer
    #[error("input error: {0}")]
    Input(String),
}

/// One interactive knowledge-base session
///
/// Owns the tree, the undo/redo log, the text index, and the monotonically
/// increasing id counter handed to the index on each learned question. All
/// operations run to completion on the calling thread; a concurrent host
/// must wrap the whole session in a single exclusive lock.
#[derive(Debug)]
pub struct Session {
    tree: DecisionTree,
    log: EditLog,
    index: TextIndex,
    next_question_id: u32,
}

/// Summary counters reported by [`Session::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Nodes reachable from the root
    pub nodes: u32,
    /// Distinct canonical question keys in the index
    pub distinct_questions: usize,
    /// Pending undo records
    pub undo_depth: usize,
    /// Pending redo records
    pub redo_depth: usize,
}

impl Session {
    /// Create an empty session: no tree, no edits, empty index
    pub fn new() -> Self {
        Self {
            tree: DecisionTree::new(),
            log: EditLog::new(),
            index: TextIndex::default(),
            next_question_id: 0,
        }
    }

    /// Borrow the underlying tree
    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    /// Mutably borrow the underlying tree
    pub fn tree_mut(&mut self) -> &mut DecisionTree {
        &mut self.tree
    }

    /// Borrow the edit log
    pub fn log(&self) -> &EditLog {
        &self.log
    }

    /// Borrow the text index
    pub fn index(&self) -> &TextIndex {
        &self.index
    }

    /// Play one round of the guessing game against `oracle`
    ///
    /// Walks the tree iteratively, asking the oracle at each question node.
    /// A wrong final guess triggers the split mutation: the disproven leaf is
    /// replaced by a new distinguishing question, the edit is recorded for
    /// undo, and the question text is registered in the index.
    pub fn play(&mut self, oracle: &mut dyn Oracle) -> Result<RoundOutcome, KbError> {
        engine::run_round(
            &mut self.tree,
            &mut self.log,
            &mut self.index,
            &mut self.next_question_id,
            oracle,
        )
    }

    /// Reverse the most recent split mutation
    pub fn undo(&mut self) -> Result<(), KbError> {
        self.log.undo(&mut self.tree)
    }

    /// Replay the most recently undone split mutation
    pub fn redo(&mut self) -> Result<(), KbError> {
        self.log.redo(&mut self.tree)
    }

    /// Write the tree to `path`, returning the number of nodes written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<u32, KbError> {
        persist::save(&self.tree, path.as_ref())
    }

    /// Replace the tree with the contents of `path`
    ///
    /// On any failure the current tree is left untouched. On success the
    /// edit log is cleared: its records reference node handles of the arena
    /// that was just replaced and must not outlive it.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<u32, KbError> {
        let tree = persist::load(path.as_ref())?;
        let count = tree.count_from_root()?;
        self.tree = tree;
        self.log = EditLog::new();
        Ok(count)
    }

    /// Run the independent breadth-first invariant sweep
    pub fn check_integrity(&self) -> bool {
        integrity::check(&self.tree)
    }

    /// Register `id` under the canonical form of `key` in the text index
    pub fn index_put(&mut self, key: &str, id: u32) -> bool {
        self.index.put(&canonicalize(key), id)
    }

    /// Look up the ids registered under the canonical form of `key`
    pub fn index_lookup(&self, key: &str) -> Option<&[u32]> {
        self.index.get_ids(&canonicalize(key))
    }

    /// Summary counters for diagnostics
    pub fn stats(&self) -> Result<SessionStats, KbError> {
        Ok(SessionStats {
            nodes: self.tree.count_from_root()?,
            distinct_questions: self.index.len(),
            undo_depth: self.log.undo_depth(),
            redo_depth: self.log.redo_depth(),
        })
    }
}
