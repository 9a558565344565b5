//! Iterative traversal and split mutation
//!
//! The game loop walks the tree with an explicit frame stack - never native
//! recursion - asking an abstract oracle at every decision point. Each step
//! strictly descends one edge and a split is immediately followed by the end
//! of the round, so the loop always terminates without revisiting a node.

use tracing::{debug, info};

use crate::editlog::{EditLog, EditRecord, ParentLink};
use crate::index::{self, TextIndex};
use crate::stack::Stack;
use crate::tree::{Branch, DecisionTree, NodeId};
use crate::KbError;

/// External collaborator supplying answers and new facts
///
/// Oracles may be invoked repeatedly within one round and must never mutate
/// tree state themselves.
pub trait Oracle {
    /// Ask a yes/no question
    fn ask_yes_no(&mut self, prompt: &str) -> Result<bool, KbError>;

    /// Ask for a free-text answer
    fn ask_free_text(&mut self, prompt: &str) -> Result<String, KbError>;
}

/// How a round of the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The final leaf was confirmed
    Guessed,
    /// The guess was wrong and a split mutation recorded the new animal
    Learned,
    /// The tree was empty; the oracle supplied the first animal
    Seeded,
}

/// How the traversal arrived at a frame's node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The initial frame
    Root,
    /// Descended the parent's `yes` edge
    Yes,
    /// Descended the parent's `no` edge
    No,
}

/// One traversal step: a node and the edge taken to reach it
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    /// Node to visit
    pub node: NodeId,
    /// Edge taken from the parent
    pub via: Direction,
}

/// Play one round: traverse, guess, and learn on a wrong guess
pub fn run_round(
    tree: &mut DecisionTree,
    log: &mut EditLog,
    index: &mut TextIndex,
    next_question_id: &mut u32,
    oracle: &mut dyn Oracle,
) -> Result<RoundOutcome, KbError> {
    let Some(root) = tree.root() else {
        // Nothing to traverse yet: seed the tree with a first animal
        let name = oracle.ask_free_text("I know nothing yet. What animal are you thinking of?")?;
        let leaf = tree.make_leaf(name.trim())?;
        tree.set_root(Some(leaf))?;
        info!(animal = %name.trim(), "seeded empty tree");
        return Ok(RoundOutcome::Seeded);
    };

    let mut frames: Stack<Frame> = Stack::new();
    frames.push(Frame {
        node: root,
        via: Direction::Root,
    });

    // Attachment point for a potential split: the last question answered
    let mut parent: Option<ParentLink> = None;

    while let Some(frame) = frames.pop() {
        let node = tree.node(frame.node)?;
        if node.is_question() {
            let answer = oracle.ask_yes_no(node.text())?;
            let branch = if answer { Branch::Yes } else { Branch::No };
            let child = node.child(branch).ok_or(KbError::CorruptTree)?;
            parent = Some(ParentLink {
                node: frame.node,
                branch,
            });
            frames.push(Frame {
                node: child,
                via: if answer { Direction::Yes } else { Direction::No },
            });
            continue;
        }

        // At a leaf: final guess
        let guessed = oracle.ask_yes_no(&format!("Is it a {}?", node.text()))?;
        if guessed {
            debug!(animal = %node.text(), "guessed correctly");
            return Ok(RoundOutcome::Guessed);
        }

        // Wrong guess: learn the new animal by splitting this leaf
        let name = oracle.ask_free_text("I give up! What's your animal?")?;
        let question = oracle.ask_free_text("What question distinguishes your animal?")?;
        let answer_is_yes = oracle.ask_yes_no(&format!(
            "For a {}, what is the answer to \"{}\"?",
            name.trim(),
            question.trim()
        ))?;

        split_leaf(
            tree,
            log,
            index,
            next_question_id,
            parent,
            frame.node,
            name.trim(),
            question.trim(),
            answer_is_yes,
        )?;
        return Ok(RoundOutcome::Learned);
    }

    // A valid tree always reaches a leaf before the stack empties
    Err(KbError::CorruptTree)
}

/// Replace a disproven leaf with a new distinguishing question
///
/// The branch matching `answer_is_yes` points at the new animal; the other
/// branch keeps the old leaf reachable. The edit is recorded for undo (which
/// invalidates any redo history) and the canonicalized question text is
/// registered in the index under the next monotonic id.
#[allow(clippy::too_many_arguments)]
pub fn split_leaf(
    tree: &mut DecisionTree,
    log: &mut EditLog,
    index: &mut TextIndex,
    next_question_id: &mut u32,
    parent: Option<ParentLink>,
    old_leaf: NodeId,
    name: &str,
    question: &str,
    answer_is_yes: bool,
) -> Result<NodeId, KbError> {
    let new_question = tree.make_question(question)?;
    let new_leaf = tree.make_leaf(name)?;

    let (to_new, to_old) = if answer_is_yes {
        (Branch::Yes, Branch::No)
    } else {
        (Branch::No, Branch::Yes)
    };
    tree.set_branch(new_question, to_new, Some(new_leaf))?;
    tree.set_branch(new_question, to_old, Some(old_leaf))?;

    match parent {
        None => tree.set_root(Some(new_question))?,
        Some(link) => tree.set_branch(link.node, link.branch, Some(new_question))?,
    }

    log.record(
        tree,
        EditRecord {
            parent,
            old_leaf,
            new_question,
            new_leaf,
        },
    )?;
    index::register_question(index, next_question_id, question);

    info!(animal = name, question, "learned new animal");
    Ok(new_question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Oracle that replays scripted answers
    struct Script {
        yes_no: VecDeque<bool>,
        text: VecDeque<&'static str>,
    }

    impl Script {
        fn new(yes_no: &[bool], text: &[&'static str]) -> Self {
            Self {
                yes_no: yes_no.iter().copied().collect(),
                text: text.iter().copied().collect(),
            }
        }
    }

    impl Oracle for Script {
        fn ask_yes_no(&mut self, _prompt: &str) -> Result<bool, KbError> {
            self.yes_no
                .pop_front()
                .ok_or_else(|| KbError::Input("script ran out of yes/no answers".into()))
        }

        fn ask_free_text(&mut self, _prompt: &str) -> Result<String, KbError> {
            self.text
                .pop_front()
                .map(str::to_owned)
                .ok_or_else(|| KbError::Input("script ran out of text answers".into()))
        }
    }

    fn fresh() -> (DecisionTree, EditLog, TextIndex, u32) {
        (DecisionTree::new(), EditLog::new(), TextIndex::default(), 0)
    }

    #[test]
    fn empty_tree_is_seeded_from_the_oracle() {
        let (mut tree, mut log, mut index, mut next_id) = fresh();
        let mut oracle = Script::new(&[], &["dog"]);
        let outcome =
            run_round(&mut tree, &mut log, &mut index, &mut next_id, &mut oracle).unwrap();
        assert_eq!(outcome, RoundOutcome::Seeded);
        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).unwrap().text(), "dog");
    }

    #[test]
    fn correct_guess_leaves_the_tree_alone() {
        let (mut tree, mut log, mut index, mut next_id) = fresh();
        let dog = tree.make_leaf("dog").unwrap();
        tree.set_root(Some(dog)).unwrap();

        let mut oracle = Script::new(&[true], &[]);
        let outcome =
            run_round(&mut tree, &mut log, &mut index, &mut next_id, &mut oracle).unwrap();
        assert_eq!(outcome, RoundOutcome::Guessed);
        assert_eq!(tree.root(), Some(dog));
        assert_eq!(log.undo_depth(), 0);
    }

    #[test]
    fn wrong_guess_splits_the_leaf() {
        let (mut tree, mut log, mut index, mut next_id) = fresh();
        let dog = tree.make_leaf("dog").unwrap();
        tree.set_root(Some(dog)).unwrap();

        // "no" to the dog guess, then name/question, then "yes" for cat
        let mut oracle = Script::new(&[false, true], &["cat", "does it meow?"]);
        let outcome =
            run_round(&mut tree, &mut log, &mut index, &mut next_id, &mut oracle).unwrap();
        assert_eq!(outcome, RoundOutcome::Learned);

        let root = tree.root().unwrap();
        let q = tree.node(root).unwrap();
        assert!(q.is_question());
        assert_eq!(q.text(), "does it meow?");
        assert_eq!(tree.node(q.yes().unwrap()).unwrap().text(), "cat");
        assert_eq!(q.no(), Some(dog));

        assert_eq!(log.undo_depth(), 1);
        assert_eq!(log.redo_depth(), 0);
        assert!(index.contains("does_it_meow", 0));
        assert_eq!(next_id, 1);
    }

    #[test]
    fn split_below_a_question_rewrites_the_right_branch() {
        let (mut tree, mut log, mut index, mut next_id) = fresh();
        let q = tree.make_question("does it fly?").unwrap();
        let eagle = tree.make_leaf("eagle").unwrap();
        let dog = tree.make_leaf("dog").unwrap();
        tree.set_branch(q, Branch::Yes, Some(eagle)).unwrap();
        tree.set_branch(q, Branch::No, Some(dog)).unwrap();
        tree.set_root(Some(q)).unwrap();

        // no (to flying), no (not a dog), learn cat via meowing = yes
        let mut oracle = Script::new(&[false, false, true], &["cat", "does it meow?"]);
        let outcome =
            run_round(&mut tree, &mut log, &mut index, &mut next_id, &mut oracle).unwrap();
        assert_eq!(outcome, RoundOutcome::Learned);

        // Root unchanged; the no-branch now holds the new question
        assert_eq!(tree.root(), Some(q));
        let new_q = tree.node(q).unwrap().no().unwrap();
        let new_q_node = tree.node(new_q).unwrap();
        assert_eq!(new_q_node.text(), "does it meow?");
        assert_eq!(tree.node(new_q_node.yes().unwrap()).unwrap().text(), "cat");
        assert_eq!(new_q_node.no(), Some(dog));
        assert_eq!(tree.node(q).unwrap().yes(), Some(eagle));
        assert_eq!(tree.count_from_root().unwrap(), 5);
    }

    #[test]
    fn answer_no_wires_new_animal_on_the_no_branch() {
        let (mut tree, mut log, mut index, mut next_id) = fresh();
        let dog = tree.make_leaf("dog").unwrap();
        tree.set_root(Some(dog)).unwrap();

        let mut oracle = Script::new(&[false, false], &["snake", "does it have legs?"]);
        run_round(&mut tree, &mut log, &mut index, &mut next_id, &mut oracle).unwrap();

        let root = tree.root().unwrap();
        let q = tree.node(root).unwrap();
        assert_eq!(tree.node(q.no().unwrap()).unwrap().text(), "snake");
        assert_eq!(q.yes(), Some(dog));
    }

    #[test]
    fn oracle_failure_propagates() {
        let (mut tree, mut log, mut index, mut next_id) = fresh();
        let dog = tree.make_leaf("dog").unwrap();
        tree.set_root(Some(dog)).unwrap();

        let mut oracle = Script::new(&[], &[]);
        let result = run_round(&mut tree, &mut log, &mut index, &mut next_id, &mut oracle);
        assert!(matches!(result, Err(KbError::Input(_))));
        // Nothing was mutated
        assert_eq!(tree.root(), Some(dog));
        assert_eq!(tree.live_nodes(), 1);
    }
}
