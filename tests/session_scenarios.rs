//! End-to-end game scenarios: learning, undo/redo, index registration

use linnaeus::{KbError, RoundOutcome};

use test_helpers::*;

/// Playing against leaf "dog", answering "no" and teaching "cat" via
/// "does it meow?" = yes, must split the root leaf.
#[test]
fn learning_splits_the_disproven_leaf() {
    let mut session = dog_session();
    let dog = session.tree().root().unwrap();

    let mut oracle = ScriptedOracle::new(&[false, true], &["cat", "does it meow?"]);
    let outcome = session.play(&mut oracle).unwrap();
    assert_eq!(outcome, RoundOutcome::Learned);

    let tree = session.tree();
    let root = tree.root().unwrap();
    let q = tree.node(root).unwrap();
    assert!(q.is_question());
    assert_eq!(q.text(), "does it meow?");
    assert_eq!(tree.node(q.yes().unwrap()).unwrap().text(), "cat");
    assert_eq!(q.no(), Some(dog));

    // Exactly one undo record, no redo history, index holds the canonical key
    assert_eq!(session.log().undo_depth(), 1);
    assert_eq!(session.log().redo_depth(), 0);
    assert!(session.index().contains("does_it_meow", 0));
    assert!(session.check_integrity());
}

/// After the learning split, undo restores the old leaf and redo restores
/// the new question, moving the record between the two logs each time.
#[test]
fn undo_and_redo_are_exact_inverses() {
    let mut session = dog_session();
    let dog = session.tree().root().unwrap();

    let mut oracle = ScriptedOracle::new(&[false, true], &["cat", "does it meow?"]);
    session.play(&mut oracle).unwrap();
    let new_question = session.tree().root().unwrap();

    session.undo().unwrap();
    assert_eq!(session.tree().root(), Some(dog));
    assert_eq!(session.log().undo_depth(), 0);
    assert_eq!(session.log().redo_depth(), 1);

    session.redo().unwrap();
    assert_eq!(session.tree().root(), Some(new_question));
    assert_eq!(session.log().undo_depth(), 1);
    assert_eq!(session.log().redo_depth(), 0);
    assert!(session.check_integrity());
}

#[test]
fn undo_redo_on_empty_logs_are_reported_not_fatal() {
    let mut session = dog_session();
    assert!(matches!(session.undo(), Err(KbError::NothingToUndo)));
    assert!(matches!(session.redo(), Err(KbError::NothingToRedo)));
    // The tree is untouched either way
    assert_eq!(session.tree().count_from_root().unwrap(), 1);
}

/// A new split after an undo clears the ability to redo the undone edit.
#[test]
fn divergent_split_invalidates_redo_history() {
    let mut session = dog_session();

    let mut oracle = ScriptedOracle::new(&[false, true], &["cat", "does it meow?"]);
    session.play(&mut oracle).unwrap();
    session.undo().unwrap();
    assert_eq!(session.log().redo_depth(), 1);

    // Teach a different animal against the restored "dog" leaf
    let mut oracle = ScriptedOracle::new(&[false, true], &["fox", "is it wild?"]);
    session.play(&mut oracle).unwrap();

    assert_eq!(session.log().redo_depth(), 0);
    assert!(matches!(session.redo(), Err(KbError::NothingToRedo)));
    let root = session.tree().root().unwrap();
    assert_eq!(session.tree().node(root).unwrap().text(), "is it wild?");
    assert!(session.check_integrity());
}

/// Undone-then-diverged splits hand their nodes back to the arena; the
/// occupancy after the divergent split matches the first split's.
#[test]
fn diverging_reclaims_undone_split_nodes() {
    let mut session = dog_session();

    let mut oracle = ScriptedOracle::new(&[false, true], &["cat", "does it meow?"]);
    session.play(&mut oracle).unwrap();
    let live_after_first_split = session.tree().live_nodes();

    session.undo().unwrap();
    assert_eq!(session.tree().live_nodes(), live_after_first_split);

    let mut oracle = ScriptedOracle::new(&[false, true], &["fox", "is it wild?"]);
    session.play(&mut oracle).unwrap();
    assert_eq!(session.tree().live_nodes(), live_after_first_split);
}

/// Consecutive rounds descend through learned questions and keep learning.
#[test]
fn successive_rounds_grow_the_tree() {
    let mut session = dog_session();

    let mut oracle = ScriptedOracle::new(&[false, true], &["cat", "does it meow?"]);
    assert_eq!(session.play(&mut oracle).unwrap(), RoundOutcome::Learned);

    // Round two: answer "no" to meowing, reject "dog", teach "snake"
    let mut oracle =
        ScriptedOracle::new(&[false, false, false], &["snake", "does it have legs?"]);
    assert_eq!(session.play(&mut oracle).unwrap(), RoundOutcome::Learned);

    // Round three: no to meowing, yes to legs, confirm "dog"
    let mut oracle = ScriptedOracle::new(&[false, true, true], &[]);
    assert_eq!(session.play(&mut oracle).unwrap(), RoundOutcome::Guessed);

    assert_eq!(session.tree().count_from_root().unwrap(), 5);
    assert_eq!(session.log().undo_depth(), 2);
    assert!(session.index().contains("does_it_meow", 0));
    assert!(session.index().contains("does_it_have_legs", 1));
    assert!(session.check_integrity());
}

#[test]
fn empty_session_seeds_from_first_round() {
    let mut session = linnaeus::Session::new();
    let mut oracle = ScriptedOracle::new(&[], &["dog"]);
    assert_eq!(session.play(&mut oracle).unwrap(), RoundOutcome::Seeded);
    assert_eq!(session.tree().count_from_root().unwrap(), 1);

    let mut oracle = ScriptedOracle::new(&[true], &[]);
    assert_eq!(session.play(&mut oracle).unwrap(), RoundOutcome::Guessed);
}
