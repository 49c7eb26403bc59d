//! Engine load-state transitions.
//!
//! Kept in its own binary: the load state is process-wide and probed at most
//! once, so this test must run before anything else demands the engine.

use batchopt_solvers::engine::availability::{self, Availability};

#[test]
fn load_state_moves_from_not_probed_to_unavailable() {
    // Nothing has demanded the engine yet in this process.
    assert_eq!(availability::status(), Availability::NotProbed);

    // No engine library in the test environment: the first demand attempts
    // the load, fails, and records the reason.
    assert!(!availability::probe());
    match availability::status() {
        Availability::Unavailable { reason } => assert!(!reason.is_empty()),
        other => panic!("expected a recorded load failure, got {other:?}"),
    }

    // The probe is never re-evaluated.
    assert!(!availability::probe());
}
