//! Tests for the Tour State Machine
//!
//! These tests verify:
//! - Step navigation and completion on the last step
//! - Mutual exclusion between flows
//! - Silent rejection of redundant and invalid commands
//! - Skip policy handling
//! - Hide / show visibility

use guidepost::engine::machine::{
    FlowEnd, Rejection, SkipPolicy, TourCommand, TourState, Transition,
};
use guidepost::flows::{Flow, FlowRegistry, Step};
use guidepost::types::Side;
use std::collections::BTreeSet;

fn tooltip_flow(id: &str, steps: usize) -> Flow {
    let steps = (0..steps)
        .map(|i| {
            Step::tooltip(
                format!("s{}", i),
                format!("Step {}", i),
                "Look here",
                format!("#el-{}", i),
                Side::Bottom,
            )
        })
        .collect();
    Flow::new(id, steps)
}

fn registry() -> FlowRegistry {
    FlowRegistry::new([
        tooltip_flow("f1", 3).triggered_on("/dashboard"),
        tooltip_flow("f2", 2),
    ])
    .unwrap()
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn test_start_enters_first_visible_step() {
    let reg = registry();
    let mut state = TourState::default();
    let t = state.apply(&reg, TourCommand::Start("f1".into()));
    assert_eq!(t, Transition::Started { flow_id: "f1".into() });
    assert_eq!(state.active_flow_id(), Some("f1"));
    assert_eq!(state.current_step_index(), 0);
    assert!(state.is_visible());
}

#[test]
fn test_next_on_last_step_completes_flow() {
    // From Active('f1', 2, visible) a Next finishes the flow
    let reg = registry();
    let mut state = TourState::default();
    state.apply(&reg, TourCommand::Start("f1".into()));
    state.apply(&reg, TourCommand::Next);
    state.apply(&reg, TourCommand::Next);
    assert_eq!(state.current_step_index(), 2);

    let t = state.apply(&reg, TourCommand::Next);
    assert_eq!(
        t,
        Transition::Finished {
            flow_id: "f1".into(),
            end: FlowEnd::Completed,
            newly_completed: true,
        }
    );
    assert!(state.is_idle());
    assert!(state.completed_flows().contains("f1"));
}

#[test]
fn test_prev_at_first_step_is_ignored() {
    let reg = registry();
    let mut state = TourState::default();
    state.apply(&reg, TourCommand::Start("f1".into()));
    let t = state.apply(&reg, TourCommand::Prev);
    assert_eq!(t, Transition::Ignored(Rejection::AtFirstStep));
    assert_eq!(state.current_step_index(), 0);
}

#[test]
fn test_jump_clamps_to_last_step() {
    let reg = registry();
    let mut state = TourState::default();
    state.apply(&reg, TourCommand::Start("f1".into()));
    let t = state.apply(&reg, TourCommand::JumpTo(99));
    assert_eq!(
        t,
        Transition::StepChanged {
            flow_id: "f1".into(),
            from: 0,
            to: 2,
        }
    );
    assert_eq!(
        state.apply(&reg, TourCommand::JumpTo(2)),
        Transition::Ignored(Rejection::SameStep)
    );
}

// =============================================================================
// Mutual exclusion and rejection
// =============================================================================

#[test]
fn test_start_while_active_is_ignored() {
    let reg = registry();
    let mut state = TourState::default();
    state.apply(&reg, TourCommand::Start("f1".into()));
    state.apply(&reg, TourCommand::Next);

    let t = state.apply(&reg, TourCommand::Start("f2".into()));
    assert!(t.is_ignored());
    assert_eq!(state.active_flow_id(), Some("f1"));
    assert_eq!(state.current_step_index(), 1);
}

#[test]
fn test_unknown_flow_is_ignored() {
    let reg = registry();
    let mut state = TourState::default();
    let t = state.apply(&reg, TourCommand::Start("nope".into()));
    assert_eq!(t, Transition::Ignored(Rejection::UnknownFlow("nope".into())));
    assert!(state.is_idle());
}

#[test]
fn test_commands_while_idle_are_ignored() {
    let reg = registry();
    let mut state = TourState::default();
    for command in [
        TourCommand::Next,
        TourCommand::Prev,
        TourCommand::Skip,
        TourCommand::Complete,
        TourCommand::Hide,
        TourCommand::Show,
        TourCommand::JumpTo(1),
    ] {
        assert_eq!(state.apply(&reg, command), Transition::Ignored(Rejection::NotActive));
    }
    assert!(state.completed_flows().is_empty());
}

#[test]
fn test_double_complete_is_idempotent() {
    let reg = registry();
    let mut state = TourState::default();
    state.apply(&reg, TourCommand::Start("f2".into()));
    assert!(state.apply(&reg, TourCommand::Complete).completed_grew());
    assert!(state.apply(&reg, TourCommand::Complete).is_ignored());

    // Replaying a completed flow does not grow the set again
    state.apply(&reg, TourCommand::Start("f2".into()));
    let t = state.apply(&reg, TourCommand::Complete);
    assert!(!t.completed_grew());
    assert_eq!(state.completed_flows().len(), 1);
}

// =============================================================================
// Skip policy
// =============================================================================

#[test]
fn test_skip_records_completion_by_default() {
    let reg = registry();
    let mut state = TourState::default();
    state.apply(&reg, TourCommand::Start("f1".into()));
    let t = state.apply(&reg, TourCommand::Skip);
    assert!(matches!(
        t,
        Transition::Finished {
            end: FlowEnd::Skipped,
            newly_completed: true,
            ..
        }
    ));
    assert!(state.is_completed("f1"));
}

#[test]
fn test_skip_with_forget_policy_leaves_flow_eligible() {
    let reg = registry();
    let mut state = TourState::hydrated(BTreeSet::new(), SkipPolicy::Forget);
    state.apply(&reg, TourCommand::Start("f1".into()));
    state.apply(&reg, TourCommand::Skip);
    assert!(state.is_idle());
    assert!(!state.is_completed("f1"));
}

#[test]
fn test_reset_completed_clears_hydrated_set() {
    let completed: BTreeSet<String> = ["f1".to_string(), "f2".to_string()].into();
    let mut state = TourState::hydrated(completed, SkipPolicy::RecordCompletion);
    assert!(state.is_completed("f2"));
    state.reset_completed();
    assert!(state.completed_flows().is_empty());
}

// =============================================================================
// Visibility
// =============================================================================

#[test]
fn test_hide_keeps_flow_active() {
    let reg = registry();
    let mut state = TourState::default();
    state.apply(&reg, TourCommand::Start("f1".into()));
    state.apply(&reg, TourCommand::Hide);
    assert!(!state.is_visible());
    assert_eq!(state.active_flow_id(), Some("f1"));

    assert_eq!(
        state.apply(&reg, TourCommand::Hide),
        Transition::Ignored(Rejection::VisibilityUnchanged)
    );
    // Still exclusive while hidden
    assert!(state.apply(&reg, TourCommand::Start("f2".into())).is_ignored());

    state.apply(&reg, TourCommand::Show);
    assert!(state.is_visible());
    assert_eq!(state.current_step_index(), 0);
}
