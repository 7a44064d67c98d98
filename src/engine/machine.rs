//! Tour State Machine
//!
//! The single source of truth for which flow is active, which step is
//! current, whether the step is visible, and which flows are completed.
//!
//! # Design Principles
//!
//! - **Pure reducer**: `TourState::apply` consumes a `TourCommand` and returns a
//!   `Transition` value. No I/O, no clocks, no host calls.
//! - **Mutual exclusion**: at most one flow is active; `Start` while active is ignored
//! - **Silent rejection**: invalid commands return `Transition::Ignored` rather than
//!   errors, so redundant UI events (double key presses) are harmless
//! - **Monotone completion**: `completed` only grows, except through `reset_completed`
//!
//! # State Flow
//!
//! ```text
//! Idle ──Start(id)──▶ Active(id, 0, visible)
//! Active ──Next (not last) / Prev (not first) / JumpTo──▶ Active(id, i', visible)
//! Active ──Hide / Show──▶ Active(id, i, hidden / visible)
//! Active ──Next (last) / Complete──▶ Idle   (id recorded as completed)
//! Active ──Skip──▶ Idle                     (recorded under RecordCompletion)
//! ```

use crate::flows::FlowRegistry;
use std::collections::BTreeSet;
use std::fmt;

/// What skipping a flow means for completion tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipPolicy {
    /// Skip and Done both record the flow, so it never auto-starts again
    #[default]
    RecordCompletion,
    /// Skip leaves the flow eligible for auto-start
    Forget,
}

/// The flow currently being presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFlow {
    pub flow_id: String,
    pub step_index: usize,
    pub visible: bool,
}

/// Commands accepted by the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourCommand {
    Start(String),
    Next,
    Prev,
    Skip,
    Complete,
    Hide,
    Show,
    JumpTo(usize),
}

/// How an active flow ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEnd {
    Completed,
    Skipped,
}

/// Why a command was ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// `Start` while another flow is active
    AlreadyActive { active: String, requested: String },
    /// `Start` with an id the registry does not know
    UnknownFlow(String),
    /// A step command with no active flow
    NotActive,
    /// `Prev` at index 0
    AtFirstStep,
    /// `JumpTo` resolving to the current step
    SameStep,
    /// `Hide` on a hidden flow or `Show` on a visible one
    VisibilityUnchanged,
    /// The active flow vanished from the registry
    MissingFlow(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive { active, requested } => {
                write!(f, "cannot start '{}' while '{}' is active", requested, active)
            }
            Self::UnknownFlow(id) => write!(f, "unknown flow '{}'", id),
            Self::NotActive => write!(f, "no flow is active"),
            Self::AtFirstStep => write!(f, "already at the first step"),
            Self::SameStep => write!(f, "already at that step"),
            Self::VisibilityUnchanged => write!(f, "visibility unchanged"),
            Self::MissingFlow(id) => write!(f, "active flow '{}' is not registered", id),
        }
    }
}

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Started {
        flow_id: String,
    },
    StepChanged {
        flow_id: String,
        from: usize,
        to: usize,
    },
    Finished {
        flow_id: String,
        end: FlowEnd,
        /// True when this transition added the flow to the completed set
        newly_completed: bool,
    },
    VisibilityChanged {
        flow_id: String,
        visible: bool,
    },
    Ignored(Rejection),
}

impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }

    /// True when the completed set grew and should be persisted
    pub fn completed_grew(&self) -> bool {
        matches!(
            self,
            Self::Finished {
                newly_completed: true,
                ..
            }
        )
    }
}

/// Tour state: `Idle` when `active` is `None`, `Active` otherwise
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TourState {
    active: Option<ActiveFlow>,
    completed: BTreeSet<String>,
    skip_policy: SkipPolicy,
}

impl TourState {
    /// Idle state hydrated with previously completed flows
    pub fn hydrated(completed: BTreeSet<String>, skip_policy: SkipPolicy) -> Self {
        Self {
            active: None,
            completed,
            skip_policy,
        }
    }

    #[inline]
    pub fn active(&self) -> Option<&ActiveFlow> {
        self.active.as_ref()
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn active_flow_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.flow_id.as_str())
    }

    /// Current step index; 0 while idle
    pub fn current_step_index(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.step_index)
    }

    pub fn is_visible(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.visible)
    }

    pub fn completed_flows(&self) -> &BTreeSet<String> {
        &self.completed
    }

    pub fn is_completed(&self, flow_id: &str) -> bool {
        self.completed.contains(flow_id)
    }

    pub fn skip_policy(&self) -> SkipPolicy {
        self.skip_policy
    }

    /// Clear the completed set. Support and testing use only.
    pub fn reset_completed(&mut self) {
        self.completed.clear();
    }

    /// Whether applying `command` would return the machine to `Idle`
    pub fn would_end_flow(&self, registry: &FlowRegistry, command: &TourCommand) -> bool {
        let Some(active) = &self.active else {
            return false;
        };
        match command {
            TourCommand::Skip | TourCommand::Complete => true,
            TourCommand::Next => registry
                .get(&active.flow_id)
                .is_none_or(|flow| active.step_index >= flow.last_index()),
            _ => false,
        }
    }

    /// Apply a command and report what happened
    pub fn apply(&mut self, registry: &FlowRegistry, command: TourCommand) -> Transition {
        match command {
            TourCommand::Start(flow_id) => self.start(registry, flow_id),
            TourCommand::Next => self.next(registry),
            TourCommand::Prev => self.prev(),
            TourCommand::Skip => self.finish(FlowEnd::Skipped),
            TourCommand::Complete => self.finish(FlowEnd::Completed),
            TourCommand::Hide => self.set_visible(false),
            TourCommand::Show => self.set_visible(true),
            TourCommand::JumpTo(index) => self.jump(registry, index),
        }
    }

    fn start(&mut self, registry: &FlowRegistry, flow_id: String) -> Transition {
        if let Some(active) = &self.active {
            return Transition::Ignored(Rejection::AlreadyActive {
                active: active.flow_id.clone(),
                requested: flow_id,
            });
        }
        if !registry.contains(&flow_id) {
            return Transition::Ignored(Rejection::UnknownFlow(flow_id));
        }
        self.active = Some(ActiveFlow {
            flow_id: flow_id.clone(),
            step_index: 0,
            visible: true,
        });
        Transition::Started { flow_id }
    }

    fn next(&mut self, registry: &FlowRegistry) -> Transition {
        let Some(active) = self.active.as_mut() else {
            return Transition::Ignored(Rejection::NotActive);
        };
        let Some(flow) = registry.get(&active.flow_id) else {
            let id = active.flow_id.clone();
            self.active = None;
            return Transition::Ignored(Rejection::MissingFlow(id));
        };
        if active.step_index >= flow.last_index() {
            return self.finish(FlowEnd::Completed);
        }
        let from = active.step_index;
        active.step_index += 1;
        Transition::StepChanged {
            flow_id: active.flow_id.clone(),
            from,
            to: active.step_index,
        }
    }

    fn prev(&mut self) -> Transition {
        let Some(active) = self.active.as_mut() else {
            return Transition::Ignored(Rejection::NotActive);
        };
        if active.step_index == 0 {
            return Transition::Ignored(Rejection::AtFirstStep);
        }
        let from = active.step_index;
        active.step_index -= 1;
        Transition::StepChanged {
            flow_id: active.flow_id.clone(),
            from,
            to: active.step_index,
        }
    }

    fn jump(&mut self, registry: &FlowRegistry, index: usize) -> Transition {
        let Some(active) = self.active.as_mut() else {
            return Transition::Ignored(Rejection::NotActive);
        };
        let Some(flow) = registry.get(&active.flow_id) else {
            return Transition::Ignored(Rejection::MissingFlow(active.flow_id.clone()));
        };
        let to = index.min(flow.last_index());
        if to == active.step_index {
            return Transition::Ignored(Rejection::SameStep);
        }
        let from = active.step_index;
        active.step_index = to;
        Transition::StepChanged {
            flow_id: active.flow_id.clone(),
            from,
            to,
        }
    }

    fn set_visible(&mut self, visible: bool) -> Transition {
        let Some(active) = self.active.as_mut() else {
            return Transition::Ignored(Rejection::NotActive);
        };
        if active.visible == visible {
            return Transition::Ignored(Rejection::VisibilityUnchanged);
        }
        active.visible = visible;
        Transition::VisibilityChanged {
            flow_id: active.flow_id.clone(),
            visible,
        }
    }

    fn finish(&mut self, end: FlowEnd) -> Transition {
        let Some(active) = self.active.take() else {
            return Transition::Ignored(Rejection::NotActive);
        };
        let record = match end {
            FlowEnd::Completed => true,
            FlowEnd::Skipped => self.skip_policy == SkipPolicy::RecordCompletion,
        };
        let newly_completed = record && self.completed.insert(active.flow_id.clone());
        Transition::Finished {
            flow_id: active.flow_id,
            end,
            newly_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::{Flow, Step};
    use crate::types::Side;

    fn registry() -> FlowRegistry {
        let steps = (0..3)
            .map(|i| Step::tooltip(format!("s{i}"), "t", "d", format!("#t{i}"), Side::Bottom))
            .collect();
        FlowRegistry::new([Flow::new("f1", steps)]).unwrap()
    }

    #[test]
    fn test_next_past_last_completes_once() {
        let reg = registry();
        let mut state = TourState::default();
        state.apply(&reg, TourCommand::Start("f1".into()));
        state.apply(&reg, TourCommand::JumpTo(2));

        let t = state.apply(&reg, TourCommand::Next);
        assert!(t.completed_grew());
        assert!(state.is_idle());
        assert!(state.is_completed("f1"));

        let again = state.apply(&reg, TourCommand::Next);
        assert_eq!(again, Transition::Ignored(Rejection::NotActive));
        assert_eq!(state.completed_flows().len(), 1);
    }

    #[test]
    fn test_would_end_flow() {
        let reg = registry();
        let mut state = TourState::default();
        assert!(!state.would_end_flow(&reg, &TourCommand::Skip));
        state.apply(&reg, TourCommand::Start("f1".into()));
        assert!(!state.would_end_flow(&reg, &TourCommand::Next));
        assert!(state.would_end_flow(&reg, &TourCommand::Skip));
        state.apply(&reg, TourCommand::JumpTo(9));
        assert!(state.would_end_flow(&reg, &TourCommand::Next));
    }

    #[test]
    fn test_forget_policy_does_not_record_skip() {
        let reg = registry();
        let mut state = TourState::hydrated(BTreeSet::new(), SkipPolicy::Forget);
        state.apply(&reg, TourCommand::Start("f1".into()));
        let t = state.apply(&reg, TourCommand::Skip);
        assert!(matches!(
            t,
            Transition::Finished {
                end: FlowEnd::Skipped,
                newly_completed: false,
                ..
            }
        ));
        assert!(!state.is_completed("f1"));
    }
}
