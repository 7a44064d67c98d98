//! Host rendering slots
//!
//! Everything a renderer needs for the current step: content, progress,
//! available actions and the located target (or `None`).

use super::placement::{self, PlacementConfig, TooltipPosition};
use crate::flows::Step;
use crate::geometry::{Size, TargetRect};
use crate::types::{FlowKind, Side};

/// Buttons a callout or slide can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalloutAction {
    Back,
    Next,
    /// Next on the last step
    Done,
    Skip,
    /// Hide a single-step tooltip without completing it
    Close,
}

impl CalloutAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Back => "← Back",
            Self::Next => "Next →",
            Self::Done => "Done ✓",
            Self::Skip => "Skip",
            Self::Close => "Close",
        }
    }
}

/// Snapshot of the active step for renderers
#[derive(Debug, Clone, PartialEq)]
pub struct StepView<'a> {
    pub flow_id: &'a str,
    pub step: &'a Step,
    pub index: usize,
    pub total: usize,
    pub kind: FlowKind,
    /// Located target; `None` when not found or for slide steps
    pub target: Option<TargetRect>,
}

impl StepView<'_> {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }

    pub fn is_single(&self) -> bool {
        self.total == 1
    }

    /// "2 of 5"
    pub fn progress_label(&self) -> String {
        format!("{} of {}", self.index + 1, self.total)
    }

    pub fn preferred_side(&self) -> Side {
        self.step.side()
    }

    /// Actions in display order
    pub fn actions(&self) -> Vec<CalloutAction> {
        if self.is_single() {
            return vec![CalloutAction::Done, CalloutAction::Close];
        }
        let mut actions = Vec::with_capacity(3);
        if !self.is_first() {
            actions.push(CalloutAction::Back);
        }
        actions.push(if self.is_last() {
            CalloutAction::Done
        } else {
            CalloutAction::Next
        });
        if !self.is_last() {
            actions.push(CalloutAction::Skip);
        }
        actions
    }

    /// Callout position for this step
    pub fn place(
        &self,
        callout: Size,
        viewport: Size,
        config: &PlacementConfig,
    ) -> TooltipPosition {
        match self.target {
            Some(target) => {
                placement::calculate(target, callout, self.preferred_side(), viewport, config)
            }
            None => placement::center_in_viewport(callout, viewport, config),
        }
    }
}
