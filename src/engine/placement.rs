//! Position Calculator
//!
//! Translates a target rectangle, a callout size and a preferred side into a
//! viewport-safe callout position.
//!
//! # Rules
//!
//! | Preferred | Callout origin                          | Arrow edge |
//! |-----------|-----------------------------------------|------------|
//! | bottom    | below target, centered horizontally      | top        |
//! | top       | above target, centered horizontally      | bottom     |
//! | left      | left of target, centered vertically      | right      |
//! | right     | right of target, centered vertically     | left       |
//! | center    | same as bottom                           | top        |
//!
//! After the side rule the origin is clamped into
//! `[pad, viewport - pad]` on both axes, lower bound first. The arrow keeps
//! the preferred side's edge even when clamping slides the callout away from
//! the target.
//!
//! # Design
//!
//! - **Pure logic**: no I/O, no state, same inputs always give the same output
//! - **Unit-agnostic**: works for terminal cells and pixels alike

use crate::geometry::{Size, TargetRect};
use crate::types::{ArrowSide, Side};
use serde::{Deserialize, Serialize};

/// Spacing constants for callout placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Minimum distance between the callout and the viewport edge
    pub pad: i32,
    /// Extra distance between the target and the callout for the arrow
    pub arrow_gap: i32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            pad: 1,
            arrow_gap: 1,
        }
    }
}

/// Computed callout origin and arrow edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipPosition {
    pub top: i32,
    pub left: i32,
    /// `None` for the viewport-centered fallback (no target to point at)
    pub arrow: Option<ArrowSide>,
}

/// Place a callout of size `callout` next to `target`.
///
/// Whenever [`fits`] holds, the returned box lies entirely within
/// `[pad, viewport.width - pad] × [pad, viewport.height - pad]`.
pub fn calculate(
    target: TargetRect,
    callout: Size,
    preferred: Side,
    viewport: Size,
    config: &PlacementConfig,
) -> TooltipPosition {
    let (cx, cy) = target.center();
    let offset = config.pad + config.arrow_gap;

    let (top, left, arrow) = match preferred {
        Side::Bottom | Side::Center => (
            target.bottom() + offset,
            cx - callout.width / 2,
            ArrowSide::Top,
        ),
        Side::Top => (
            target.top - callout.height - offset,
            cx - callout.width / 2,
            ArrowSide::Bottom,
        ),
        Side::Left => (
            cy - callout.height / 2,
            target.left - callout.width - offset,
            ArrowSide::Right,
        ),
        Side::Right => (
            cy - callout.height / 2,
            target.right() + offset,
            ArrowSide::Left,
        ),
    };

    TooltipPosition {
        top: clamp_axis(top, callout.height, viewport.height, config.pad),
        left: clamp_axis(left, callout.width, viewport.width, config.pad),
        arrow: Some(arrow),
    }
}

/// Fallback placement when the target cannot be found
pub fn center_in_viewport(
    callout: Size,
    viewport: Size,
    config: &PlacementConfig,
) -> TooltipPosition {
    let top = (viewport.height - callout.height) / 2;
    let left = (viewport.width - callout.width) / 2;
    TooltipPosition {
        top: clamp_axis(top, callout.height, viewport.height, config.pad),
        left: clamp_axis(left, callout.width, viewport.width, config.pad),
        arrow: None,
    }
}

/// Whether a callout of this size fits inside the padded viewport
pub fn fits(callout: Size, viewport: Size, config: &PlacementConfig) -> bool {
    callout.width >= 0
        && callout.height >= 0
        && callout.width <= viewport.width - 2 * config.pad
        && callout.height <= viewport.height - 2 * config.pad
}

fn clamp_axis(origin: i32, extent: i32, limit: i32, pad: i32) -> i32 {
    let mut origin = origin;
    if origin < pad {
        origin = pad;
    }
    if origin + extent > limit - pad {
        origin = limit - extent - pad;
    }
    origin
}
