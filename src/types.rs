//! Type-safe tour vocabulary
//!
//! Sides, arrow directions and flow kinds are enums rather than strings so
//! placement and rendering can match on them exhaustively.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Preferred side of the target on which a callout is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    /// No strong relation to the target; placed with the bottom rule
    Center,
}

/// Edge of the callout that carries the arrow.
///
/// The arrow always points back toward the target, so a callout placed
/// below its target carries the arrow on its top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ArrowSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl ArrowSide {
    /// Arrow glyph drawn on the callout border
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Top => "▲",
            Self::Bottom => "▼",
            Self::Left => "◀",
            Self::Right => "▶",
        }
    }
}

/// Presentation variant of a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FlowKind {
    /// Every step is anchored to an on-screen target
    Tooltip,
    /// No step has a target; rendered as a full-screen carousel
    Slide,
}
