//! Viewport geometry
//!
//! Signed integer rectangles for placement math. Callouts may be computed
//! partially off-screen before clamping, so arithmetic happens in `i32` and
//! only the rendering boundary converts to `ratatui::layout::Rect`.

use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

/// Bounding box of an on-screen target in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetRect {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl TargetRect {
    pub const fn new(top: i32, left: i32, width: i32, height: i32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Exclusive right edge
    #[inline]
    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Exclusive bottom edge
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Center point as `(x, y)`
    #[inline]
    pub const fn center(&self) -> (i32, i32) {
        (self.left + self.width / 2, self.top + self.height / 2)
    }

    /// Grow the rectangle by `pad` on every side
    pub const fn expand(&self, pad: i32) -> Self {
        Self {
            top: self.top - pad,
            left: self.left - pad,
            width: self.width + pad * 2,
            height: self.height + pad * 2,
        }
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    /// Clip into the viewport, returning `None` when nothing is visible
    pub fn clip_to(&self, viewport: Size) -> Option<Rect> {
        let left = self.left.clamp(0, viewport.width);
        let top = self.top.clamp(0, viewport.height);
        let right = self.right().clamp(0, viewport.width);
        let bottom = self.bottom().clamp(0, viewport.height);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(
            to_u16(left),
            to_u16(top),
            to_u16(right - left),
            to_u16(bottom - top),
        ))
    }
}

impl From<Rect> for TargetRect {
    fn from(rect: Rect) -> Self {
        Self {
            top: i32::from(rect.y),
            left: i32::from(rect.x),
            width: i32::from(rect.width),
            height: i32::from(rect.height),
        }
    }
}

/// Width and height pair used for callouts and viewports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl From<Rect> for Size {
    fn from(rect: Rect) -> Self {
        Self {
            width: i32::from(rect.width),
            height: i32::from(rect.height),
        }
    }
}

fn to_u16(value: i32) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}
