//! Spotlight overlay
//!
//! Dims the whole viewport except a padded hole around the current target,
//! and draws a pulsing rounded ring around the hole.
//!
//! # Invariants
//!
//! 1. No target means no layout and no overlay; the page stays untouched.
//! 2. Cells inside the hole are never modified.
//! 3. The ring style depends only on elapsed time, so frames are reproducible.

use crate::geometry::{Size, TargetRect};
use crate::theme::{Styles, Theme};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use std::time::Duration;

/// Where a click landed relative to the spotlight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotlightHit {
    /// Inside the cut-out; the page underneath receives the click
    Hole,
    /// On the dimmed overlay; dismisses the current tooltip
    Dimmed,
    /// Outside the viewport
    Outside,
}

/// Geometry of a spotlight for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpotlightLayout {
    hole: TargetRect,
    viewport: Size,
}

impl SpotlightLayout {
    /// `None` when there is no target to highlight
    pub fn compute(target: Option<TargetRect>, viewport: Size, padding: i32) -> Option<Self> {
        let target = target?;
        Some(Self {
            hole: target.expand(padding.max(0)),
            viewport,
        })
    }

    /// The cut-out: target expanded by the padding
    pub fn hole(&self) -> TargetRect {
        self.hole
    }

    /// Rectangle whose border cells carry the ring
    pub fn ring(&self) -> TargetRect {
        self.hole.expand(1)
    }

    pub fn hit(&self, col: u16, row: u16) -> SpotlightHit {
        let (x, y) = (i32::from(col), i32::from(row));
        if x >= self.viewport.width || y >= self.viewport.height {
            return SpotlightHit::Outside;
        }
        if self.hole.contains(x, y) {
            SpotlightHit::Hole
        } else {
            SpotlightHit::Dimmed
        }
    }
}

/// Pulse phase in `[0, 1)` for `elapsed` time into a `period`
pub fn pulse_phase(elapsed: Duration, period: Duration) -> f32 {
    let period = period.as_millis();
    if period == 0 {
        return 0.0;
    }
    let into = elapsed.as_millis() % period;
    into as f32 / period as f32
}

/// Spotlight widget
#[derive(Debug, Clone, Copy)]
pub struct Spotlight {
    layout: SpotlightLayout,
    phase: f32,
}

impl Spotlight {
    pub fn new(layout: SpotlightLayout) -> Self {
        Self { layout, phase: 0.0 }
    }

    /// Set the ring pulse phase
    #[must_use]
    pub fn phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    fn render_overlay(&self, area: Rect, buf: &mut Buffer) {
        let hole = self.layout.hole;
        let style = Styles::dimmed();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if hole.contains(i32::from(x), i32::from(y)) {
                    continue;
                }
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_style(style);
                }
            }
        }
    }

    fn render_ring(&self, area: Rect, buf: &mut Buffer) {
        let ring = self.layout.ring();
        if ring.width < 2 || ring.height < 2 {
            return;
        }
        let style = Theme::ring_style(self.phase);
        let (left, top) = (ring.left, ring.top);
        let (right, bottom) = (ring.right() - 1, ring.bottom() - 1);

        for x in left + 1..right {
            put(buf, area, x, top, "─", style);
            put(buf, area, x, bottom, "─", style);
        }
        for y in top + 1..bottom {
            put(buf, area, left, y, "│", style);
            put(buf, area, right, y, "│", style);
        }
        put(buf, area, left, top, "╭", style);
        put(buf, area, right, top, "╮", style);
        put(buf, area, left, bottom, "╰", style);
        put(buf, area, right, bottom, "╯", style);
    }
}

impl Widget for Spotlight {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_overlay(area, buf);
        self.render_ring(area, buf);
    }
}

/// Write one symbol if `(x, y)` lies inside `area`
fn put(buf: &mut Buffer, area: Rect, x: i32, y: i32, symbol: &str, style: Style) {
    let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
        return;
    };
    if x < area.left() || x >= area.right() || y < area.top() || y >= area.bottom() {
        return;
    }
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_symbol(symbol).set_style(style);
    }
}
