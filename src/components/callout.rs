//! Callout renderer
//!
//! The tooltip box for a tooltip step: title, wrapped description, progress
//! dots, navigation buttons and an arrow glyph pointing back at the target.
//!
//! Measuring (`CalloutContent`) is separate from positioning
//! (`CalloutLayout`), because the position calculator needs the box size
//! before the box can be laid out.

use crate::engine::placement::TooltipPosition;
use crate::engine::view::{CalloutAction, StepView};
use crate::geometry::{Size, TargetRect};
use crate::theme::{Colors, Styles, Theme};
use crate::types::ArrowSide;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Clear, Widget};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Border plus one column of padding on each side
const FRAME_WIDTH: usize = 4;

/// Border rows plus title, two spacer rows, progress row and button row
const FRAME_HEIGHT: usize = 7;

/// Gap between buttons
const BUTTON_GAP: i32 = 1;

/// Measured callout content for one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutContent {
    pub title: String,
    pub lines: Vec<String>,
    pub index: usize,
    pub total: usize,
    pub progress: String,
    pub actions: Vec<CalloutAction>,
    size: Size,
}

impl CalloutContent {
    /// Wrap and measure a step for a box at most `max_width` columns wide
    pub fn from_view(view: &StepView<'_>, max_width: u16) -> Self {
        let inner_max = usize::from(max_width).saturating_sub(FRAME_WIDTH).max(1);
        let title = truncate(&view.step.title, inner_max);
        let lines = wrap_text(&view.step.description, inner_max);
        let actions = view.actions();
        let progress = view.progress_label();

        let progress_width = view.total * 2 + 1 + progress.width();
        let inner_width = lines
            .iter()
            .map(|l| l.width())
            .chain([title.width(), progress_width, buttons_width(&actions)])
            .max()
            .unwrap_or(0)
            .min(inner_max);

        let size = Size::new(
            to_i32(inner_width + FRAME_WIDTH),
            to_i32(lines.len() + FRAME_HEIGHT),
        );

        Self {
            title,
            lines,
            index: view.index,
            total: view.total,
            progress,
            actions,
            size,
        }
    }

    /// Outer box size including borders
    pub fn size(&self) -> Size {
        self.size
    }
}

/// Screen geometry of a placed callout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutLayout {
    /// Unclipped box in viewport coordinates
    frame: TargetRect,
    /// Visible part of the box
    area: Rect,
    arrow: Option<(u16, u16, ArrowSide)>,
    buttons: Vec<(Rect, CalloutAction)>,
}

impl CalloutLayout {
    /// Lay out `content` at `position`. `None` if nothing would be visible.
    pub fn compute(
        content: &CalloutContent,
        position: TooltipPosition,
        target: Option<TargetRect>,
        viewport: Size,
    ) -> Option<Self> {
        let size = content.size();
        let frame = TargetRect::new(position.top, position.left, size.width, size.height);
        let area = frame.clip_to(viewport)?;

        let arrow = match (position.arrow, target) {
            (Some(side), Some(target)) => arrow_cell(frame, target, side, viewport),
            _ => None,
        };

        let row = frame.bottom() - 2;
        let mut x = frame.left + 2;
        let mut buttons = Vec::with_capacity(content.actions.len());
        for &action in &content.actions {
            let width = button_width(action);
            let rect = TargetRect::new(row, x, width, 1);
            x += width + BUTTON_GAP;
            if rect.right() > frame.right() - 2 {
                break;
            }
            if let Some(clipped) = rect.clip_to(viewport)
                && clipped.width == to_u16(width)
            {
                buttons.push((clipped, action));
            }
        }

        Some(Self {
            frame,
            area,
            arrow,
            buttons,
        })
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Arrow cell and the edge it sits on
    pub fn arrow(&self) -> Option<(u16, u16, ArrowSide)> {
        self.arrow
    }

    pub fn buttons(&self) -> &[(Rect, CalloutAction)] {
        &self.buttons
    }

    pub fn contains(&self, col: u16, row: u16) -> bool {
        self.area.contains((col, row).into())
    }

    pub fn button_at(&self, col: u16, row: u16) -> Option<CalloutAction> {
        self.buttons
            .iter()
            .find(|(rect, _)| rect.contains((col, row).into()))
            .map(|&(_, action)| action)
    }
}

/// Callout widget
#[derive(Debug, Clone, Copy)]
pub struct Callout<'a> {
    content: &'a CalloutContent,
    layout: &'a CalloutLayout,
}

impl<'a> Callout<'a> {
    pub fn new(content: &'a CalloutContent, layout: &'a CalloutLayout) -> Self {
        Self { content, layout }
    }
}

impl Widget for Callout<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let clip = self.layout.area.intersection(area);
        if clip.is_empty() {
            return;
        }
        Clear.render(clip, buf);
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Styles::callout_border())
            .style(Styles::callout())
            .render(clip, buf);

        let frame = self.layout.frame;
        let left = frame.left + 2;
        let width = usize::try_from(frame.width).unwrap_or(0).saturating_sub(FRAME_WIDTH);
        let mut row = frame.top + 1;

        put_str(buf, clip, left, row, &self.content.title, Styles::callout_title(), width);
        row += 2;
        for line in &self.content.lines {
            put_str(buf, clip, left, row, line, Styles::callout(), width);
            row += 1;
        }
        row += 1;

        let mut x = left;
        for i in 0..self.content.total {
            let active = i == self.content.index;
            put_str(
                buf,
                clip,
                x,
                row,
                Theme::dot_symbol(active),
                Theme::dot_style(active).bg(Colors::CALLOUT_BG),
                1,
            );
            x += 2;
        }
        put_str(
            buf,
            clip,
            x + 1,
            row,
            &self.content.progress,
            Styles::text_muted().bg(Colors::CALLOUT_BG),
            width,
        );

        for (rect, action) in &self.layout.buttons {
            let style = match action {
                CalloutAction::Next | CalloutAction::Done => Styles::button_primary(),
                _ => Styles::button_secondary(),
            };
            buf.set_stringn(
                rect.x,
                rect.y,
                format!(" {} ", action.label()),
                usize::from(rect.width),
                style,
            );
        }

        if let Some((x, y, side)) = self.layout.arrow
            && area.contains((x, y).into())
            && let Some(cell) = buf.cell_mut((x, y))
        {
            cell.set_symbol(side.glyph()).set_style(Styles::arrow());
        }
    }
}

/// Greedy word wrap by display width. Words wider than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0;
        for word in paragraph.split_whitespace() {
            for piece in split_word(word, width) {
                let piece_width = piece.width();
                if current_width == 0 {
                    current = piece;
                    current_width = piece_width;
                } else if current_width + 1 + piece_width <= width {
                    current.push(' ');
                    current.push_str(&piece);
                    current_width += 1 + piece_width;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current = piece;
                    current_width = piece_width;
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Cut `text` to at most `width` columns, marking the cut with an ellipsis
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn split_word(word: &str, width: usize) -> Vec<String> {
    if word.width() <= width {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut used = 0;
    for ch in word.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            used = 0;
        }
        piece.push(ch);
        used += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Button cell width: label plus one space each side
pub fn button_width(action: CalloutAction) -> i32 {
    to_i32(action.label().width() + 2)
}

fn buttons_width(actions: &[CalloutAction]) -> usize {
    let labels: i32 = actions.iter().map(|&a| button_width(a)).sum();
    let gaps = BUTTON_GAP * to_i32(actions.len().saturating_sub(1));
    usize::try_from(labels + gaps).unwrap_or(0)
}

/// Arrow cell just outside `frame` on `side`, aimed at the target centre
fn arrow_cell(
    frame: TargetRect,
    target: TargetRect,
    side: ArrowSide,
    viewport: Size,
) -> Option<(u16, u16, ArrowSide)> {
    let (cx, cy) = target.center();
    let clamp_x = |x: i32| x.clamp(frame.left + 1, (frame.right() - 2).max(frame.left + 1));
    let clamp_y = |y: i32| y.clamp(frame.top + 1, (frame.bottom() - 2).max(frame.top + 1));
    let (x, y) = match side {
        ArrowSide::Top => (clamp_x(cx), frame.top - 1),
        ArrowSide::Bottom => (clamp_x(cx), frame.bottom()),
        ArrowSide::Left => (frame.left - 1, clamp_y(cy)),
        ArrowSide::Right => (frame.right(), clamp_y(cy)),
    };
    if x < 0 || y < 0 || x >= viewport.width || y >= viewport.height {
        return None;
    }
    Some((to_u16(x), to_u16(y), side))
}

fn put_str(buf: &mut Buffer, clip: Rect, x: i32, y: i32, text: &str, style: Style, width: usize) {
    let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
        return;
    };
    if y < clip.top() || y >= clip.bottom() || x < clip.left() || x >= clip.right() {
        return;
    }
    let room = usize::from(clip.right() - x).min(width);
    buf.set_stringn(x, y, text, room, style);
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn to_u16(value: i32) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::placement::{self, PlacementConfig};
    use crate::flows::Step;
    use crate::types::{FlowKind, Side};

    fn view(step: &Step, index: usize, total: usize) -> StepView<'_> {
        StepView {
            flow_id: "fleet-tour",
            step,
            index,
            total,
            kind: FlowKind::Tooltip,
            target: Some(TargetRect::new(4, 20, 10, 3)),
        }
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.width() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn test_wrap_splits_long_words_and_wide_chars() {
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        let lines = wrap_text("車両一覧を表示", 4);
        assert!(lines.iter().all(|l| l.width() <= 4));
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate("Vehicles", 20), "Vehicles");
        assert_eq!(truncate("Vehicles", 5), "Vehi…");
    }

    #[test]
    fn test_content_size_includes_frame() {
        let step = Step::tooltip("s", "Vehicles", "All vehicles in the fleet.", "#t", Side::Bottom);
        let content = CalloutContent::from_view(&view(&step, 1, 3), 44);
        assert_eq!(content.lines.len(), 1);
        assert_eq!(content.size().height, 8);
        assert!(content.size().width <= 44);
        assert_eq!(
            content.actions,
            vec![CalloutAction::Back, CalloutAction::Next, CalloutAction::Skip]
        );
    }

    #[test]
    fn test_layout_arrow_points_at_target() {
        let step = Step::tooltip("s", "Vehicles", "All vehicles.", "#t", Side::Bottom);
        let v = view(&step, 0, 2);
        let content = CalloutContent::from_view(&v, 44);
        let viewport = Size::new(80, 30);
        let pos = placement::calculate(
            v.target.unwrap(),
            content.size(),
            Side::Bottom,
            viewport,
            &PlacementConfig::default(),
        );
        let layout = CalloutLayout::compute(&content, pos, v.target, viewport).unwrap();
        let (x, y, side) = layout.arrow().unwrap();
        assert_eq!(side, ArrowSide::Top);
        assert_eq!(i32::from(x), 25);
        assert_eq!(i32::from(y), pos.top - 1);

        let (rect, action) = layout.buttons()[0];
        assert_eq!(action, CalloutAction::Next);
        assert_eq!(layout.button_at(rect.x, rect.y), Some(CalloutAction::Next));
        assert_eq!(layout.button_at(0, 0), None);
    }

    #[test]
    fn test_layout_fully_offscreen_is_none() {
        let step = Step::tooltip("s", "T", "D", "#t", Side::Bottom);
        let content = CalloutContent::from_view(&view(&step, 0, 1), 44);
        let pos = TooltipPosition {
            top: 100,
            left: 100,
            arrow: None,
        };
        assert!(CalloutLayout::compute(&content, pos, None, Size::new(80, 24)).is_none());
    }
}
