//! Full-screen slide deck
//!
//! Presentation for flows whose steps carry no target: a centered card with
//! title, optional illustration caption, description, a dot indicator and
//! the navigation buttons. Dots are clickable and jump to that step.

use super::callout::{button_width, truncate, wrap_text};
use crate::engine::view::{CalloutAction, StepView};
use crate::theme::{Colors, Styles, Theme, UiConstants};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Modifier;
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Widget};

/// Hit areas of a rendered slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideLayout {
    card: Rect,
    dots: Vec<Rect>,
    buttons: Vec<(Rect, CalloutAction)>,
}

impl SlideLayout {
    pub fn compute(view: &StepView<'_>, area: Rect) -> Self {
        let width = area.width.saturating_sub(4).min(UiConstants::SLIDE_MAX_WIDTH);
        let height = area.height.saturating_sub(2).min(UiConstants::SLIDE_MAX_HEIGHT);
        let card = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );

        let dots_row = card.bottom().saturating_sub(4);
        let dots_width = u16::try_from(view.total * 2).unwrap_or(u16::MAX).saturating_sub(1);
        let mut x = card.x + card.width.saturating_sub(dots_width) / 2;
        let mut dots = Vec::with_capacity(view.total);
        for _ in 0..view.total {
            if x >= card.right() {
                break;
            }
            dots.push(Rect::new(x, dots_row, 1, 1));
            x = x.saturating_add(2);
        }

        let actions = view.actions();
        let widths: Vec<u16> = actions
            .iter()
            .map(|&a| u16::try_from(button_width(a)).unwrap_or(0))
            .collect();
        let gaps = u16::try_from(widths.len().saturating_sub(1)).unwrap_or(0);
        let total: u16 = widths.iter().sum::<u16>() + gaps;
        let buttons_row = card.bottom().saturating_sub(2);
        let mut x = card.x + card.width.saturating_sub(total) / 2;
        let mut buttons = Vec::with_capacity(actions.len());
        for (action, width) in actions.into_iter().zip(widths) {
            if x + width > card.right().saturating_sub(1) {
                break;
            }
            buttons.push((Rect::new(x, buttons_row, width, 1), action));
            x += width + 1;
        }

        Self {
            card,
            dots,
            buttons,
        }
    }

    pub fn card(&self) -> Rect {
        self.card
    }

    /// Step index of the dot at a position
    pub fn dot_at(&self, col: u16, row: u16) -> Option<usize> {
        self.dots
            .iter()
            .position(|dot| dot.contains((col, row).into()))
    }

    pub fn button_at(&self, col: u16, row: u16) -> Option<CalloutAction> {
        self.buttons
            .iter()
            .find(|(rect, _)| rect.contains((col, row).into()))
            .map(|&(_, action)| action)
    }
}

/// Slide widget
#[derive(Debug, Clone, Copy)]
pub struct SlideDeck<'a> {
    view: &'a StepView<'a>,
    layout: &'a SlideLayout,
}

impl<'a> SlideDeck<'a> {
    pub fn new(view: &'a StepView<'a>, layout: &'a SlideLayout) -> Self {
        Self { view, layout }
    }
}

impl Widget for SlideDeck<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Block::default().style(Styles::dimmed()).render(area, buf);

        let card = self.layout.card.intersection(area);
        if card.width < 4 || card.height < 4 {
            return;
        }
        Clear.render(card, buf);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Styles::callout_border())
            .style(Styles::callout())
            .title_bottom(Line::from(format!(" {} ", self.view.progress_label())).right_aligned());
        let inner = block.inner(card);
        block.render(card, buf);

        let text_width = usize::from(inner.width.saturating_sub(2));
        let mut lines = vec![
            Line::from(""),
            Line::styled(
                truncate(&self.view.step.title, text_width),
                Styles::callout_title().add_modifier(Modifier::UNDERLINED),
            ),
            Line::from(""),
        ];
        if let Some(image) = &self.view.step.image {
            lines.push(Line::styled(
                truncate(&format!("▣ {}", image), text_width),
                Styles::text_muted().bg(Colors::CALLOUT_BG),
            ));
            lines.push(Line::from(""));
        }
        lines.extend(
            wrap_text(&self.view.step.description, text_width)
                .into_iter()
                .map(|l| Line::styled(l, Styles::callout())),
        );

        let body = Rect::new(
            inner.x + 1,
            inner.y,
            inner.width.saturating_sub(2),
            self.layout.dots.first().map_or(inner.height, |dot| dot.y.saturating_sub(inner.y)),
        );
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(body.intersection(inner), buf);

        for (index, dot) in self.layout.dots.iter().enumerate() {
            let active = index == self.view.index;
            buf.set_string(
                dot.x,
                dot.y,
                Theme::dot_symbol(active),
                Theme::dot_style(active).bg(Colors::CALLOUT_BG),
            );
        }

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
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::Step;
    use crate::types::FlowKind;

    fn view(step: &Step, index: usize) -> StepView<'_> {
        StepView {
            flow_id: "welcome",
            step,
            index,
            total: 3,
            kind: FlowKind::Slide,
            target: None,
        }
    }

    #[test]
    fn test_card_is_centered() {
        let step = Step::slide("intro", "Welcome", "Hello");
        let layout = SlideLayout::compute(&view(&step, 0), Rect::new(0, 0, 100, 40));
        let card = layout.card();
        assert_eq!(card.width, UiConstants::SLIDE_MAX_WIDTH);
        assert_eq!(card.x, (100 - card.width) / 2);
        assert_eq!(card.height, UiConstants::SLIDE_MAX_HEIGHT);
    }

    #[test]
    fn test_dot_hit_testing() {
        let step = Step::slide("intro", "Welcome", "Hello");
        let layout = SlideLayout::compute(&view(&step, 0), Rect::new(0, 0, 100, 40));
        let third = layout.dots[2];
        assert_eq!(layout.dot_at(third.x, third.y), Some(2));
        assert_eq!(layout.dot_at(third.x + 1, third.y), None);
    }

    #[test]
    fn test_buttons_follow_actions() {
        let step = Step::slide("modules", "Workspaces", "Three of them");
        let layout = SlideLayout::compute(&view(&step, 1), Rect::new(0, 0, 100, 40));
        let actions: Vec<_> = layout.buttons.iter().map(|&(_, a)| a).collect();
        assert_eq!(
            actions,
            vec![CalloutAction::Back, CalloutAction::Next, CalloutAction::Skip]
        );
        let (rect, _) = layout.buttons[1];
        assert_eq!(layout.button_at(rect.x + 1, rect.y), Some(CalloutAction::Next));
    }

    #[test]
    fn test_render_shows_title_and_progress() {
        let step = Step::slide("intro", "Welcome aboard", "Hello").with_image("overview");
        let v = view(&step, 0);
        let area = Rect::new(0, 0, 80, 24);
        let layout = SlideLayout::compute(&v, area);
        let mut buf = Buffer::empty(area);
        SlideDeck::new(&v, &layout).render(area, &mut buf);

        let text: String = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("Welcome aboard"));
        assert!(text.contains("1 of 3"));
        assert!(text.contains("overview"));
    }
}
