//! Help overlay component
//!
//! Displays context-sensitive help in a centered floating window.

use super::keybindings::{HelpSection, InputContext, KeybindingContext};
use crate::theme::{Colors, Styles, UiConstants};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Wrap},
};

/// Help overlay component
pub struct HelpOverlay {
    /// Context the help was opened from
    context: InputContext,
    content: Vec<Line<'static>>,
}

impl HelpOverlay {
    /// Create a new help overlay for the given context
    pub fn new(context: InputContext, keybinding_ctx: &KeybindingContext) -> Self {
        let sections = keybinding_ctx.get_help_content(context);
        Self {
            context,
            content: Self::build_content(&sections, context),
        }
    }

    pub fn context(&self) -> InputContext {
        self.context
    }

    /// Build the help content from sections
    fn build_content(sections: &[HelpSection], context: InputContext) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();

        lines.push(Line::from(vec![Span::styled(
            "  Ops Console Help  ",
            Style::default()
                .fg(Colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )]));
        lines.push(Line::from(""));

        let context_name = match context {
            InputContext::Page => "Page",
            InputContext::Tour => "Guided Tour",
            InputContext::Menu => "Tour Menu",
            InputContext::Help => "Help",
        };
        lines.push(Line::from(vec![
            Span::styled("Current: ", Styles::text_muted()),
            Span::styled(context_name, Style::default().fg(Colors::SECONDARY)),
        ]));
        lines.push(Line::from(""));

        for section in sections {
            lines.push(Line::from(vec![Span::styled(
                format!("  {}  ", section.title),
                Style::default()
                    .fg(Colors::SUCCESS)
                    .add_modifier(Modifier::BOLD),
            )]));
            lines.push(Line::from(""));

            for (key, description) in &section.items {
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!("{:<10}", key), Styles::nav_key()),
                    Span::styled(description.clone(), Styles::text()),
                ]));
            }
            lines.push(Line::from(""));
        }

        lines
    }

    /// Render the help overlay centered in `parent`
    pub fn render(&self, f: &mut Frame, parent: Rect) {
        let area = centered(
            parent,
            UiConstants::OVERLAY_WIDTH_PCT,
            UiConstants::OVERLAY_HEIGHT_PCT,
        );
        f.render_widget(Clear, area);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Styles::border_active())
            .style(Styles::panel_bg())
            .title(" Help ")
            .title_bottom(Line::styled(" Press ? or Esc to close ", Styles::nav_hint()).centered());
        f.render_widget(
            Paragraph::new(self.content.clone())
                .block(block)
                .wrap(Wrap { trim: false }),
            area,
        );
    }
}

/// Centered rectangle taking a percentage of `parent`
pub fn centered(parent: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(height_pct)])
        .flex(Flex::Center)
        .areas(parent);
    let [area] = Layout::horizontal([Constraint::Percentage(width_pct)])
        .flex(Flex::Center)
        .areas(row);
    area
}
