//! Header and navigation bar rendering
//!
//! The header carries the console title and the workspace tab strip. The tab
//! strip is a tour target (`#nav`), so it is registered with the region map
//! every frame it is on screen.

use crate::app::Route;
use crate::components::keybindings::NavBarItem;
use crate::engine::locator::RegionMap;
use crate::theme::{Colors, Styles};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

/// Selector of the tab strip
pub const NAV_SELECTOR: &str = "#nav";

/// Header renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderRenderer;

impl HeaderRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render title and tabs. Returns the clickable tab areas.
    pub fn render_header(
        &self,
        f: &mut Frame,
        area: Rect,
        route: Route,
        regions: &mut RegionMap,
    ) -> Vec<(Rect, Route)> {
        if area.width == 0 || area.height == 0 {
            return Vec::new();
        }

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Styles::border_inactive());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let title = Line::from(vec![
            Span::styled(" ◆ ", Style::default().fg(Colors::PRIMARY)),
            Span::styled("Ops Console", Styles::title()),
        ]);
        f.render_widget(Paragraph::new(title), inner);

        if !route.is_workspace() {
            let hint = Paragraph::new(Line::styled(route.title(), Styles::text_muted()))
                .alignment(Alignment::Right);
            f.render_widget(hint, inner);
            return Vec::new();
        }

        let tabs = Self::tab_areas(inner);
        if let (Some((first, _)), Some((last, _))) = (tabs.first(), tabs.last()) {
            let strip = Rect::new(first.x, first.y, last.right() - first.x, 1);
            regions.register(NAV_SELECTOR, strip);
        }
        for (rect, tab) in &tabs {
            let style = if *tab == route {
                Styles::selected().add_modifier(Modifier::BOLD)
            } else {
                Styles::text_secondary()
            };
            f.render_widget(
                Paragraph::new(Line::styled(format!(" {} ", tab.title()), style)),
                *rect,
            );
        }
        tabs
    }

    /// Tab cells laid out right of the title, dropping tabs that do not fit
    fn tab_areas(inner: Rect) -> Vec<(Rect, Route)> {
        let mut x = inner.x + 16;
        let mut tabs = Vec::new();
        for tab in Route::workspaces() {
            let width = u16::try_from(tab.title().width() + 2).unwrap_or(u16::MAX);
            if x.saturating_add(width) > inner.right() {
                break;
            }
            tabs.push((Rect::new(x, inner.y, width, 1), tab));
            x += width + 1;
        }
        tabs
    }

    /// Render the bottom bar: status message on the left, key hints on the right
    pub fn render_nav_bar(&self, f: &mut Frame, area: Rect, items: &[NavBarItem], status: &str) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        f.render_widget(Block::default().style(Styles::bar_bg()), area);

        let mut spans = Vec::new();
        for item in items {
            spans.push(Span::styled(format!(" {} ", item.key_display), Styles::nav_key()));
            spans.push(Span::styled(format!("{} ", item.action_label), Styles::nav_hint()));
        }
        f.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
            area,
        );

        if !status.is_empty() {
            f.render_widget(
                Paragraph::new(Line::styled(format!(" {}", status), Styles::warning())),
                area,
            );
        }
    }
}
