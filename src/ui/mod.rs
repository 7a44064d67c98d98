//! User interface rendering module
//!
//! - `header` - title, workspace tabs and the bottom navigation bar
//! - `pages` - the host console pages and their tour targets
//!
//! A frame is drawn in a fixed order: page content (which fills the region
//! map), then target re-location, then the tour chrome on top, then any open
//! overlay. The resulting hit areas are returned so mouse input can be routed
//! against exactly what is on screen.

mod header;
pub mod pages;

pub use header::{HeaderRenderer, NAV_SELECTOR};

use crate::app::{AppState, Route};
use crate::components::callout::{Callout, CalloutContent, CalloutLayout};
use crate::components::keybindings::KeybindingContext;
use crate::components::slides::{SlideDeck, SlideLayout};
use crate::components::spotlight::{Spotlight, SpotlightLayout, pulse_phase};
use crate::components::tour_menu;
use crate::config::EngineConfig;
use crate::engine::controller::TourEngine;
use crate::engine::locator::RegionMap;
use crate::geometry::Size;
use crate::theme::UiConstants;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
};
use std::time::Duration;

/// Hit areas of the last drawn frame
#[derive(Debug, Clone, Default)]
pub struct FrameLayout {
    pub tabs: Vec<(Rect, Route)>,
    pub body: Rect,
    pub spotlight: Option<SpotlightLayout>,
    pub callout: Option<CalloutLayout>,
    pub slide: Option<SlideLayout>,
}

/// Height of the scrollable page body for a terminal `height` rows tall
pub fn body_height(height: u16) -> u16 {
    height.saturating_sub(UiConstants::HEADER_HEIGHT + UiConstants::NAV_BAR_HEIGHT)
}

/// Frame renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct UiRenderer {
    header: HeaderRenderer,
}

impl UiRenderer {
    pub fn new() -> Self {
        Self {
            header: HeaderRenderer::new(),
        }
    }

    /// Draw one frame
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        f: &mut Frame,
        state: &AppState,
        engine: &mut TourEngine,
        keybindings: &KeybindingContext,
        regions: &mut RegionMap,
        config: &EngineConfig,
        elapsed: Duration,
    ) -> FrameLayout {
        let area = f.area();
        let [header_area, body, nav_area] = Layout::vertical([
            Constraint::Length(UiConstants::HEADER_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(UiConstants::NAV_BAR_HEIGHT),
        ])
        .areas(area);

        regions.clear();
        let tabs = self.header.render_header(f, header_area, state.route, regions);
        pages::render_page(f, body, state.route, state.scroll(), regions);

        let mut layout = FrameLayout {
            tabs,
            body,
            ..FrameLayout::default()
        };

        engine.sync_target(&*regions);
        if let Some(view) = engine.step_view() {
            if view.step.is_tooltip() {
                let viewport = Size::from(area);
                layout.spotlight =
                    SpotlightLayout::compute(view.target, viewport, config.spotlight_padding);
                if let Some(spotlight) = layout.spotlight {
                    let phase = pulse_phase(elapsed, config.pulse_period());
                    f.render_widget(Spotlight::new(spotlight).phase(phase), area);
                }

                let content = CalloutContent::from_view(&view, config.callout_max_width);
                let position = view.place(content.size(), viewport, engine.placement());
                layout.callout = CalloutLayout::compute(&content, position, view.target, viewport);
                if let Some(callout) = &layout.callout {
                    f.render_widget(Callout::new(&content, callout), area);
                }
            } else {
                let slide = SlideLayout::compute(&view, area);
                f.render_widget(SlideDeck::new(&view, &slide), area);
                layout.slide = Some(slide);
            }
        }

        let context = state.input_context(engine.wants_keys());
        self.header.render_nav_bar(
            f,
            nav_area,
            &keybindings.get_nav_items(context),
            &state.status_message,
        );

        if let Some(menu) = &state.tour_menu {
            menu.render(f, area, &tour_menu::entries(engine));
        }
        if let Some(help) = &state.help {
            help.render(f, area);
        }

        layout
    }
}
