//! Application host
//!
//! Owns the tour engine and drives it from terminal events: key presses are
//! resolved per input context, mouse clicks are routed against the hit areas
//! of the last frame, scrolling and resizing become geometry events, and the
//! engine's timers are advanced on every loop iteration.

mod state;

pub use state::{AppState, Route};

use crate::components::help_overlay::HelpOverlay;
use crate::components::keybindings::{InputContext, KeyAction, KeybindingContext};
use crate::components::spotlight::SpotlightHit;
use crate::components::tour_menu::{MenuOutcome, TourMenuState};
use crate::config::EngineConfig;
use crate::engine::controller::TourEngine;
use crate::engine::listeners::ListenerKind;
use crate::engine::locator::RegionMap;
use crate::engine::machine::Transition;
use crate::engine::view::CalloutAction;
use crate::error::{GuidepostError, Result};
use crate::theme::UiConstants;
use crate::ui::{self, FrameLayout, UiRenderer, pages};
use crossterm::event::{
    self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Frame, Terminal, backend::Backend, layout::Rect};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Redraw interval while idle; keeps the highlight pulse moving
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Main application
pub struct App {
    state: AppState,
    engine: TourEngine,
    config: EngineConfig,
    keybindings: KeybindingContext,
    ui: UiRenderer,
    regions: RegionMap,
    layout: FrameLayout,
    viewport: Rect,
    started: Instant,
}

impl App {
    pub fn new(engine: TourEngine, config: EngineConfig) -> Self {
        Self {
            state: AppState::new(Route::Landing),
            engine,
            config,
            keybindings: KeybindingContext::new(),
            ui: UiRenderer::new(),
            regions: RegionMap::new(),
            layout: FrameLayout::default(),
            viewport: Rect::default(),
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn engine(&self) -> &TourEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TourEngine {
        &mut self.engine
    }

    /// Hit areas of the last drawn frame
    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    /// Announce the initial route to the engine
    pub fn start(&mut self, now: Instant) {
        let route = self.state.route;
        self.engine.on_route_change(route.path(), now);
    }

    /// Run the main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("Starting main application loop");
        self.start(Instant::now());

        loop {
            self.tick(Instant::now());
            terminal
                .draw(|f| self.render(f))
                .map_err(|e| terminal_error("draw frame", e))?;
            if self.state.should_quit {
                break;
            }

            let timeout = self.poll_timeout(Instant::now());
            if event::poll(timeout).map_err(|e| terminal_error("poll input", e))? {
                let now = Instant::now();
                match event::read().map_err(|e| terminal_error("read input", e))? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, now),
                    Event::Mouse(mouse) => self.handle_mouse(mouse, now),
                    Event::Resize(width, height) => self.handle_resize(width, height, now),
                    _ => {}
                }
            }
        }

        self.engine.shutdown();
        info!("Main application loop finished");
        Ok(())
    }

    /// Draw one frame and remember its hit areas
    pub fn render(&mut self, f: &mut Frame) {
        self.viewport = f.area();
        self.layout = self.ui.render(
            f,
            &self.state,
            &mut self.engine,
            &self.keybindings,
            &mut self.regions,
            &self.config,
            self.started.elapsed(),
        );
    }

    /// Advance engine timers
    pub fn tick(&mut self, now: Instant) {
        for transition in self.engine.tick(now) {
            if let Transition::Started { flow_id } = transition {
                self.state.set_status(format!("Tour: {}", flow_id));
            }
        }
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        self.engine
            .next_deadline()
            .map_or(FRAME_INTERVAL, |deadline| {
                deadline.saturating_duration_since(now).min(FRAME_INTERVAL)
            })
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let context = self.state.input_context(self.engine.wants_keys());
        let Some(action) = self.keybindings.resolve(context, &key) else {
            return;
        };
        debug!("Key {:?} -> {:?} in {}", key.code, action, context);

        match action {
            KeyAction::Quit => {
                self.state.should_quit = true;
                return;
            }
            KeyAction::Help if context != InputContext::Help => {
                self.state.help = Some(HelpOverlay::new(context, &self.keybindings));
                return;
            }
            _ => {}
        }

        match context {
            InputContext::Help => {
                if action == KeyAction::Back {
                    self.state.help = None;
                }
            }
            InputContext::Menu => self.handle_menu_action(action),
            InputContext::Tour => self.handle_tour_action(action, now),
            InputContext::Page => self.handle_page_action(action, now),
        }
    }

    fn handle_page_action(&mut self, action: KeyAction, now: Instant) {
        match action {
            KeyAction::ScrollUp => self.scroll(-1, now),
            KeyAction::ScrollDown => self.scroll(1, now),
            KeyAction::PageUp => self.scroll(-i32::from(UiConstants::PAGE_SCROLL_SIZE), now),
            KeyAction::PageDown => self.scroll(i32::from(UiConstants::PAGE_SCROLL_SIZE), now),
            KeyAction::NextPage => self.navigate(self.state.route.next(), now),
            KeyAction::PrevPage => self.navigate(self.state.route.prev(), now),
            KeyAction::Select => match self.state.route {
                Route::Landing => self.navigate(Route::Login, now),
                Route::Login => self.navigate(Route::Dashboard, now),
                _ => {}
            },
            KeyAction::OpenTourMenu => self.state.tour_menu = Some(TourMenuState::default()),
            _ => {}
        }
    }

    fn handle_tour_action(&mut self, action: KeyAction, now: Instant) {
        let transition = match action {
            KeyAction::TourNext => self.engine.next_step(),
            KeyAction::TourPrev => self.engine.prev_step(),
            KeyAction::TourSkip => self.engine.skip_flow(),
            KeyAction::TourJump(index) => self.engine.jump_to_step(index),
            KeyAction::Dismiss => self.engine.dismiss(),
            KeyAction::ScrollUp => return self.scroll(-1, now),
            KeyAction::ScrollDown => return self.scroll(1, now),
            _ => return,
        };
        self.report(&transition);
    }

    fn handle_menu_action(&mut self, action: KeyAction) {
        let Some(menu) = self.state.tour_menu.as_mut() else {
            return;
        };
        match menu.handle(action, &mut self.engine) {
            MenuOutcome::Stay => {}
            MenuOutcome::Message(message) => self.state.set_status(message),
            MenuOutcome::Close(message) => {
                self.state.tour_menu = None;
                if let Some(message) = message {
                    self.state.set_status(message);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Mouse
    // ------------------------------------------------------------------

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        match mouse.kind {
            MouseEventKind::ScrollUp if self.state.tour_menu.is_none() => self.scroll(-1, now),
            MouseEventKind::ScrollDown if self.state.tour_menu.is_none() => self.scroll(1, now),
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_click(mouse.column, mouse.row, now)
            }
            _ => {}
        }
    }

    /// Route a click through the layers of the last frame, topmost first
    fn handle_click(&mut self, col: u16, row: u16, now: Instant) {
        if self.state.help.is_some() {
            self.state.help = None;
            return;
        }
        if self.state.tour_menu.is_some() {
            return;
        }

        if let Some(callout) = &self.layout.callout {
            if let Some(action) = callout.button_at(col, row) {
                self.apply_callout_action(action);
                return;
            }
            if callout.contains(col, row) {
                return;
            }
        }

        if let Some(slide) = &self.layout.slide {
            if let Some(index) = slide.dot_at(col, row) {
                let transition = self.engine.jump_to_step(index);
                self.report(&transition);
            } else if let Some(action) = slide.button_at(col, row) {
                self.apply_callout_action(action);
            }
            return;
        }

        if let Some(spotlight) = &self.layout.spotlight {
            match spotlight.hit(col, row) {
                SpotlightHit::Dimmed => {
                    let transition = self.engine.dismiss();
                    self.report(&transition);
                    return;
                }
                SpotlightHit::Outside => return,
                SpotlightHit::Hole => {}
            }
        }

        if let Some(&(_, route)) = self
            .layout
            .tabs
            .iter()
            .find(|(rect, _)| rect.contains((col, row).into()))
        {
            self.navigate(route, now);
        }
    }

    fn apply_callout_action(&mut self, action: CalloutAction) {
        let transition = match action {
            CalloutAction::Back => self.engine.prev_step(),
            CalloutAction::Next => self.engine.next_step(),
            CalloutAction::Done => self.engine.complete_flow(),
            CalloutAction::Skip => self.engine.skip_flow(),
            CalloutAction::Close => self.engine.hide_tooltip(),
        };
        self.report(&transition);
    }

    // ------------------------------------------------------------------
    // Page and viewport
    // ------------------------------------------------------------------

    /// Switch pages and let the engine consider auto-starting a tour
    pub fn navigate(&mut self, route: Route, now: Instant) {
        if route == self.state.route {
            return;
        }
        info!("Navigating to {}", route);
        self.state.route = route;
        self.state.set_status("");
        if let Some(flow_id) = self.engine.on_route_change(route.path(), now) {
            debug!("Tour {} will start once the page settles", flow_id);
        }
    }

    fn scroll(&mut self, delta: i32, now: Instant) {
        let max = pages::max_scroll(self.state.route, ui::body_height(self.viewport.height));
        if self.state.scroll_by(delta, max) {
            self.engine.on_geometry_event(ListenerKind::Scroll, now);
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16, now: Instant) {
        self.viewport = Rect::new(0, 0, width, height);
        let max = pages::max_scroll(self.state.route, ui::body_height(height));
        self.state.clamp_scroll(max);
        self.engine.on_geometry_event(ListenerKind::Resize, now);
    }

    fn report(&mut self, transition: &Transition) {
        match transition {
            Transition::Ignored(reason) => debug!("Tour input ignored: {}", reason),
            Transition::Finished { flow_id, .. } => {
                self.state.set_status(format!("Finished {}", flow_id));
            }
            _ => {}
        }
    }
}

fn terminal_error(action: &str, e: std::io::Error) -> GuidepostError {
    GuidepostError::terminal(format!("failed to {}: {}", action, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::locator::TargetLocator;
    use crate::engine::storage::MemoryStore;
    use crate::flows::FlowRegistry;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn app() -> App {
        let config = EngineConfig::default();
        let engine = TourEngine::new(
            Arc::new(FlowRegistry::builtin()),
            Box::new(MemoryStore::new()),
            &config,
        );
        App::new(engine, config)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn draw(app: &mut App, height: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(100, height)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
    }

    #[test]
    fn test_enter_walks_from_landing_to_dashboard() {
        let mut app = app();
        let now = Instant::now();
        app.start(now);
        app.handle_key(key(KeyCode::Enter), now);
        assert_eq!(app.state().route, Route::Login);
        app.handle_key(key(KeyCode::Enter), now);
        assert_eq!(app.state().route, Route::Dashboard);
        assert_eq!(app.engine().route(), Some("/dashboard"));
    }

    #[test]
    fn test_first_launch_tour_starts_after_settle() {
        let mut app = app();
        let now = Instant::now();
        app.start(now);
        app.navigate(Route::Dashboard, now);
        app.tick(now);
        assert!(app.engine().state().is_idle());

        app.tick(now + Duration::from_secs(1));
        assert_eq!(app.engine().state().active_flow_id(), Some("welcome"));
        assert_eq!(app.state().status_message, "Tour: welcome");
    }

    #[test]
    fn test_tour_keys_only_when_visible() {
        let mut app = app();
        let now = Instant::now();
        app.navigate(Route::Dashboard, now);
        app.engine_mut().start_flow("dashboard-tour");
        app.handle_key(key(KeyCode::Right), now);
        assert_eq!(app.engine().state().current_step_index(), 1);

        app.handle_key(key(KeyCode::Esc), now);
        assert!(app.engine().state().is_idle());
        app.handle_key(key(KeyCode::Tab), now);
        assert_eq!(app.state().route, Route::Fleet);
    }

    #[test]
    fn test_menu_captures_keys() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('t')), now);
        assert!(app.state().tour_menu.is_some());
        app.handle_key(key(KeyCode::Enter), now);
        assert!(app.state().tour_menu.is_none());
        assert!(app.engine().state().active().is_some());
    }

    #[test]
    fn test_click_on_next_button_advances() {
        let mut app = app();
        let now = Instant::now();
        app.navigate(Route::Dashboard, now);
        app.engine_mut().start_flow("dashboard-tour");
        draw(&mut app, 30);

        let callout = app.layout().callout.clone().unwrap();
        let (rect, _) = *callout
            .buttons()
            .iter()
            .find(|(_, a)| *a == CalloutAction::Next)
            .unwrap();
        app.handle_mouse(
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: rect.x,
                row: rect.y,
                modifiers: KeyModifiers::NONE,
            },
            now,
        );
        assert_eq!(app.engine().state().current_step_index(), 1);
    }

    #[test]
    fn test_click_on_dimmed_area_dismisses() {
        let mut app = app();
        let now = Instant::now();
        app.navigate(Route::Dashboard, now);
        app.engine_mut().start_flow("dashboard-tour");
        draw(&mut app, 30);
        assert!(app.layout().spotlight.is_some());

        app.handle_mouse(
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: 99,
                row: 28,
                modifiers: KeyModifiers::NONE,
            },
            now,
        );
        assert!(app.engine().state().is_idle());
    }

    #[test]
    fn test_tab_click_mid_tour_relocates_target() {
        let mut app = app();
        let now = Instant::now();
        app.navigate(Route::Dashboard, now);
        app.engine_mut().start_flow("fleet-tour");
        draw(&mut app, 30);
        assert!(app.layout().spotlight.is_none());

        let (tab, _) = *app
            .layout()
            .tabs
            .iter()
            .find(|(_, route)| *route == Route::Fleet)
            .unwrap();
        app.handle_mouse(
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: tab.x,
                row: tab.y,
                modifiers: KeyModifiers::NONE,
            },
            now,
        );
        assert_eq!(app.state().route, Route::Fleet);
        assert_eq!(app.engine().state().active_flow_id(), Some("fleet-tour"));

        draw(&mut app, 30);
        let spotlight = app.layout().spotlight.expect("fleet table is on screen");
        let table = app.regions().locate("#fleet-table").rect().unwrap();
        assert_eq!(spotlight.hole(), table.expand(1));
    }

    #[test]
    fn test_scroll_schedules_relocation() {
        let mut app = app();
        let now = Instant::now();
        app.navigate(Route::Finance, now);
        app.engine_mut().start_flow("finance-tour");
        draw(&mut app, 20);
        app.handle_key(key(KeyCode::Down), now);
        assert_eq!(app.state().scroll(), 1);
        assert!(app.engine().next_deadline().is_some());
    }

    #[test]
    fn test_terminal_failures_map_to_terminal_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = terminal_error("draw frame", io);
        assert!(matches!(err, GuidepostError::Terminal(_)));
        assert_eq!(err.to_string(), "Terminal error: failed to draw frame: pipe closed");
    }
}
