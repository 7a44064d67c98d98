//! Application state definitions
//!
//! Route table of the host console and the per-session UI state that sits
//! around the tour engine (scroll offsets, open overlays, status line).

use crate::components::help_overlay::HelpOverlay;
use crate::components::keybindings::InputContext;
use crate::components::tour_menu::TourMenuState;
use std::collections::HashMap;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Pages of the host console, keyed by path
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, AsRefStr,
)]
pub enum Route {
    #[default]
    #[strum(serialize = "/")]
    Landing,
    #[strum(serialize = "/login")]
    Login,
    #[strum(serialize = "/dashboard")]
    Dashboard,
    #[strum(serialize = "/fleet")]
    Fleet,
    #[strum(serialize = "/hr")]
    Hr,
    #[strum(serialize = "/finance")]
    Finance,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Fleet => "/fleet",
            Self::Hr => "/hr",
            Self::Finance => "/finance",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Landing => "Welcome",
            Self::Login => "Sign in",
            Self::Dashboard => "Dashboard",
            Self::Fleet => "Fleet",
            Self::Hr => "People",
            Self::Finance => "Finance",
        }
    }

    /// Signed-in workspace pages shown as header tabs
    pub fn is_workspace(self) -> bool {
        !matches!(self, Self::Landing | Self::Login)
    }

    pub fn workspaces() -> impl Iterator<Item = Route> {
        Self::iter().filter(|r| r.is_workspace())
    }

    /// Next page in tab order. Public pages lead into the dashboard.
    pub fn next(self) -> Self {
        match self {
            Self::Landing => Self::Login,
            Self::Login => Self::Dashboard,
            Self::Dashboard => Self::Fleet,
            Self::Fleet => Self::Hr,
            Self::Hr => Self::Finance,
            Self::Finance => Self::Dashboard,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Landing => Self::Landing,
            Self::Login => Self::Landing,
            Self::Dashboard => Self::Finance,
            Self::Fleet => Self::Dashboard,
            Self::Hr => Self::Fleet,
            Self::Finance => Self::Hr,
        }
    }
}

/// Main application state
#[derive(Default)]
pub struct AppState {
    /// Current page
    pub route: Route,
    /// Vertical scroll offset per page
    scroll: HashMap<Route, u16>,
    /// Tour menu, open when `Some`
    pub tour_menu: Option<TourMenuState>,
    /// Help overlay, open when `Some`
    pub help: Option<HelpOverlay>,
    /// Status message for user feedback
    pub status_message: String,
    /// Set when the user asked to quit
    pub should_quit: bool,
}

impl AppState {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            ..Self::default()
        }
    }

    pub fn scroll(&self) -> u16 {
        self.scroll.get(&self.route).copied().unwrap_or(0)
    }

    /// Move the current page's scroll offset, clamped to `max`.
    /// Returns whether the offset changed.
    pub fn scroll_by(&mut self, delta: i32, max: u16) -> bool {
        let current = self.scroll();
        let next = (i32::from(current) + delta).clamp(0, i32::from(max));
        let next = u16::try_from(next).unwrap_or(current);
        if next == current {
            return false;
        }
        self.scroll.insert(self.route, next);
        true
    }

    /// Clamp the current offset after the viewport changed size
    pub fn clamp_scroll(&mut self, max: u16) -> bool {
        let current = self.scroll();
        if current <= max {
            return false;
        }
        self.scroll.insert(self.route, max);
        true
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    /// Input context, innermost overlay first
    pub fn input_context(&self, tour_wants_keys: bool) -> InputContext {
        if self.help.is_some() {
            InputContext::Help
        } else if self.tour_menu.is_some() {
            InputContext::Menu
        } else if tour_wants_keys {
            InputContext::Tour
        } else {
            InputContext::Page
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_route_paths_round_trip() {
        for route in Route::iter() {
            assert_eq!(Route::from_str(route.path()).ok(), Some(route));
            assert_eq!(route.to_string(), route.path());
        }
    }

    #[test]
    fn test_tab_order_stays_in_workspace() {
        let mut route = Route::Dashboard;
        for _ in 0..8 {
            route = route.next();
            assert!(route.is_workspace());
        }
        assert_eq!(Route::Landing.next().next(), Route::Dashboard);
    }

    #[test]
    fn test_scroll_is_clamped_per_page() {
        let mut state = AppState::new(Route::Fleet);
        assert!(state.scroll_by(5, 3));
        assert_eq!(state.scroll(), 3);
        assert!(!state.scroll_by(1, 3));
        state.route = Route::Hr;
        assert_eq!(state.scroll(), 0);
        assert!(!state.scroll_by(-1, 3));
    }

    #[test]
    fn test_input_context_priority() {
        let mut state = AppState::default();
        assert_eq!(state.input_context(false), InputContext::Page);
        assert_eq!(state.input_context(true), InputContext::Tour);
        state.tour_menu = Some(TourMenuState::default());
        assert_eq!(state.input_context(true), InputContext::Menu);
    }
}
