//! Centralized theme and styling for the console and tour chrome
//!
//! Single source of truth for colors and styles. Pages use the base and
//! accent palette; the spotlight, callouts and slides use the tour palette.
//!
//! # Usage
//! ```rust
//! use guidepost::theme::{Colors, Styles, Theme};
//! use ratatui::style::Style;
//!
//! let style = Style::default().fg(Colors::PRIMARY);
//! let title_style = Styles::title();
//! let ring = Theme::ring_style(0.25);
//! ```

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette for the application
pub struct Colors;

impl Colors {
    // -------------------------------------------------------------------------
    // Base Colors (backgrounds, foregrounds)
    // -------------------------------------------------------------------------

    /// Primary dark background - used for pages and panels
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    /// Alternative dark background - header and status bar
    pub const BG_SECONDARY: Color = Color::Rgb(30, 30, 40);

    /// Default foreground text color
    pub const FG_PRIMARY: Color = Color::White;

    /// Secondary/muted text color
    pub const FG_SECONDARY: Color = Color::Gray;

    /// Disabled/inactive text color
    pub const FG_MUTED: Color = Color::DarkGray;

    // -------------------------------------------------------------------------
    // Accent Colors
    // -------------------------------------------------------------------------

    /// Primary accent color - borders, titles, highlights
    pub const PRIMARY: Color = Color::Cyan;

    /// Secondary accent color - selected items, emphasis
    pub const SECONDARY: Color = Color::Yellow;

    // -------------------------------------------------------------------------
    // Semantic Colors
    // -------------------------------------------------------------------------

    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;
    pub const INFO: Color = Color::Blue;

    // -------------------------------------------------------------------------
    // UI Element Colors
    // -------------------------------------------------------------------------

    pub const BORDER_ACTIVE: Color = Color::Cyan;
    pub const BORDER_INACTIVE: Color = Color::DarkGray;

    /// Selected item highlight
    pub const SELECTED_BG: Color = Color::Yellow;

    /// Selected item text (for contrast on yellow bg)
    pub const SELECTED_FG: Color = Color::Black;

    pub const NAV_HINT: Color = Color::DarkGray;

    // -------------------------------------------------------------------------
    // Tour Colors
    // -------------------------------------------------------------------------

    /// Background painted over everything outside the spotlight hole
    pub const DIM_BG: Color = Color::Rgb(8, 8, 12);

    /// Foreground of dimmed page text
    pub const DIM_FG: Color = Color::Rgb(70, 70, 80);

    /// Highlight ring at the peak of its pulse
    pub const RING_BRIGHT: Color = Color::Rgb(255, 214, 90);

    /// Highlight ring at the trough of its pulse
    pub const RING_SOFT: Color = Color::Rgb(140, 110, 40);

    pub const CALLOUT_BG: Color = Color::Rgb(36, 40, 56);
    pub const CALLOUT_BORDER: Color = Color::Cyan;

    /// Current step dot
    pub const DOT_ACTIVE: Color = Color::Cyan;

    /// Other step dots
    pub const DOT_INACTIVE: Color = Color::DarkGray;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built styles for common UI patterns
pub struct Styles;

impl Styles {
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn text_secondary() -> Style {
        Style::default().fg(Colors::FG_SECONDARY)
    }

    /// Main title style (cyan, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Section header (yellow, bold)
    pub fn header() -> Style {
        Style::default()
            .fg(Colors::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::BORDER_ACTIVE)
    }

    pub fn border_inactive() -> Style {
        Style::default().fg(Colors::BORDER_INACTIVE)
    }

    pub fn panel_bg() -> Style {
        Style::default().bg(Colors::BG_PRIMARY)
    }

    pub fn bar_bg() -> Style {
        Style::default().bg(Colors::BG_SECONDARY).fg(Colors::FG_SECONDARY)
    }

    /// Selected list item / active tab
    pub fn selected() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default().fg(Colors::SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Colors::ERROR)
    }

    pub fn nav_key() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::NAV_HINT)
    }

    // -------------------------------------------------------------------------
    // Tour Styles
    // -------------------------------------------------------------------------

    /// Cells outside the spotlight hole
    pub fn dimmed() -> Style {
        Style::default()
            .fg(Colors::DIM_FG)
            .bg(Colors::DIM_BG)
            .add_modifier(Modifier::DIM)
    }

    pub fn callout() -> Style {
        Style::default().fg(Colors::FG_PRIMARY).bg(Colors::CALLOUT_BG)
    }

    pub fn callout_border() -> Style {
        Style::default()
            .fg(Colors::CALLOUT_BORDER)
            .bg(Colors::CALLOUT_BG)
    }

    pub fn callout_title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .bg(Colors::CALLOUT_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Arrow glyph between callout and target
    pub fn arrow() -> Style {
        Style::default()
            .fg(Colors::CALLOUT_BORDER)
            .add_modifier(Modifier::BOLD)
    }

    /// Forward action (Next, Done)
    pub fn button_primary() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Secondary action (Back, Skip, Close)
    pub fn button_secondary() -> Style {
        Style::default()
            .fg(Colors::FG_SECONDARY)
            .bg(Colors::CALLOUT_BG)
    }
}

// =============================================================================
// THEME CONTEXT
// =============================================================================

/// Semantic style lookups
pub struct Theme;

impl Theme {
    /// Style of the highlight ring for a pulse phase in `[0, 1)`.
    ///
    /// Bright for the first half of the period, soft for the second.
    pub fn ring_style(phase: f32) -> Style {
        if phase < 0.5 {
            Style::default()
                .fg(Colors::RING_BRIGHT)
                .bg(Colors::DIM_BG)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Colors::RING_SOFT).bg(Colors::DIM_BG)
        }
    }

    /// Progress dot style
    pub fn dot_style(active: bool) -> Style {
        if active {
            Style::default()
                .fg(Colors::DOT_ACTIVE)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Colors::DOT_INACTIVE)
        }
    }

    pub fn dot_symbol(active: bool) -> &'static str {
        if active { "●" } else { "○" }
    }
}

// =============================================================================
// UI CONSTANTS
// =============================================================================

/// UI dimension and layout constants
pub struct UiConstants;

impl UiConstants {
    /// Help overlay width percentage
    pub const OVERLAY_WIDTH_PCT: u16 = 60;

    /// Help overlay height percentage
    pub const OVERLAY_HEIGHT_PCT: u16 = 70;

    /// Header height (title row + tab row)
    pub const HEADER_HEIGHT: u16 = 3;

    /// Nav bar height
    pub const NAV_BAR_HEIGHT: u16 = 1;

    /// Rows moved by PgUp/PgDn on a page
    pub const PAGE_SCROLL_SIZE: u16 = 10;

    /// Maximum slide card width
    pub const SLIDE_MAX_WIDTH: u16 = 64;

    /// Maximum slide card height
    pub const SLIDE_MAX_HEIGHT: u16 = 18;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_style_pulses() {
        assert_ne!(Theme::ring_style(0.1), Theme::ring_style(0.9));
        assert_eq!(Theme::ring_style(0.1), Theme::ring_style(0.4));
    }

    #[test]
    fn test_dimmed_style_sets_background() {
        assert_eq!(Styles::dimmed().bg, Some(Colors::DIM_BG));
    }
}
