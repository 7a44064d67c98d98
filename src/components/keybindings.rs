//! Keybinding system for context-aware keyboard shortcuts
//!
//! Provides a registry of keybindings that change with the input context:
//! browsing a page, driving a visible tour, the tour menu, or the help overlay.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use strum::Display;

/// Who receives key input right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum InputContext {
    /// Browsing a page with no visible tour
    Page,
    /// A tour step is visible and listening for keys
    Tour,
    /// The tour menu is open
    Menu,
    /// The help overlay is open
    Help,
}

/// Actions that can be triggered by keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    NavigateUp,
    NavigateDown,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    NextPage,
    PrevPage,
    Select,
    Back,
    Quit,
    Help,
    OpenTourMenu,
    TourNext,
    TourPrev,
    TourSkip,
    /// Jump to a step, zero-based
    TourJump(usize),
    Dismiss,
    ResetCompleted,
    ResumeTour,
    EndTour,
}

/// A keybinding definition
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: KeyAction,
    pub display: String,
    pub description: String,
}

impl Keybinding {
    /// Create a new keybinding with no modifiers
    pub fn new(key: KeyCode, action: KeyAction, display: &str, description: &str) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    /// Create a keybinding with modifiers
    pub fn with_modifiers(
        key: KeyCode,
        modifiers: KeyModifiers,
        action: KeyAction,
        display: &str,
        description: &str,
    ) -> Self {
        Self {
            key,
            modifiers,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    fn matches(&self, event: &KeyEvent) -> bool {
        // Shift is implied by the character itself (e.g. '?')
        let modifiers = event.modifiers.difference(KeyModifiers::SHIFT);
        self.key == event.code && self.modifiers.difference(KeyModifiers::SHIFT) == modifiers
    }
}

/// Context-aware keybinding registry
pub struct KeybindingContext {
    /// Context-specific keybindings
    context_bindings: HashMap<InputContext, Vec<Keybinding>>,
    /// Global keybindings (available in every context except Help)
    global_bindings: Vec<Keybinding>,
}

impl Default for KeybindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl KeybindingContext {
    /// Create a new keybinding context with default bindings
    pub fn new() -> Self {
        let mut ctx = Self {
            context_bindings: HashMap::new(),
            global_bindings: Vec::new(),
        };
        ctx.register_defaults();
        ctx
    }

    /// Register default keybindings for all contexts
    fn register_defaults(&mut self) {
        self.global_bindings = vec![
            Keybinding::new(KeyCode::Char('?'), KeyAction::Help, "?", "Help"),
            Keybinding::new(KeyCode::Char('q'), KeyAction::Quit, "Q", "Quit"),
            Keybinding::with_modifiers(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
                KeyAction::Quit,
                "Ctrl+C",
                "Quit",
            ),
        ];

        // Page
        self.context_bindings.insert(
            InputContext::Page,
            vec![
                Keybinding::new(KeyCode::Up, KeyAction::ScrollUp, "Up", "Scroll up"),
                Keybinding::new(KeyCode::Down, KeyAction::ScrollDown, "Down", "Scroll down"),
                Keybinding::new(KeyCode::PageUp, KeyAction::PageUp, "PgUp", "Page up"),
                Keybinding::new(KeyCode::PageDown, KeyAction::PageDown, "PgDn", "Page down"),
                Keybinding::new(KeyCode::Tab, KeyAction::NextPage, "Tab", "Next page"),
                Keybinding::with_modifiers(
                    KeyCode::BackTab,
                    KeyModifiers::SHIFT,
                    KeyAction::PrevPage,
                    "S-Tab",
                    "Previous page",
                ),
                Keybinding::new(KeyCode::Enter, KeyAction::Select, "Enter", "Sign in / open"),
                Keybinding::new(KeyCode::Char('t'), KeyAction::OpenTourMenu, "T", "Tours"),
            ],
        );

        // Tour
        self.context_bindings.insert(
            InputContext::Tour,
            vec![
                Keybinding::new(KeyCode::Right, KeyAction::TourNext, "Right", "Next step"),
                Keybinding::new(KeyCode::Enter, KeyAction::TourNext, "Enter", "Next step"),
                Keybinding::new(KeyCode::Char('l'), KeyAction::TourNext, "L", "Next step"),
                Keybinding::new(KeyCode::Left, KeyAction::TourPrev, "Left", "Previous step"),
                Keybinding::new(KeyCode::Char('h'), KeyAction::TourPrev, "H", "Previous step"),
                Keybinding::new(KeyCode::Char('1'), KeyAction::TourJump(0), "1-9", "Jump to step"),
                Keybinding::new(KeyCode::Char('s'), KeyAction::TourSkip, "S", "Skip tour"),
                Keybinding::new(KeyCode::Esc, KeyAction::Dismiss, "Esc", "Dismiss"),
                Keybinding::new(KeyCode::Up, KeyAction::ScrollUp, "Up", "Scroll page up"),
                Keybinding::new(KeyCode::Down, KeyAction::ScrollDown, "Down", "Scroll page down"),
            ],
        );

        // Tour menu
        self.context_bindings.insert(
            InputContext::Menu,
            vec![
                Keybinding::new(KeyCode::Up, KeyAction::NavigateUp, "Up", "Navigate up"),
                Keybinding::new(KeyCode::Down, KeyAction::NavigateDown, "Down", "Navigate down"),
                Keybinding::new(KeyCode::Enter, KeyAction::Select, "Enter", "Start tour"),
                Keybinding::new(
                    KeyCode::Char('v'),
                    KeyAction::ResumeTour,
                    "V",
                    "Resume hidden tour",
                ),
                Keybinding::new(KeyCode::Char('x'), KeyAction::EndTour, "X", "End active tour"),
                Keybinding::new(
                    KeyCode::Char('r'),
                    KeyAction::ResetCompleted,
                    "R",
                    "Reset completion",
                ),
                Keybinding::new(KeyCode::Esc, KeyAction::Back, "Esc", "Close menu"),
            ],
        );

        // Help
        self.context_bindings.insert(
            InputContext::Help,
            vec![
                Keybinding::new(KeyCode::Esc, KeyAction::Back, "Esc", "Close help"),
                Keybinding::new(KeyCode::Char('?'), KeyAction::Back, "?", "Close help"),
            ],
        );
    }

    /// Get keybindings for a context (includes global bindings)
    pub fn get_bindings(&self, context: InputContext) -> Vec<&Keybinding> {
        let mut bindings: Vec<&Keybinding> = Vec::new();

        if let Some(context_bindings) = self.context_bindings.get(&context) {
            bindings.extend(context_bindings.iter());
        }

        if context != InputContext::Help {
            bindings.extend(self.global_bindings.iter());
        }

        bindings
    }

    /// Resolve a key event to an action in `context`
    pub fn resolve(&self, context: InputContext, event: &KeyEvent) -> Option<KeyAction> {
        if context == InputContext::Tour
            && let KeyCode::Char(c @ '1'..='9') = event.code
        {
            let digit = c.to_digit(10).map_or(1, |d| d as usize);
            return Some(KeyAction::TourJump(digit - 1));
        }
        self.get_bindings(context)
            .into_iter()
            .find(|b| b.matches(event))
            .map(|b| b.action)
    }

    /// Get navigation bar items for display
    pub fn get_nav_items(&self, context: InputContext) -> Vec<NavBarItem> {
        let bindings = self.get_bindings(context);

        let priority_actions = match context {
            InputContext::Page => vec![
                KeyAction::ScrollUp,
                KeyAction::NextPage,
                KeyAction::OpenTourMenu,
                KeyAction::Help,
                KeyAction::Quit,
            ],
            InputContext::Tour => vec![
                KeyAction::TourPrev,
                KeyAction::TourNext,
                KeyAction::TourJump(0),
                KeyAction::TourSkip,
                KeyAction::Dismiss,
            ],
            InputContext::Menu => vec![
                KeyAction::NavigateUp,
                KeyAction::Select,
                KeyAction::ResumeTour,
                KeyAction::EndTour,
                KeyAction::ResetCompleted,
                KeyAction::Back,
            ],
            InputContext::Help => vec![KeyAction::Back],
        };

        let mut items: Vec<NavBarItem> = Vec::new();
        for action in priority_actions {
            let combined = match action {
                KeyAction::NavigateUp => Some(("Up/Dn", "Navigate")),
                KeyAction::ScrollUp => Some(("Up/Dn", "Scroll")),
                _ => None,
            };
            if let Some((key, label)) = combined {
                items.push(NavBarItem {
                    key_display: key.to_string(),
                    action_label: label.to_string(),
                });
            } else if let Some(binding) = bindings.iter().find(|b| b.action == action) {
                items.push(NavBarItem {
                    key_display: binding.display.clone(),
                    action_label: binding.description.clone(),
                });
            }
        }

        items
    }

    /// Get full help content for a context (for the help overlay)
    pub fn get_help_content(&self, context: InputContext) -> Vec<HelpSection> {
        let groups: [(&str, fn(&KeyAction) -> bool); 3] = [
            ("Navigation", |a| {
                matches!(
                    a,
                    KeyAction::NavigateUp
                        | KeyAction::NavigateDown
                        | KeyAction::ScrollUp
                        | KeyAction::ScrollDown
                        | KeyAction::PageUp
                        | KeyAction::PageDown
                        | KeyAction::NextPage
                        | KeyAction::PrevPage
                )
            }),
            ("Tour", |a| {
                matches!(
                    a,
                    KeyAction::TourNext
                        | KeyAction::TourPrev
                        | KeyAction::TourJump(_)
                        | KeyAction::TourSkip
                        | KeyAction::Dismiss
                        | KeyAction::OpenTourMenu
                        | KeyAction::ResumeTour
                        | KeyAction::EndTour
                        | KeyAction::ResetCompleted
                        | KeyAction::Select
                )
            }),
            ("General", |a| {
                matches!(a, KeyAction::Back | KeyAction::Help | KeyAction::Quit)
            }),
        ];

        let bindings = self.get_bindings(context);
        groups
            .iter()
            .filter_map(|(title, member)| {
                let items: Vec<(String, String)> = bindings
                    .iter()
                    .filter(|b| member(&b.action))
                    .map(|b| (b.display.clone(), b.description.clone()))
                    .collect();
                (!items.is_empty()).then(|| HelpSection {
                    title: (*title).to_string(),
                    items,
                })
            })
            .collect()
    }
}

/// Navigation bar item for display
#[derive(Debug, Clone)]
pub struct NavBarItem {
    pub key_display: String,
    pub action_label: String,
}

/// Help section for the help overlay
#[derive(Debug, Clone)]
pub struct HelpSection {
    pub title: String,
    pub items: Vec<(String, String)>,
}
