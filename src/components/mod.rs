//! Reusable UI components
//!
//! Tour chrome (spotlight, callout, slide deck) and host chrome (keybindings,
//! help overlay, tour menu).

pub mod callout;
pub mod help_overlay;
pub mod keybindings;
pub mod slides;
pub mod spotlight;
pub mod tour_menu;

pub use callout::{Callout, CalloutContent, CalloutLayout};
pub use help_overlay::HelpOverlay;
pub use keybindings::{InputContext, KeyAction, KeybindingContext};
pub use slides::{SlideDeck, SlideLayout};
pub use spotlight::{Spotlight, SpotlightHit, SpotlightLayout};
pub use tour_menu::{MenuOutcome, TourMenuState};
