//! Guidepost Library
//!
//! A guided-tour and onboarding engine: flows of tooltip or slide steps,
//! a pure tour state machine, a route-driven trigger policy, target
//! location and callout placement, plus the ratatui widgets and terminal
//! console that host it.

pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod flows;
pub mod geometry;
pub mod theme;
pub mod types;
pub mod ui;

// Re-export main types for convenience
pub use config::{EngineConfig, FirstLaunchConfig};
pub use engine::controller::{EngineTimer, TourEngine};
pub use engine::listeners::{ListenerArena, ListenerKind};
pub use engine::locator::{Located, RegionMap, TargetLocator};
pub use engine::machine::{FlowEnd, Rejection, SkipPolicy, TourCommand, TourState, Transition};
pub use engine::placement::{PlacementConfig, TooltipPosition};
pub use engine::storage::{CompletionStore, JsonFileStore, MemoryStore};
pub use engine::view::{CalloutAction, StepView};
pub use error::{GuidepostError, Result};
pub use flows::{Flow, FlowRegistry, Step};
pub use geometry::{Size, TargetRect};
pub use types::{ArrowSide, FlowKind, Side};
