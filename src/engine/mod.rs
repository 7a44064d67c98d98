//! Engine modules: the tour logic behind the rendered chrome.
//!
//! The engine layer sits between the flow catalog (what tours exist) and the
//! host UI (what is on screen). Pure parts (placement, state machine) take
//! plain values; host capabilities (locating targets, persisting completion)
//! come in through traits.
//!
//! # Modules
//!
//! - `placement` - viewport-safe callout positioning
//! - `machine` - the tour state machine reducer
//! - `locator` - target lookup and per-step target tracking
//! - `storage` - persisted completion state
//! - `scheduler` - cancellable timer deferrals
//! - `listeners` - scoped scroll/resize/key listener registration
//! - `trigger` - route-driven auto-start policy
//! - `view` - per-step data handed to renderers
//! - `controller` - the state owner wiring all of the above

pub mod controller;
pub mod listeners;
pub mod locator;
pub mod machine;
pub mod placement;
pub mod scheduler;
pub mod storage;
pub mod trigger;
pub mod view;
