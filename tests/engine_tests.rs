//! Tests for the tour engine lifecycle
//!
//! These tests verify:
//! - Listener scopes are released on every exit path
//! - Completion state persists through a JSON file and survives restarts
//! - Storage failures degrade to memory-only without surfacing errors
//! - Dismissal hides single-step flows and skips multi-step flows
//! - A missing target yields no spotlight and a centered callout

use guidepost::config::EngineConfig;
use guidepost::engine::controller::TourEngine;
use guidepost::engine::listeners::ListenerKind;
use guidepost::engine::locator::RegionMap;
use guidepost::engine::machine::Transition;
use guidepost::engine::placement::{self, PlacementConfig};
use guidepost::engine::storage::{CompletionStore, JsonFileStore, MemoryStore};
use guidepost::error::{GuidepostError, Result};
use guidepost::flows::{Flow, FlowRegistry, Step};
use guidepost::geometry::{Size, TargetRect};
use guidepost::types::Side;
use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn registry() -> Arc<FlowRegistry> {
    Arc::new(
        FlowRegistry::new([
            Flow::new(
                "tour",
                vec![
                    Step::tooltip("a", "Alpha", "first", "#alpha", Side::Bottom),
                    Step::tooltip("b", "Beta", "second", "#beta", Side::Right),
                    Step::tooltip("c", "Gamma", "third", "#missing-el", Side::Top),
                ],
            ),
            Flow::new(
                "tip",
                vec![Step::tooltip("t", "Tip", "just one", "#alpha", Side::Left)],
            ),
            Flow::new("intro", vec![Step::slide("i", "Hi", "hello")]),
        ])
        .unwrap(),
    )
}

fn config() -> EngineConfig {
    EngineConfig {
        first_launch: None,
        ..EngineConfig::default()
    }
}

fn engine() -> TourEngine {
    TourEngine::new(registry(), Box::new(MemoryStore::new()), &config())
}

/// Store whose every operation fails
struct BrokenStore {
    saves: Rc<Cell<usize>>,
}

impl CompletionStore for BrokenStore {
    fn load(&self) -> Result<BTreeSet<String>> {
        Err(GuidepostError::storage("disk on fire"))
    }

    fn save(&mut self, _completed: &BTreeSet<String>) -> Result<()> {
        self.saves.set(self.saves.get() + 1);
        Err(GuidepostError::storage("disk on fire"))
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

// =============================================================================
// Listener lifecycle
// =============================================================================

#[test]
fn test_repeated_tours_leave_no_listeners() {
    let mut engine = engine();
    for _ in 0..5 {
        engine.start_flow("tour");
        engine.next_step();
        assert_eq!(engine.listener_count(), 3);
        engine.skip_flow();
        assert_eq!(engine.listener_count(), 0);

        engine.start_flow("tip");
        engine.complete_flow();
        assert_eq!(engine.listener_count(), 0);

        engine.start_flow("intro");
        engine.next_step();
        assert_eq!(engine.listener_count(), 0);
    }
    assert!(engine.state().is_idle());
}

#[test]
fn test_shutdown_releases_everything() {
    let mut engine = engine();
    let now = Instant::now();
    engine.start_flow("tour");
    engine.on_geometry_event(ListenerKind::Resize, now);
    assert!(engine.next_deadline().is_some());

    engine.shutdown();
    assert_eq!(engine.listener_count(), 0);
    assert_eq!(engine.next_deadline(), None);
}

#[test]
fn test_geometry_events_ignored_for_slides() {
    let mut engine = engine();
    engine.start_flow("intro");
    assert!(!engine.on_geometry_event(ListenerKind::Scroll, Instant::now()));
    assert!(!engine.on_geometry_event(ListenerKind::KeyDown, Instant::now()));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_completion_persists_across_engines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("tours.json");

    let mut first = TourEngine::new(registry(), Box::new(JsonFileStore::new(&path)), &config());
    first.start_flow("tip");
    first.complete_flow();
    drop(first);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("completedFlows"));

    let second = TourEngine::new(registry(), Box::new(JsonFileStore::new(&path)), &config());
    assert!(second.state().is_completed("tip"));
    assert!(!second.is_persistence_degraded());
}

#[test]
fn test_reset_completed_is_persisted() {
    let store = MemoryStore::with_completed(["tour", "tip"]);
    let handle = store.clone();
    let mut engine = TourEngine::new(registry(), Box::new(store), &config());
    assert_eq!(engine.state().completed_flows().len(), 2);

    engine.reset_completed();
    assert!(engine.state().completed_flows().is_empty());
    assert!(handle.snapshot().is_empty());
}

#[test]
fn test_corrupt_state_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tours.json");
    std::fs::write(&path, "{ not json").unwrap();

    let engine = TourEngine::new(registry(), Box::new(JsonFileStore::new(&path)), &config());
    assert!(engine.state().completed_flows().is_empty());
}

#[test]
fn test_save_failure_degrades_to_memory() {
    let saves = Rc::new(Cell::new(0));
    let store = BrokenStore {
        saves: Rc::clone(&saves),
    };
    let mut engine = TourEngine::new(registry(), Box::new(store), &config());

    engine.start_flow("tip");
    let t = engine.complete_flow();
    assert!(t.completed_grew());
    assert!(engine.is_persistence_degraded());
    assert!(engine.state().is_completed("tip"));
    assert_eq!(saves.get(), 1);

    // No further attempts once degraded
    engine.start_flow("tour");
    engine.skip_flow();
    assert_eq!(saves.get(), 1);
    assert!(engine.state().is_completed("tour"));
}

// =============================================================================
// Dismissal
// =============================================================================

#[test]
fn test_dismiss_hides_single_step_flow() {
    let mut engine = engine();
    engine.start_flow("tip");
    let t = engine.dismiss();
    assert_eq!(
        t,
        Transition::VisibilityChanged {
            flow_id: "tip".into(),
            visible: false,
        }
    );
    assert_eq!(engine.state().active_flow_id(), Some("tip"));
    assert!(!engine.wants_keys());
}

#[test]
fn test_dismiss_skips_multi_step_flow() {
    let mut engine = engine();
    engine.start_flow("tour");
    let t = engine.dismiss();
    assert!(matches!(t, Transition::Finished { .. }));
    assert!(engine.state().is_idle());
    assert!(engine.state().is_completed("tour"));
}

// =============================================================================
// Target location
// =============================================================================

#[test]
fn test_step_view_carries_located_target() {
    let mut engine = engine();
    let mut regions = RegionMap::new();
    regions.register("#alpha", TargetRect::new(2, 4, 10, 3));
    regions.register("#beta", TargetRect::new(12, 30, 8, 2));

    engine.start_flow("tour");
    let target = engine.sync_target(&regions);
    assert_eq!(target, Some(TargetRect::new(2, 4, 10, 3)));
    let view = engine.step_view().unwrap();
    assert_eq!(view.target, target);
    assert_eq!(view.progress_label(), "1 of 3");

    engine.next_step();
    assert_eq!(engine.sync_target(&regions), Some(TargetRect::new(12, 30, 8, 2)));
}

#[test]
fn test_missing_target_falls_back_to_center() {
    let mut engine = engine();
    let locator = |selector: &str| (selector == "#alpha").then(|| TargetRect::new(0, 0, 5, 1));
    engine.start_flow("tour");
    engine.jump_to_step(2);

    assert_eq!(engine.sync_target(&locator), None);
    let view = engine.step_view().unwrap();
    assert!(view.target.is_none());

    let viewport = Size::new(80, 24);
    let config = PlacementConfig::default();
    let position = view.place(Size::new(20, 8), viewport, &config);
    assert_eq!(position.arrow, None);
    assert_eq!(position, placement::center_in_viewport(Size::new(20, 8), viewport, &config));
    assert_eq!((position.left, position.top), (30, 8));
}

#[test]
fn test_route_change_relocates_target() {
    let mut engine = engine();
    engine.start_flow("tour");
    assert_eq!(engine.sync_target(&RegionMap::new()), None);

    // The target appears on the page the host navigated to
    let mut next_page = RegionMap::new();
    next_page.register("#alpha", TargetRect::new(3, 0, 72, 11));
    engine.on_route_change("/fleet", Instant::now());
    assert_eq!(engine.sync_target(&next_page), Some(TargetRect::new(3, 0, 72, 11)));
    assert_eq!(
        engine.step_view().unwrap().target,
        Some(TargetRect::new(3, 0, 72, 11))
    );
}

#[test]
fn test_relocation_waits_for_debounce() {
    let mut engine = engine();
    let mut regions = RegionMap::new();
    regions.register("#alpha", TargetRect::new(10, 4, 10, 3));
    engine.start_flow("tour");
    engine.sync_target(&regions);

    // The page scrolled; until the debounce fires the cached rect is kept
    let mut scrolled = RegionMap::new();
    scrolled.register("#alpha", TargetRect::new(6, 4, 10, 3));
    let t0 = Instant::now();
    engine.on_geometry_event(ListenerKind::Scroll, t0);
    assert_eq!(engine.sync_target(&scrolled), Some(TargetRect::new(10, 4, 10, 3)));

    engine.tick(t0 + Duration::from_millis(50));
    assert_eq!(engine.sync_target(&scrolled), Some(TargetRect::new(6, 4, 10, 3)));
}
