//! Tour Engine
//!
//! The state owner. The host constructs one `TourEngine` at startup, feeds it
//! user commands, route changes, geometry events and clock ticks, and asks it
//! what to draw. It wires the state machine to the trigger policy, the target
//! tracker, the completion store and the listener arena.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──▶ [dispatch / on_route_change / on_geometry_event / tick]* ──▶ shutdown()
//! ```
//!
//! Every command is applied synchronously. Before any transition that returns
//! the machine to idle, pending timers are cancelled and every listener scope
//! is released, so nothing outlives the flow that acquired it.

use super::listeners::{ListenerArena, ListenerKind, ListenerScope};
use super::locator::{TargetLocator, TargetTracker};
use super::machine::{SkipPolicy, TourCommand, TourState, Transition};
use super::placement::PlacementConfig;
use super::scheduler::{Scheduler, TimerId};
use super::storage::CompletionStore;
use super::trigger::{FirstLaunchRule, PendingTrigger, TriggerPolicy};
use super::view::StepView;
use crate::config::EngineConfig;
use crate::flows::FlowRegistry;
use crate::geometry::TargetRect;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Deferred work owned by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineTimer {
    /// Settle delay elapsed for a route-triggered flow
    AutoStart(String),
    /// Debounced scroll/resize relocation
    Relocate,
}

/// Listener scope tied to one visible tooltip step
#[derive(Debug)]
struct GeometryScope {
    flow_id: String,
    step_index: usize,
    scope: ListenerScope,
}

/// Dependency-injected tour state owner
pub struct TourEngine {
    registry: Arc<FlowRegistry>,
    store: Box<dyn CompletionStore>,
    persistence_degraded: bool,
    state: TourState,
    trigger: TriggerPolicy,
    scheduler: Scheduler<EngineTimer>,
    listeners: ListenerArena,
    geometry_scope: Option<GeometryScope>,
    key_scope: Option<ListenerScope>,
    tracker: TargetTracker,
    relocate_timer: Option<TimerId>,
    relocate_debounce: Duration,
    placement: PlacementConfig,
    route: Option<String>,
}

impl TourEngine {
    /// Build an engine and hydrate completed flows from `store`
    pub fn new(
        registry: Arc<FlowRegistry>,
        store: Box<dyn CompletionStore>,
        config: &EngineConfig,
    ) -> Self {
        let completed = match store.load() {
            Ok(completed) => {
                info!(
                    "Loaded {} completed flow(s) from {}",
                    completed.len(),
                    store.describe()
                );
                completed
            }
            Err(e) => {
                warn!(
                    "Could not load completion state from {}: {}; starting empty",
                    store.describe(),
                    e
                );
                BTreeSet::new()
            }
        };

        let skip_policy = if config.skip_counts_as_completion {
            SkipPolicy::RecordCompletion
        } else {
            SkipPolicy::Forget
        };
        let first_launch = config.first_launch.as_ref().map(FirstLaunchRule::from);

        Self {
            registry,
            store,
            persistence_degraded: false,
            state: TourState::hydrated(completed, skip_policy),
            trigger: TriggerPolicy::new(config.settle_delay(), first_launch),
            scheduler: Scheduler::new(),
            listeners: ListenerArena::new(),
            geometry_scope: None,
            key_scope: None,
            tracker: TargetTracker::default(),
            relocate_timer: None,
            relocate_debounce: config.relocate_debounce(),
            placement: config.placement,
            route: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> &TourState {
        &self.state
    }

    pub fn registry(&self) -> &FlowRegistry {
        &self.registry
    }

    pub fn placement(&self) -> &PlacementConfig {
        &self.placement
    }

    /// Last route reported by the host
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn pending_trigger(&self) -> Option<&PendingTrigger> {
        self.trigger.pending()
    }

    /// True once a save failed and completion tracking went memory-only
    pub fn is_persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    /// Number of live listener registrations
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.listeners.is_listening(kind)
    }

    /// Whether key events should be routed to the tour before the page
    pub fn wants_keys(&self) -> bool {
        self.listeners.is_listening(ListenerKind::KeyDown)
    }

    /// Earliest pending timer, used to bound the host's poll timeout
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    pub fn start_flow(&mut self, flow_id: &str) -> Transition {
        self.dispatch(TourCommand::Start(flow_id.to_string()))
    }

    pub fn next_step(&mut self) -> Transition {
        self.dispatch(TourCommand::Next)
    }

    pub fn prev_step(&mut self) -> Transition {
        self.dispatch(TourCommand::Prev)
    }

    pub fn skip_flow(&mut self) -> Transition {
        self.dispatch(TourCommand::Skip)
    }

    pub fn complete_flow(&mut self) -> Transition {
        self.dispatch(TourCommand::Complete)
    }

    pub fn hide_tooltip(&mut self) -> Transition {
        self.dispatch(TourCommand::Hide)
    }

    pub fn show_tooltip(&mut self) -> Transition {
        self.dispatch(TourCommand::Show)
    }

    pub fn jump_to_step(&mut self, index: usize) -> Transition {
        self.dispatch(TourCommand::JumpTo(index))
    }

    /// Escape key or overlay click.
    ///
    /// Hides a single-step tooltip; skips a multi-step flow.
    pub fn dismiss(&mut self) -> Transition {
        self.trigger.cancel_pending(&mut self.scheduler);
        let single = self
            .state
            .active_flow_id()
            .and_then(|id| self.registry.get(id))
            .is_some_and(|flow| flow.len() == 1);
        if single {
            self.hide_tooltip()
        } else {
            self.skip_flow()
        }
    }

    /// Apply one command synchronously
    pub fn dispatch(&mut self, command: TourCommand) -> Transition {
        if self.state.would_end_flow(&self.registry, &command) {
            self.teardown();
        }
        if matches!(command, TourCommand::Start(_)) {
            self.trigger.cancel_pending(&mut self.scheduler);
        }

        let transition = self.state.apply(&self.registry, command);
        self.log_transition(&transition);
        if transition.completed_grew() {
            self.persist();
        }
        self.sync_scopes();
        transition
    }

    /// Clear the completed set and the auto-start history (support and testing)
    pub fn reset_completed(&mut self) {
        info!(
            "Resetting {} completed flow(s)",
            self.state.completed_flows().len()
        );
        self.state.reset_completed();
        self.trigger.reset_fired();
        self.persist();
    }

    // ------------------------------------------------------------------
    // Host events
    // ------------------------------------------------------------------

    /// The host navigated. Returns the flow scheduled to auto-start, if any.
    pub fn on_route_change(&mut self, route: &str, now: Instant) -> Option<String> {
        debug!("Route changed to {}", route);
        self.route = Some(route.to_string());
        // The page under the current step changed
        self.tracker.mark_dirty();
        self.trigger
            .on_route_change(
                route,
                &self.state,
                &self.registry,
                &mut self.scheduler,
                now,
                EngineTimer::AutoStart,
            )
            .map(|pending| pending.flow_id.clone())
    }

    /// Scroll or resize happened. Returns false if nothing listens for `kind`.
    pub fn on_geometry_event(&mut self, kind: ListenerKind, now: Instant) -> bool {
        if kind == ListenerKind::KeyDown || !self.listeners.is_listening(kind) {
            return false;
        }
        if let Some(timer) = self.relocate_timer.take() {
            self.scheduler.cancel(timer);
        }
        self.relocate_timer =
            Some(self.scheduler.schedule(now, self.relocate_debounce, EngineTimer::Relocate));
        true
    }

    /// Fire due timers. Returns the transitions they caused.
    pub fn tick(&mut self, now: Instant) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for event in self.scheduler.poll(now) {
            match event {
                EngineTimer::AutoStart(flow_id) => {
                    if !self.trigger.on_fired(&flow_id) {
                        continue;
                    }
                    if !self.state.is_idle() || self.state.is_completed(&flow_id) {
                        debug!("Auto-start of {} no longer applies", flow_id);
                        continue;
                    }
                    let transition = self.start_flow(&flow_id);
                    if matches!(transition, Transition::Started { .. }) {
                        self.trigger.mark_fired(&flow_id);
                    }
                    transitions.push(transition);
                }
                EngineTimer::Relocate => {
                    self.relocate_timer = None;
                    self.tracker.mark_dirty();
                }
            }
        }
        transitions
    }

    // ------------------------------------------------------------------
    // Rendering support
    // ------------------------------------------------------------------

    /// Re-locate the current target if needed and return it
    pub fn sync_target(&mut self, locator: &dyn TargetLocator) -> Option<TargetRect> {
        if self.geometry_scope.is_none() {
            return None;
        }
        self.tracker.sync(locator)
    }

    /// Data for the visible step, `None` while idle or hidden
    pub fn step_view(&self) -> Option<StepView<'_>> {
        let active = self.state.active().filter(|a| a.visible)?;
        let flow = self.registry.get(&active.flow_id)?;
        let step = flow.step(active.step_index)?;
        Some(StepView {
            flow_id: flow.id.as_str(),
            step,
            index: active.step_index,
            total: flow.len(),
            kind: flow.kind(),
            target: if step.is_tooltip() {
                self.tracker.target()
            } else {
                None
            },
        })
    }

    /// Release every resource. The engine stays usable afterwards.
    pub fn shutdown(&mut self) {
        self.teardown();
        self.scheduler.clear();
        debug!("Tour engine shut down");
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Cancel timers and release listener scopes
    fn teardown(&mut self) {
        self.trigger.cancel_pending(&mut self.scheduler);
        self.release_geometry_scope();
        if let Some(scope) = self.key_scope.take() {
            self.listeners.release_scope(scope);
        }
    }

    fn release_geometry_scope(&mut self) {
        if let Some(timer) = self.relocate_timer.take() {
            self.scheduler.cancel(timer);
        }
        if let Some(geometry) = self.geometry_scope.take() {
            let released = self.listeners.release_scope(geometry.scope);
            debug!(
                "Released {} geometry listener(s) for {} step {}",
                released, geometry.flow_id, geometry.step_index
            );
        }
        self.tracker.clear();
    }

    /// Make listener scopes match the current state
    fn sync_scopes(&mut self) {
        let visible = self.state.is_visible();

        match (visible, self.key_scope.is_some()) {
            (true, false) => {
                self.key_scope = Some(self.listeners.acquire_scope(&[ListenerKind::KeyDown]));
            }
            (false, true) => {
                if let Some(scope) = self.key_scope.take() {
                    self.listeners.release_scope(scope);
                }
            }
            _ => {}
        }

        let wanted = self.state.active().filter(|a| a.visible).and_then(|active| {
            let step = self.registry.get(&active.flow_id)?.step(active.step_index)?;
            let selector = step.target_selector.as_deref()?;
            Some((active.flow_id.clone(), active.step_index, selector.to_string()))
        });

        let current = self
            .geometry_scope
            .as_ref()
            .map(|g| (g.flow_id.as_str(), g.step_index));
        let unchanged = match (&wanted, current) {
            (Some((flow_id, index, _)), Some((held_flow, held_index))) => {
                flow_id == held_flow && *index == held_index
            }
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.release_geometry_scope();
        if let Some((flow_id, step_index, selector)) = wanted {
            let scope = self
                .listeners
                .acquire_scope(&[ListenerKind::Scroll, ListenerKind::Resize]);
            self.tracker.retarget(Some(&selector));
            self.geometry_scope = Some(GeometryScope {
                flow_id,
                step_index,
                scope,
            });
        }
    }

    fn persist(&mut self) {
        if self.persistence_degraded {
            debug!("Persistence degraded; keeping completion state in memory");
            return;
        }
        if let Err(e) = self.store.save(self.state.completed_flows()) {
            warn!(
                "Could not save completion state to {}: {}; continuing in memory",
                self.store.describe(),
                e
            );
            self.persistence_degraded = true;
        }
    }

    fn log_transition(&self, transition: &Transition) {
        match transition {
            Transition::Started { flow_id } => info!("Started flow {}", flow_id),
            Transition::Finished {
                flow_id,
                end,
                newly_completed,
            } => info!(
                "Flow {} finished ({:?}, newly completed: {})",
                flow_id, end, newly_completed
            ),
            Transition::StepChanged { flow_id, from, to } => {
                debug!("Flow {} step {} -> {}", flow_id, from, to)
            }
            Transition::VisibilityChanged { flow_id, visible } => {
                debug!("Flow {} visible: {}", flow_id, visible)
            }
            Transition::Ignored(reason) => debug!("Ignored tour command: {}", reason),
        }
    }
}

impl Drop for TourEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for TourEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourEngine")
            .field("state", &self.state)
            .field("store", &self.store.describe())
            .field("listeners", &self.listeners.len())
            .field("pending_timers", &self.scheduler.pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::storage::MemoryStore;
    use crate::flows::{Flow, Step};
    use crate::types::Side;

    fn engine() -> TourEngine {
        let steps = vec![
            Step::tooltip("a", "A", "first", "#a", Side::Bottom),
            Step::tooltip("b", "B", "second", "#b", Side::Right),
        ];
        let registry = FlowRegistry::new([
            Flow::new("tour", steps),
            Flow::new("intro", vec![Step::slide("i", "Hi", "hello")]),
        ])
        .unwrap();
        let config = EngineConfig {
            first_launch: None,
            ..EngineConfig::default()
        };
        TourEngine::new(Arc::new(registry), Box::new(MemoryStore::new()), &config)
    }

    #[test]
    fn test_tooltip_step_holds_geometry_and_key_listeners() {
        let mut engine = engine();
        engine.start_flow("tour");
        assert!(engine.is_listening(ListenerKind::Scroll));
        assert!(engine.is_listening(ListenerKind::Resize));
        assert!(engine.wants_keys());
        assert_eq!(engine.listener_count(), 3);

        engine.next_step();
        assert_eq!(engine.listener_count(), 3);

        engine.next_step();
        assert_eq!(engine.listener_count(), 0);
        assert!(engine.state().is_completed("tour"));
    }

    #[test]
    fn test_slide_flow_only_listens_for_keys() {
        let mut engine = engine();
        engine.start_flow("intro");
        assert!(engine.wants_keys());
        assert!(!engine.is_listening(ListenerKind::Scroll));
        assert_eq!(engine.listener_count(), 1);
    }

    #[test]
    fn test_geometry_event_debounces_relocation() {
        let mut engine = engine();
        let t0 = Instant::now();
        assert!(!engine.on_geometry_event(ListenerKind::Scroll, t0));

        engine.start_flow("tour");
        assert!(engine.on_geometry_event(ListenerKind::Scroll, t0));
        assert!(engine.on_geometry_event(ListenerKind::Resize, t0 + Duration::from_millis(20)));
        assert_eq!(
            engine.next_deadline(),
            Some(t0 + Duration::from_millis(70))
        );
        assert!(engine.tick(t0 + Duration::from_millis(60)).is_empty());
        engine.tick(t0 + Duration::from_millis(70));
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_hidden_flow_releases_listeners_and_hides_view() {
        let mut engine = engine();
        engine.start_flow("tour");
        engine.hide_tooltip();
        assert_eq!(engine.listener_count(), 0);
        assert!(engine.step_view().is_none());
        assert_eq!(engine.state().active_flow_id(), Some("tour"));

        engine.show_tooltip();
        assert_eq!(engine.listener_count(), 3);
        assert_eq!(engine.step_view().map(|v| v.index), Some(0));
    }
}
