//! Trigger Policy
//!
//! Decides when a flow auto-starts after navigation.
//!
//! # Rules
//!
//! - Only while no flow is active
//! - Never for a flow that is already completed
//! - At most once per flow for the lifetime of the policy
//! - Start is deferred by a settle delay so the destination page can render
//!   its targets; a newer route change cancels the pending start
//! - The first-launch flow ignores `triggerRoute` and fires on any route
//!   outside its deny-list (login and landing pages)

use super::machine::TourState;
use super::scheduler::{Scheduler, TimerId};
use crate::config::FirstLaunchConfig;
use crate::flows::FlowRegistry;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::debug;

/// Relaxed rule for the first-launch flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstLaunchRule {
    pub flow_id: String,
    pub deny_routes: Vec<String>,
}

impl FirstLaunchRule {
    pub fn allows(&self, route: &str) -> bool {
        !self.deny_routes.iter().any(|denied| denied == route)
    }
}

impl From<&FirstLaunchConfig> for FirstLaunchRule {
    fn from(config: &FirstLaunchConfig) -> Self {
        Self {
            flow_id: config.flow_id.clone(),
            deny_routes: config.deny_routes.clone(),
        }
    }
}

/// A scheduled auto-start waiting for its settle delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTrigger {
    pub flow_id: String,
    pub route: String,
    pub timer: TimerId,
}

/// Auto-start policy state
#[derive(Debug, Clone)]
pub struct TriggerPolicy {
    settle_delay: Duration,
    first_launch: Option<FirstLaunchRule>,
    fired: HashSet<String>,
    pending: Option<PendingTrigger>,
}

impl TriggerPolicy {
    pub fn new(settle_delay: Duration, first_launch: Option<FirstLaunchRule>) -> Self {
        Self {
            settle_delay,
            first_launch,
            fired: HashSet::new(),
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<&PendingTrigger> {
        self.pending.as_ref()
    }

    pub fn has_fired(&self, flow_id: &str) -> bool {
        self.fired.contains(flow_id)
    }

    /// Flow that should auto-start on `route`, if any
    pub fn candidate<'a>(
        &self,
        route: &str,
        state: &TourState,
        registry: &'a FlowRegistry,
    ) -> Option<&'a str> {
        if !state.is_idle() {
            return None;
        }
        let eligible = |id: &str| !state.is_completed(id) && !self.fired.contains(id);

        if let Some(rule) = &self.first_launch
            && rule.allows(route)
            && eligible(&rule.flow_id)
            && let Some(flow) = registry.get(&rule.flow_id)
        {
            return Some(flow.id.as_str());
        }

        registry
            .triggered_by(route)
            .map(|flow| flow.id.as_str())
            .find(|id| eligible(id))
    }

    /// React to navigation: cancel any pending start, then maybe schedule one
    pub fn on_route_change<E>(
        &mut self,
        route: &str,
        state: &TourState,
        registry: &FlowRegistry,
        scheduler: &mut Scheduler<E>,
        now: Instant,
        make_event: impl FnOnce(String) -> E,
    ) -> Option<&PendingTrigger> {
        self.cancel_pending(scheduler);

        let flow_id = self.candidate(route, state, registry)?.to_string();
        debug!(
            "Scheduling flow {} for route {} in {:?}",
            flow_id, route, self.settle_delay
        );
        let timer = scheduler.schedule(now, self.settle_delay, make_event(flow_id.clone()));
        self.pending = Some(PendingTrigger {
            flow_id,
            route: route.to_string(),
            timer,
        });
        self.pending.as_ref()
    }

    /// Consume the pending entry once its timer fired.
    ///
    /// Returns true if `flow_id` was the pending trigger.
    pub fn on_fired(&mut self, flow_id: &str) -> bool {
        match &self.pending {
            Some(pending) if pending.flow_id == flow_id => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Record that an auto-start actually happened
    pub fn mark_fired(&mut self, flow_id: &str) {
        self.fired.insert(flow_id.to_string());
    }

    /// Make every flow eligible to auto-start again
    pub fn reset_fired(&mut self) {
        self.fired.clear();
    }

    /// Cancel the pending start, if any
    pub fn cancel_pending<E>(&mut self, scheduler: &mut Scheduler<E>) -> bool {
        match self.pending.take() {
            Some(pending) => {
                debug!("Cancelled pending trigger for {}", pending.flow_id);
                scheduler.cancel(pending.timer)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::{Flow, Step};
    use crate::types::Side;
    use std::collections::BTreeSet;

    fn registry() -> FlowRegistry {
        let tip = Step::tooltip("s0", "t", "d", "#t", Side::Bottom);
        FlowRegistry::new([
            Flow::new("f1", vec![tip.clone()]).triggered_on("/dashboard"),
            Flow::new("welcome", vec![Step::slide("w", "W", "w")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_first_launch_respects_deny_list() {
        let rule = FirstLaunchRule {
            flow_id: "welcome".into(),
            deny_routes: vec!["/login".into()],
        };
        let policy = TriggerPolicy::new(Duration::from_millis(500), Some(rule));
        let reg = registry();
        let state = TourState::default();
        assert_eq!(policy.candidate("/login", &state, &reg), None);
        assert_eq!(policy.candidate("/dashboard", &state, &reg), Some("welcome"));
    }

    #[test]
    fn test_completed_flow_is_not_a_candidate() {
        let policy = TriggerPolicy::new(Duration::from_millis(500), None);
        let reg = registry();
        let completed: BTreeSet<String> = ["f1".to_string()].into();
        let state = TourState::hydrated(completed, Default::default());
        assert_eq!(policy.candidate("/dashboard", &state, &reg), None);
    }

    #[test]
    fn test_route_change_supersedes_pending() {
        let mut policy = TriggerPolicy::new(Duration::from_millis(500), None);
        let reg = registry();
        let state = TourState::default();
        let mut scheduler: Scheduler<String> = Scheduler::new();
        let t0 = Instant::now();

        policy.on_route_change("/dashboard", &state, &reg, &mut scheduler, t0, |id| id);
        assert_eq!(scheduler.pending(), 1);
        policy.on_route_change("/fleet", &state, &reg, &mut scheduler, t0, |id| id);
        assert_eq!(scheduler.pending(), 0);
        assert!(policy.pending().is_none());
    }
}
