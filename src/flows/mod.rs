//! Flow Registry
//!
//! A static catalog of named tours. Flows are immutable once the registry is
//! built; construction rejects empty flows, duplicate ids and flows that mix
//! anchored (tooltip) and unanchored (slide) steps.
//!
//! # File format
//!
//! A JSON object keyed by flow id. The inner `id` may be omitted:
//!
//! ```json
//! {
//!   "fleet-tour": {
//!     "triggerRoute": "/fleet",
//!     "steps": [
//!       { "id": "table", "title": "Vehicles", "description": "...",
//!         "targetSelector": "#fleet-table", "position": "bottom" }
//!     ]
//!   }
//! }
//! ```

mod builtin;

use crate::error::{GuidepostError, Result};
use crate::types::{FlowKind, Side};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// One unit of tour content, optionally anchored to a page element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Step {
    /// Build a tooltip step anchored to `selector`
    pub fn tooltip(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        selector: impl Into<String>,
        position: Side,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            target_selector: Some(selector.into()),
            position: Some(position),
            image: None,
        }
    }

    /// Build an unanchored slide step
    pub fn slide(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            target_selector: None,
            position: None,
            image: None,
        }
    }

    /// Attach an illustration reference
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Whether this step points at a target
    pub fn is_tooltip(&self) -> bool {
        self.target_selector.is_some()
    }

    /// Preferred side, defaulting to bottom
    pub fn side(&self) -> Side {
        self.position.unwrap_or_default()
    }
}

/// A named, ordered sequence of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    #[serde(default)]
    pub id: String,
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_route: Option<String>,
}

impl Flow {
    pub fn new(id: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            steps,
            trigger_route: None,
        }
    }

    /// Auto-start this flow when the host navigates to `route`
    #[must_use]
    pub fn triggered_on(mut self, route: impl Into<String>) -> Self {
        self.trigger_route = Some(route.into());
        self
    }

    /// Presentation variant. Only meaningful for validated flows.
    pub fn kind(&self) -> FlowKind {
        match self.steps.first() {
            Some(step) if step.is_tooltip() => FlowKind::Tooltip,
            _ => FlowKind::Slide,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(GuidepostError::registry("flow id must not be empty"));
        }
        if self.steps.is_empty() {
            return Err(GuidepostError::registry(format!(
                "flow '{}' has no steps",
                self.id
            )));
        }

        let anchored = self.steps.iter().filter(|s| s.is_tooltip()).count();
        if anchored != 0 && anchored != self.steps.len() {
            return Err(GuidepostError::registry(format!(
                "flow '{}' mixes tooltip and slide steps ({} of {} anchored)",
                self.id,
                anchored,
                self.steps.len()
            )));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return Err(GuidepostError::registry(format!(
                    "flow '{}' repeats step id '{}'",
                    self.id, step.id
                )));
            }
            if let Some(selector) = &step.target_selector
                && selector.trim().is_empty()
            {
                return Err(GuidepostError::registry(format!(
                    "flow '{}' step '{}' has an empty target selector",
                    self.id, step.id
                )));
            }
        }

        if let Some(route) = &self.trigger_route
            && !route.starts_with('/')
        {
            return Err(GuidepostError::registry(format!(
                "flow '{}' trigger route '{}' must start with '/'",
                self.id, route
            )));
        }

        Ok(())
    }
}

/// Validated catalog of flows, iterated in id order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowRegistry {
    flows: BTreeMap<String, Flow>,
}

impl FlowRegistry {
    /// Build a registry, rejecting invalid or duplicate flows
    pub fn new(flows: impl IntoIterator<Item = Flow>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for flow in flows {
            flow.validate()?;
            if map.contains_key(&flow.id) {
                return Err(GuidepostError::registry(format!(
                    "duplicate flow id '{}'",
                    flow.id
                )));
            }
            map.insert(flow.id.clone(), flow);
        }
        Ok(Self { flows: map })
    }

    /// The console's built-in catalog
    pub fn builtin() -> Self {
        builtin::registry()
    }

    /// Load a registry from the keyed JSON format
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    /// Parse a registry from the keyed JSON format
    pub fn from_json(content: &str) -> Result<Self> {
        let keyed: BTreeMap<String, Flow> = serde_json::from_str(content)?;
        let mut flows = Vec::with_capacity(keyed.len());
        for (key, mut flow) in keyed {
            if flow.id.is_empty() {
                flow.id = key;
            } else if flow.id != key {
                return Err(GuidepostError::registry(format!(
                    "flow keyed '{}' declares id '{}'",
                    key, flow.id
                )));
            }
            flows.push(flow);
        }
        Self::new(flows)
    }

    /// Write the registry in the keyed JSON format
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.flows)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Flow> {
        self.flows.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.flows.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Flows whose trigger route equals `route`, in id order
    pub fn triggered_by<'a>(&'a self, route: &str) -> impl Iterator<Item = &'a Flow> {
        self.flows
            .values()
            .filter(move |flow| flow.trigger_route.as_deref() == Some(route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tip(id: &str) -> Step {
        Step::tooltip(id, "Title", "Body", format!("#{id}"), Side::Bottom)
    }

    #[test]
    fn test_rejects_empty_flow() {
        let err = FlowRegistry::new([Flow::new("empty", vec![])]).unwrap_err();
        assert!(err.to_string().contains("has no steps"));
    }

    #[test]
    fn test_rejects_mixed_steps() {
        let flow = Flow::new("mixed", vec![tip("a"), Step::slide("b", "B", "slide")]);
        let err = FlowRegistry::new([flow]).unwrap_err();
        assert!(err.to_string().contains("mixes tooltip and slide"));
    }

    #[test]
    fn test_rejects_duplicate_flow_ids() {
        let a = Flow::new("same", vec![tip("a")]);
        let b = Flow::new("same", vec![tip("b")]);
        assert!(FlowRegistry::new([a, b]).is_err());
    }

    #[test]
    fn test_rejects_repeated_step_ids() {
        let flow = Flow::new("dupe", vec![tip("a"), tip("a")]);
        assert!(FlowRegistry::new([flow]).is_err());
    }

    #[test]
    fn test_kind_follows_steps() {
        assert_eq!(Flow::new("t", vec![tip("a")]).kind(), FlowKind::Tooltip);
        let slides = Flow::new("s", vec![Step::slide("a", "A", "a")]);
        assert_eq!(slides.kind(), FlowKind::Slide);
    }

    #[test]
    fn test_from_json_fills_id_from_key() {
        let json = r##"{
            "fleet-tour": {
                "triggerRoute": "/fleet",
                "steps": [
                    {"id": "table", "title": "Vehicles", "description": "All vehicles",
                     "targetSelector": "#fleet-table", "position": "right"}
                ]
            }
        }"##;
        let registry = FlowRegistry::from_json(json).unwrap();
        let flow = registry.get("fleet-tour").unwrap();
        assert_eq!(flow.id, "fleet-tour");
        assert_eq!(flow.steps[0].side(), Side::Right);
        assert_eq!(registry.triggered_by("/fleet").count(), 1);
    }

    #[test]
    fn test_from_json_rejects_mismatched_id() {
        let json =
            r#"{"a": {"id": "b", "steps": [{"id": "s", "title": "t", "description": "d"}]}}"#;
        assert!(FlowRegistry::from_json(json).is_err());
    }

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = FlowRegistry::builtin();
        assert!(registry.contains("welcome"));
        assert_eq!(registry.get("welcome").unwrap().kind(), FlowKind::Slide);
        assert_eq!(registry.triggered_by("/fleet").count(), 1);
        // Re-validating must succeed for the shipped catalog
        assert!(FlowRegistry::new(registry.iter().cloned()).is_ok());
    }
}
