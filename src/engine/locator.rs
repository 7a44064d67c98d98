//! Target Locator
//!
//! Resolves a step's selector to the current geometry of an on-screen
//! element. Lookups never fail loudly: a missing element is `NotFound`, and
//! the tour carries on with an invisible anchor.

use crate::geometry::TargetRect;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Outcome of a target lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    Found(TargetRect),
    NotFound,
}

impl Located {
    pub fn rect(self) -> Option<TargetRect> {
        match self {
            Self::Found(rect) => Some(rect),
            Self::NotFound => None,
        }
    }
}

impl From<Option<TargetRect>> for Located {
    fn from(rect: Option<TargetRect>) -> Self {
        rect.map_or(Self::NotFound, Self::Found)
    }
}

/// Host capability: find exactly one element for a selector
pub trait TargetLocator {
    fn locate(&self, selector: &str) -> Located;
}

impl<F> TargetLocator for F
where
    F: Fn(&str) -> Option<TargetRect>,
{
    fn locate(&self, selector: &str) -> Located {
        self(selector).into()
    }
}

/// Per-frame registry of named on-screen regions.
///
/// Pages register their regions while rendering; the first registration of
/// a selector in a frame wins.
#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    regions: HashMap<String, TargetRect>,
    order: Vec<String>,
}

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a region. Returns false if the selector was already taken.
    pub fn register(&mut self, selector: impl Into<String>, rect: impl Into<TargetRect>) -> bool {
        let selector = selector.into();
        if self.regions.contains_key(&selector) {
            debug!("Region {} registered twice; keeping the first", selector);
            return false;
        }
        self.order.push(selector.clone());
        self.regions.insert(selector, rect.into());
        true
    }

    pub fn clear(&mut self) {
        self.regions.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Selectors in registration order
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl TargetLocator for RegionMap {
    fn locate(&self, selector: &str) -> Located {
        self.regions.get(selector).copied().into()
    }
}

/// Cached target for the current step.
///
/// The tracker only asks the locator again when marked dirty: when a step
/// becomes current or a scroll/resize relocation fires.
#[derive(Debug, Clone, Default)]
pub struct TargetTracker {
    selector: Option<String>,
    target: Option<TargetRect>,
    dirty: bool,
    missing_reported: bool,
}

impl TargetTracker {
    /// Track a new selector (or none, for slide steps)
    pub fn retarget(&mut self, selector: Option<&str>) {
        if self.selector.as_deref() != selector {
            self.selector = selector.map(str::to_string);
            self.missing_reported = false;
        }
        self.target = None;
        self.dirty = selector.is_some();
    }

    pub fn mark_dirty(&mut self) {
        if self.selector.is_some() {
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn target(&self) -> Option<TargetRect> {
        self.target
    }

    /// Stop tracking entirely
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Re-locate if dirty and return the current target
    pub fn sync(&mut self, locator: &dyn TargetLocator) -> Option<TargetRect> {
        if !self.dirty {
            return self.target;
        }
        self.dirty = false;
        let Some(selector) = self.selector.as_deref() else {
            self.target = None;
            return None;
        };
        match locator.locate(selector) {
            Located::Found(rect) => {
                self.target = Some(rect);
                self.missing_reported = false;
            }
            Located::NotFound => {
                self.target = None;
                if !self.missing_reported {
                    warn!("Tour target {} not found; showing callout without anchor", selector);
                    self.missing_reported = true;
                }
            }
        }
        self.target
    }
}
