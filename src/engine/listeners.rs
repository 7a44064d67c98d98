//! Scoped listener registration
//!
//! Scroll, resize and key listeners are shared host resources. The engine
//! registers them for exactly the lifetime of a visible step and must hand
//! every one back. Registrations live in a generational arena: a released
//! slot is reused with a new generation, so stale handles can never release
//! someone else's listener.

use strum::Display;

/// Kind of host event a listener subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ListenerKind {
    Scroll,
    Resize,
    KeyDown,
}

/// Registration options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerOptions {
    /// Listen during the capture phase (scrolls from nested containers)
    pub capture: bool,
}

impl ListenerKind {
    /// Options the engine registers this kind with
    pub fn default_options(self) -> ListenerOptions {
        ListenerOptions {
            capture: self == Self::Scroll,
        }
    }
}

/// Handle to one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    kind: ListenerKind,
    options: ListenerOptions,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    registration: Option<Registration>,
}

/// Generational arena of active registrations
#[derive(Debug, Clone, Default)]
pub struct ListenerArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
}

impl ListenerArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ListenerKind, options: ListenerOptions) -> ListenerHandle {
        let registration = Some(Registration { kind, options });
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.registration = registration;
            return ListenerHandle {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            registration,
        });
        ListenerHandle {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Deregister. Returns false for stale or already-released handles.
    pub fn release(&mut self, handle: ListenerHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index) else {
            return false;
        };
        if slot.generation != handle.generation || slot.registration.is_none() {
            return false;
        }
        slot.registration = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        true
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.registrations().any(|r| r.kind == kind)
    }

    /// Options of the first registration of `kind`
    pub fn options(&self, kind: ListenerKind) -> Option<ListenerOptions> {
        self.registrations()
            .find(|r| r.kind == kind)
            .map(|r| r.options)
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Register every kind in `kinds` as one scope
    pub fn acquire_scope(&mut self, kinds: &[ListenerKind]) -> ListenerScope {
        let handles = kinds
            .iter()
            .map(|&kind| self.register(kind, kind.default_options()))
            .collect();
        ListenerScope { handles }
    }

    /// Release every handle of a scope
    pub fn release_scope(&mut self, scope: ListenerScope) -> usize {
        scope
            .handles
            .into_iter()
            .filter(|&handle| self.release(handle))
            .count()
    }

    fn registrations(&self) -> impl Iterator<Item = &Registration> {
        self.slots.iter().filter_map(|slot| slot.registration.as_ref())
    }
}

/// Handles acquired together and released together
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a scope must be handed back to ListenerArena::release_scope"]
pub struct ListenerScope {
    handles: Vec<ListenerHandle>,
}

impl ListenerScope {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_round_trip_leaves_arena_empty() {
        let mut arena = ListenerArena::new();
        let scope = arena.acquire_scope(&[ListenerKind::Scroll, ListenerKind::Resize]);
        assert_eq!(arena.len(), 2);
        assert!(arena.is_listening(ListenerKind::Scroll));
        assert_eq!(arena.options(ListenerKind::Scroll), Some(ListenerOptions { capture: true }));
        assert_eq!(arena.release_scope(scope), 2);
        assert!(arena.is_empty());
        assert!(!arena.is_listening(ListenerKind::Resize));
    }

    #[test]
    fn test_stale_handle_cannot_release_reused_slot() {
        let mut arena = ListenerArena::new();
        let old = arena.register(ListenerKind::Resize, ListenerOptions::default());
        assert!(arena.release(old));
        let fresh = arena.register(ListenerKind::KeyDown, ListenerOptions::default());
        assert!(!arena.release(old));
        assert!(arena.is_listening(ListenerKind::KeyDown));
        assert!(arena.release(fresh));
    }

    #[test]
    fn test_repeated_scopes_reuse_slots() {
        let mut arena = ListenerArena::new();
        for _ in 0..50 {
            let scope = arena.acquire_scope(&[ListenerKind::Scroll, ListenerKind::Resize]);
            arena.release_scope(scope);
        }
        assert!(arena.is_empty());
        assert_eq!(arena.slots.len(), 2);
    }
}
