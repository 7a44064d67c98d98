//! Cancellable timer deferrals
//!
//! The engine never blocks. Settle delays and debounced relocation are
//! entries in this scheduler, fired when the host polls with the current
//! time. Time is always passed in, so tests drive it explicitly.

use std::time::{Duration, Instant};

/// Handle for a scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<E> {
    id: TimerId,
    deadline: Instant,
    event: E,
}

/// Deadline-ordered set of pending events
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `event` to fire `delay` after `now`
    pub fn schedule(&mut self, now: Instant, delay: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = now.checked_add(delay).unwrap_or(now);
        self.entries.push(Entry {
            id,
            deadline,
            event,
        });
        id
    }

    /// Cancel a pending entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Remove and return every event due at `now`, earliest first
    pub fn poll(&mut self, now: Instant) -> Vec<E> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.deadline <= now);
        self.entries = pending;
        due.sort_by_key(|entry| (entry.deadline, entry.id));
        due.into_iter().map(|entry| entry.event).collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
