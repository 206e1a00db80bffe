//! Per-surface update scheduling.
//!
//! Each surface key moves through
//! `Empty → Scheduled → Settling → Resolving → Mounted`, and back to
//! `Scheduled` whenever a new event arrives.
//!
//! - `Scheduled`: trailing debounce. Scheduling again pushes the deadline out.
//! - `Settling`: the debounce elapsed; wait for the host to finish laying out.
//! - `Resolving`: handed out by [`SurfaceScheduler::poll`]; the caller resolves
//!   and reports back with [`SurfaceScheduler::complete`].
//!
//! Every schedule bumps the key's generation. A resolution only counts if its
//! generation is still current, so a superseded resolution never mounts.
//!
//! Time is passed in explicitly, which keeps the state machine independent of
//! the event loop driving it.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::render::SurfaceKey;

/// Scheduling state of one surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SurfaceState {
    /// Nothing pending, nothing mounted.
    #[default]
    Empty,
    /// Waiting for the debounce window to close.
    Scheduled,
    /// Waiting for the settle delay.
    Settling,
    /// Handed out for resolution.
    Resolving,
    /// A banner is mounted.
    Mounted,
}

#[derive(Debug)]
struct Entry<P> {
    state: SurfaceState,
    generation: u64,
    due: Option<Instant>,
    settle: Duration,
    payload: Option<P>,
    /// Scheduling order, breaks deadline ties.
    sequence: u64,
}

impl<P> Entry<P> {
    const fn new() -> Self {
        Self {
            state: SurfaceState::Empty,
            generation: 0,
            due: None,
            settle: Duration::ZERO,
            payload: None,
            sequence: 0,
        }
    }

    const fn is_pending(&self) -> bool {
        matches!(self.state, SurfaceState::Scheduled | SurfaceState::Settling)
    }
}

/// A surface whose debounce and settle delays have elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ready<P> {
    pub key: SurfaceKey,
    pub generation: u64,
    pub payload: P,
}

/// Debounce-then-settle scheduler keyed by surface.
#[derive(Debug)]
pub struct SurfaceScheduler<P> {
    entries: HashMap<SurfaceKey, Entry<P>>,
    next_sequence: u64,
}

impl<P> Default for SurfaceScheduler<P> {
    fn default() -> Self { Self::new() }
}

impl<P> SurfaceScheduler<P> {
    #[must_use]
    pub fn new() -> Self { Self { entries: HashMap::new(), next_sequence: 0 } }

    /// Schedules an update, superseding any pending one for the key.
    ///
    /// A zero `debounce` skips straight to the settle delay. The latest
    /// `payload` wins. Returns the new generation.
    pub fn schedule(
        &mut self,
        key: SurfaceKey,
        payload: P,
        now: Instant,
        debounce: Duration,
        settle: Duration,
    ) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let entry = self.entries.entry(key).or_insert_with(Entry::new);
        entry.generation += 1;
        entry.payload = Some(payload);
        entry.settle = settle;
        entry.sequence = sequence;
        if debounce.is_zero() {
            entry.state = SurfaceState::Settling;
            entry.due = Some(now + settle);
        } else {
            entry.state = SurfaceState::Scheduled;
            entry.due = Some(now + debounce);
        }
        entry.generation
    }

    /// Advances every pending surface to `now` and returns those ready to
    /// resolve, earliest deadline first.
    pub fn poll(&mut self, now: Instant) -> Vec<Ready<P>> {
        let mut ready = Vec::new();

        for (key, entry) in &mut self.entries {
            if entry.state == SurfaceState::Scheduled && entry.due.is_some_and(|due| due <= now) {
                entry.state = SurfaceState::Settling;
                entry.due = entry.due.map(|due| due + entry.settle);
            }

            if entry.state == SurfaceState::Settling
                && let Some(due) = entry.due.filter(|due| *due <= now)
                && let Some(payload) = entry.payload.take()
            {
                entry.state = SurfaceState::Resolving;
                entry.due = None;
                let item = Ready { key: key.clone(), generation: entry.generation, payload };
                ready.push((due, entry.sequence, item));
            }
        }

        ready.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        ready.into_iter().map(|(_, _, item)| item).collect()
    }

    /// Whether `generation` is still the latest for the key.
    #[must_use]
    pub fn is_current(&self, key: &SurfaceKey, generation: u64) -> bool {
        self.entries.get(key).is_some_and(|e| e.generation == generation)
    }

    /// Records the end of a resolution.
    ///
    /// Returns `false`, leaving the key untouched, when the resolution was
    /// superseded by a newer schedule.
    pub fn complete(&mut self, key: &SurfaceKey, generation: u64, mounted: bool) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        if entry.generation != generation || entry.state != SurfaceState::Resolving {
            return false;
        }
        entry.state = if mounted { SurfaceState::Mounted } else { SurfaceState::Empty };
        true
    }

    /// Marks a surface whose banner was destroyed outside a resolution.
    ///
    /// Pending updates are kept.
    pub fn mark_destroyed(&mut self, key: &SurfaceKey) {
        if let Some(entry) = self.entries.get_mut(key)
            && entry.state == SurfaceState::Mounted
        {
            entry.state = SurfaceState::Empty;
        }
    }

    /// Forgets a surface, dropping any pending update.
    pub fn cancel(&mut self, key: &SurfaceKey) -> bool { self.entries.remove(key).is_some() }

    /// Forgets every surface.
    pub fn clear(&mut self) { self.entries.clear(); }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().filter(|e| e.is_pending()).filter_map(|e| e.due).min()
    }

    /// Current state of a surface.
    #[must_use]
    pub fn state(&self, key: &SurfaceKey) -> SurfaceState {
        self.entries.get(key).map_or(SurfaceState::Empty, |e| e.state)
    }

    /// Number of tracked surfaces, pending or not.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Number of surfaces waiting on a deadline.
    #[must_use]
    pub fn pending_count(&self) -> usize { self.entries.values().filter(|e| e.is_pending()).count() }
}
