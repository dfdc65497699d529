//! Deterministic virtual timers.
//!
//! [`Timers`] is the injectable clock behind every delay in the layer
//! coordinator. Time is a [`Duration`] since the queue was created and only
//! moves when the owner advances it, so tests drive timers exactly while the
//! tokio driver maps wall-clock time onto the same queue.
//!
//! Timers fire in deadline order; ties fire in creation order. Clearing an
//! unknown or already-fired timer is a no-op.

use std::collections::BTreeMap;
use std::time::Duration;

/// Smallest period accepted for repeating timers.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle for a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schedule {
    Once,
    Every(Duration),
}

#[derive(Debug)]
struct Entry<T> {
    deadline: Duration,
    schedule: Schedule,
    tag: T,
}

/// A queue of one-shot and repeating timers, each carrying a tag.
#[derive(Debug)]
pub struct Timers<T> {
    now: Duration,
    next_id: u64,
    entries: BTreeMap<TimerId, Entry<T>>,
}

impl<T: Clone> Timers<T> {
    /// Create an empty queue at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arm a one-shot timer firing `delay` from now.
    pub fn set_timeout(&mut self, delay: Duration, tag: T) -> TimerId {
        self.arm(self.now + delay, Schedule::Once, tag)
    }

    /// Arm a repeating timer firing every `period`, first after one period.
    pub fn set_interval(&mut self, period: Duration, tag: T) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.arm(self.now + period, Schedule::Every(period), tag)
    }

    /// Cancel a timer. Returns `true` if it was pending.
    pub fn clear(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Cancel `*slot` if set and empty the slot.
    pub fn clear_slot(&mut self, slot: &mut Option<TimerId>) {
        if let Some(id) = slot.take() {
            self.clear(id);
        }
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.values().map(|e| e.deadline).min()
    }

    /// Fire the earliest timer due at or before `until`.
    ///
    /// Virtual time jumps to that timer's deadline. Repeating timers are
    /// re-armed one period later. Call repeatedly, acting on each timer before
    /// asking for the next, so handlers may clear timers that are also due.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        let (&id, entry) = self
            .entries
            .iter()
            .filter(|(_, e)| e.deadline <= until)
            .min_by_key(|(id, e)| (e.deadline, **id))?;
        let deadline = entry.deadline;
        let schedule = entry.schedule;
        let tag = entry.tag.clone();
        self.now = self.now.max(deadline);

        match schedule {
            Schedule::Once => {
                self.entries.remove(&id);
            }
            Schedule::Every(period) => {
                if let Some(entry) = self.entries.get_mut(&id) {
                    entry.deadline = deadline + period;
                }
            }
        }
        Some((id, tag))
    }

    /// Move virtual time forward to `until` without firing anything.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Fire everything due up to `until` and move time there.
    pub fn advance_to(&mut self, until: Duration) -> Vec<(TimerId, T)> {
        let mut fired = Vec::new();
        while let Some(timer) = self.pop_due(until) {
            fired.push(timer);
        }
        self.settle(until);
        fired
    }

    fn arm(&mut self, deadline: Duration, schedule: Schedule, tag: T) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.insert(id, Entry { deadline, schedule, tag });
        id
    }
}

impl<T: Clone> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
