//! Staged list-edit transitions.
//!
//! ```text
//!   Rest ──will_update (keys changed)──▶ WillAnimate ──did_update──▶ Animating
//!    ▲                                                                  │
//!    └─────────────────── last transition_done ─────────────────────────┘
//! ```
//!
//! The animator only classifies edits and measures deltas. Actually moving
//! pixels is the job of a [`TransitionExecutor`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::AnimationConfig;
use crate::geometry::Offset;

use super::diff::{assert_keys, split_keys, transient_order, ChildEditSet, ChildKey, PositionDelta, PositionSource};

/// Animator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationPhase {
    #[default]
    Rest,
    WillAnimate,
    Animating,
}

/// What a single transition does to its child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Fade out, then stop rendering.
    Leave(PositionDelta),
    /// Translate from the old position to the new one.
    Move(PositionDelta),
    /// Fade in.
    Enter,
}

/// One scheduled transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<K> {
    pub key: K,
    pub kind: TransitionKind,
    /// Offset from the start of the plan.
    pub delay: Duration,
    pub duration: Duration,
}

/// Everything an executor needs to run one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan<K> {
    pub edits: ChildEditSet<K>,
    /// Leave transitions first, then moves, then enters.
    pub transitions: Vec<Transition<K>>,
}

impl<K> TransitionPlan<K> {
    /// When the last transition finishes.
    pub fn total_duration(&self) -> Duration {
        self.transitions
            .iter()
            .map(|t| t.delay + t.duration)
            .max()
            .unwrap_or_default()
    }
}

/// Runs transitions and later reports each one back through
/// [`ListEditAnimator::transition_done`].
pub trait TransitionExecutor<K> {
    fn start(&mut self, transition: &Transition<K>);
}

struct PendingEdit<K> {
    next: Vec<K>,
    added: Vec<K>,
    removed: Vec<K>,
    before: HashMap<K, Offset>,
}

/// Diffs keyed children between renders and sequences leave, move and enter
/// transitions for the difference.
pub struct ListEditAnimator<K: ChildKey> {
    config: AnimationConfig,
    phase: AnimationPhase,
    rendered: Vec<K>,
    /// Keys once the current edit has settled.
    settled: Vec<K>,
    pending: Option<PendingEdit<K>>,
    in_flight: HashSet<K>,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl<K: ChildKey> ListEditAnimator<K> {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            phase: AnimationPhase::Rest,
            rendered: Vec::new(),
            settled: Vec::new(),
            pending: None,
            in_flight: HashSet::new(),
            on_complete: None,
        }
    }

    /// Called each time a plan finishes and the animator is back at rest.
    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    /// Whether the owner may re-render. False while transitions are running.
    pub fn should_update(&self) -> bool {
        self.phase != AnimationPhase::Animating
    }

    /// Keys to draw right now. While an edit is pending or animating, removed
    /// children are kept at their previous slots.
    pub fn rendered_keys(&self) -> &[K] {
        &self.rendered
    }

    /// Transitions that have not reported back yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start an edit from `prev` to `next`, capturing pre-edit positions.
    ///
    /// Returns `true` when the key set changed and an animation is prepared.
    /// While animating nothing happens and `false` is returned.
    ///
    /// # Panics
    ///
    /// If either list holds an unstable or duplicate key.
    pub fn will_update(&mut self, prev: &[K], next: &[K], positions: &impl PositionSource<K>) -> bool {
        assert_keys(prev, "previous");
        assert_keys(next, "next");
        if self.phase == AnimationPhase::Animating {
            return false;
        }

        let (added, removed) = split_keys(prev, next);
        if added.is_empty() && removed.is_empty() {
            self.pending = None;
            self.phase = AnimationPhase::Rest;
            self.rendered = next.to_vec();
            self.settled = next.to_vec();
            return false;
        }

        let before = prev
            .iter()
            .filter_map(|key| positions.position(key).map(|pos| (key.clone(), pos)))
            .collect();
        self.rendered = transient_order(prev, next, &removed);
        self.settled = next.to_vec();
        debug!(added = added.len(), removed = removed.len(), "list edit pending");
        self.pending = Some(PendingEdit {
            next: next.to_vec(),
            added,
            removed,
            before,
        });
        self.phase = AnimationPhase::WillAnimate;
        true
    }

    /// Measure post-edit positions and build the transition plan.
    ///
    /// `positions` must reflect [`rendered_keys`](Self::rendered_keys). Returns
    /// `None` outside `WillAnimate`. A plan without transitions completes
    /// immediately.
    pub fn did_update(&mut self, positions: &impl PositionSource<K>) -> Option<TransitionPlan<K>> {
        if self.phase != AnimationPhase::WillAnimate {
            return None;
        }
        let pending = self.pending.take()?;

        let delta_for = |key: &K| -> Option<PositionDelta> {
            let old = pending.before.get(key)?;
            let new = positions.position(key)?;
            Some(PositionDelta::between(*old, new))
        };

        let removed: Vec<(K, PositionDelta)> = pending
            .removed
            .iter()
            .map(|key| (key.clone(), delta_for(key).unwrap_or_default()))
            .collect();
        let entering: HashSet<&K> = pending.added.iter().collect();
        let moved: Vec<(K, PositionDelta)> = pending
            .next
            .iter()
            .filter(|key| !entering.contains(key))
            .filter_map(|key| delta_for(key).map(|d| (key.clone(), d)))
            .filter(|(_, d)| !d.is_zero())
            .collect();

        let edits = ChildEditSet {
            added: pending.added,
            removed,
            moved,
        };
        let transitions = self.schedule(&edits);
        let plan = TransitionPlan { edits, transitions };

        if plan.transitions.is_empty() {
            self.finish();
        } else {
            self.in_flight = plan.transitions.iter().map(|t| t.key.clone()).collect();
            self.phase = AnimationPhase::Animating;
            debug!(
                transitions = plan.transitions.len(),
                total = ?plan.total_duration(),
                "list edit animating"
            );
        }
        Some(plan)
    }

    /// Hand every transition in `plan` to `executor`.
    pub fn run(&self, plan: &TransitionPlan<K>, executor: &mut impl TransitionExecutor<K>) {
        for transition in &plan.transitions {
            executor.start(transition);
        }
    }

    /// Report that the transition for `key` finished. Returns `true` when it
    /// was the last one and the animator is back at rest.
    pub fn transition_done(&mut self, key: &K) -> bool {
        if self.phase != AnimationPhase::Animating || !self.in_flight.remove(key) {
            return false;
        }
        trace!(?key, remaining = self.in_flight.len(), "transition done");
        if !self.in_flight.is_empty() {
            return false;
        }
        self.finish();
        true
    }

    /// Leaves first, then moves, then enters. Empty phases take no time.
    fn schedule(&self, edits: &ChildEditSet<K>) -> Vec<Transition<K>> {
        let config = &self.config;
        let mut transitions = Vec::new();
        let mut start = Duration::ZERO;

        let leaves = edits.removed.iter().map(|(key, d)| (key, TransitionKind::Leave(*d)));
        let moves = edits.moved.iter().map(|(key, d)| (key, TransitionKind::Move(*d)));
        let enters = edits.added.iter().map(|key| (key, TransitionKind::Enter));
        let phases: [(Vec<(&K, TransitionKind)>, Duration); 3] = [
            (leaves.collect(), config.leave_duration),
            (moves.collect(), config.move_duration),
            (enters.collect(), config.enter_duration),
        ];

        for (phase, duration) in phases {
            if phase.is_empty() {
                continue;
            }
            for (key, kind) in phase {
                transitions.push(Transition {
                    key: key.clone(),
                    kind,
                    delay: start,
                    duration,
                });
            }
            start += duration + config.phase_gap;
        }
        transitions
    }

    fn finish(&mut self) {
        self.rendered = std::mem::take(&mut self.settled);
        self.settled = self.rendered.clone();
        self.in_flight.clear();
        self.phase = AnimationPhase::Rest;
        debug!("list edit complete");
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }
}

impl<K: ChildKey> Default for ListEditAnimator<K> {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

impl<K: ChildKey> fmt::Debug for ListEditAnimator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListEditAnimator")
            .field("phase", &self.phase)
            .field("rendered", &self.rendered)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
