//! Configuration for the layer coordinator and the list animator.

use std::time::Duration;

use crate::position::{Placement, DEFAULT_PRIORITIES};

// ---------------------------------------------------------------------------
// LayerConfig
// ---------------------------------------------------------------------------

/// Timing and placement defaults for popups and modals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerConfig {
    /// How often an active popup is re-measured against its anchor.
    pub reposition_interval: Duration,
    /// Delay before `on_anchor_pressed` fires after an anchor click dismissed
    /// the popup, so the dismissal settles first.
    pub anchor_pressed_delay: Duration,
    /// Priorities used when a popup does not name its own.
    pub default_priorities: Vec<Placement>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            reposition_interval: Duration::from_millis(500),
            anchor_pressed_delay: Duration::ZERO,
            default_priorities: DEFAULT_PRIORITIES.to_vec(),
        }
    }
}

impl LayerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reposition interval (builder).
    pub fn with_reposition_interval(mut self, interval: Duration) -> Self {
        self.reposition_interval = interval;
        self
    }

    /// Set the anchor-pressed delay (builder).
    pub fn with_anchor_pressed_delay(mut self, delay: Duration) -> Self {
        self.anchor_pressed_delay = delay;
        self
    }

    /// Set the default placement priorities (builder).
    pub fn with_default_priorities(mut self, priorities: impl Into<Vec<Placement>>) -> Self {
        self.default_priorities = priorities.into();
        self
    }
}

// ---------------------------------------------------------------------------
// AnimationConfig
// ---------------------------------------------------------------------------

/// Durations of the staged list-edit transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Fade-out of removed children.
    pub leave_duration: Duration,
    /// Translate of moved children.
    pub move_duration: Duration,
    /// Fade-in of added children.
    pub enter_duration: Duration,
    /// Pause inserted between consecutive phases.
    pub phase_gap: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            leave_duration: Duration::from_millis(150),
            move_duration: Duration::from_millis(300),
            enter_duration: Duration::from_millis(150),
            phase_gap: Duration::ZERO,
        }
    }
}

impl AnimationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leave_duration(mut self, duration: Duration) -> Self {
        self.leave_duration = duration;
        self
    }

    pub fn with_move_duration(mut self, duration: Duration) -> Self {
        self.move_duration = duration;
        self
    }

    pub fn with_enter_duration(mut self, duration: Duration) -> Self {
        self.enter_duration = duration;
        self
    }

    pub fn with_phase_gap(mut self, gap: Duration) -> Self {
        self.phase_gap = gap;
        self
    }
}
