//! Popup options and the popup state machine.
//!
//! ```text
//!   Idle ──show──▶ Measuring ──size reported──▶ Positioned
//!                     │  ▲                          │  ▲
//!                     │  └──────cancel──────┐       │  │ reposition tick
//!                     └──auto_dismiss──▶ Dismissing ◀┘  │
//!                                           │          ─┘
//!                                        timer / dismiss ──▶ Idle
//! ```
//!
//! Reposition ticks only act in `Positioned`; a popup that is about to be
//! auto-dismissed keeps its last geometry.

use std::fmt;

use crate::clock::TimerId;
use crate::dom::NodeId;
use crate::event::PointerEvent;
use crate::geometry::Size;
use crate::position::{Placement, RecalcResult};

/// Callback fired once when a popup or modal closes.
pub type DismissCallback = Box<dyn FnOnce()>;

/// Callback fired when the anchor was the target of a dismissing press.
pub type AnchorPressedCallback = Box<dyn FnOnce(PointerEvent)>;

// ---------------------------------------------------------------------------
// PopupOptions
// ---------------------------------------------------------------------------

/// Everything a caller supplies when showing a popup.
pub struct PopupOptions {
    /// Component the popup is attached to.
    pub anchor: NodeId,
    /// Secondary element whose presses count as anchor presses.
    pub trigger: Option<NodeId>,
    /// Placement priorities; empty means the configured default.
    pub priorities: Vec<Placement>,
    /// Overlap the anchor instead of sitting next to it.
    pub use_inner_positioning: bool,
    /// A second show for the same anchor closes the popup instead.
    pub dismiss_if_shown: bool,
    /// Presses outside the popup leave it open.
    pub prevent_dismiss_on_press: bool,
    pub on_dismiss: Option<DismissCallback>,
    pub on_anchor_pressed: Option<AnchorPressedCallback>,
}

impl PopupOptions {
    pub fn new(anchor: NodeId) -> Self {
        Self {
            anchor,
            trigger: None,
            priorities: Vec::new(),
            use_inner_positioning: false,
            dismiss_if_shown: false,
            prevent_dismiss_on_press: false,
            on_dismiss: None,
            on_anchor_pressed: None,
        }
    }

    pub fn with_trigger(mut self, trigger: NodeId) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn with_priorities(mut self, priorities: impl Into<Vec<Placement>>) -> Self {
        self.priorities = priorities.into();
        self
    }

    pub fn inner_positioning(mut self, inner: bool) -> Self {
        self.use_inner_positioning = inner;
        self
    }

    pub fn dismiss_if_shown(mut self, toggle: bool) -> Self {
        self.dismiss_if_shown = toggle;
        self
    }

    pub fn prevent_dismiss_on_press(mut self, prevent: bool) -> Self {
        self.prevent_dismiss_on_press = prevent;
        self
    }

    pub fn on_dismiss(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_dismiss = Some(Box::new(f));
        self
    }

    pub fn on_anchor_pressed(mut self, f: impl FnOnce(PointerEvent) + 'static) -> Self {
        self.on_anchor_pressed = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for PopupOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupOptions")
            .field("anchor", &self.anchor)
            .field("trigger", &self.trigger)
            .field("priorities", &self.priorities)
            .field("use_inner_positioning", &self.use_inner_positioning)
            .field("dismiss_if_shown", &self.dismiss_if_shown)
            .field("prevent_dismiss_on_press", &self.prevent_dismiss_on_press)
            .field("on_dismiss", &self.on_dismiss.is_some())
            .field("on_anchor_pressed", &self.on_anchor_pressed.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Active popup
// ---------------------------------------------------------------------------

/// The single popup currently owned by the coordinator.
#[derive(Debug)]
pub(crate) struct ActivePopup {
    pub id: String,
    pub options: PopupOptions,
    /// Priorities after applying the configured default.
    pub priorities: Vec<Placement>,
    /// False until the show delay elapses.
    pub visible: bool,
    /// Natural content size, once measured.
    pub size: Option<Size>,
    pub reposition_timer: TimerId,
    pub show_delay_timer: Option<TimerId>,
}

/// Popup lifecycle. Each variant only holds what is valid in that phase.
#[derive(Debug, Default)]
pub(crate) enum PopupState {
    #[default]
    Idle,
    Measuring(ActivePopup),
    Positioned {
        popup: ActivePopup,
        result: RecalcResult,
    },
    Dismissing {
        popup: ActivePopup,
        result: Option<RecalcResult>,
        timer: TimerId,
    },
}

impl PopupState {
    pub fn phase(&self) -> PopupPhase {
        match self {
            PopupState::Idle => PopupPhase::Idle,
            PopupState::Measuring(_) => PopupPhase::Measuring,
            PopupState::Positioned { .. } => PopupPhase::Positioned,
            PopupState::Dismissing { .. } => PopupPhase::Dismissing,
        }
    }

    pub fn popup(&self) -> Option<&ActivePopup> {
        match self {
            PopupState::Idle => None,
            PopupState::Measuring(popup)
            | PopupState::Positioned { popup, .. }
            | PopupState::Dismissing { popup, .. } => Some(popup),
        }
    }

    pub fn popup_mut(&mut self) -> Option<&mut ActivePopup> {
        match self {
            PopupState::Idle => None,
            PopupState::Measuring(popup)
            | PopupState::Positioned { popup, .. }
            | PopupState::Dismissing { popup, .. } => Some(popup),
        }
    }

    pub fn result(&self) -> Option<RecalcResult> {
        match self {
            PopupState::Positioned { result, .. } => Some(*result),
            PopupState::Dismissing { result, .. } => *result,
            _ => None,
        }
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.popup().is_some_and(|p| p.id == id)
    }
}

/// Public view of the popup lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupPhase {
    Idle,
    Measuring,
    Positioned,
    Dismissing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn options_builder() {
        let mut sm: SlotMap<NodeId, ()> = SlotMap::with_key();
        let anchor = sm.insert(());
        let trigger = sm.insert(());
        let options = PopupOptions::new(anchor)
            .with_trigger(trigger)
            .with_priorities([Placement::Top, Placement::Left])
            .inner_positioning(true)
            .dismiss_if_shown(true)
            .prevent_dismiss_on_press(true)
            .on_dismiss(|| {});
        assert_eq!(options.trigger, Some(trigger));
        assert_eq!(options.priorities, vec![Placement::Top, Placement::Left]);
        assert!(options.use_inner_positioning);
        assert!(options.dismiss_if_shown);
        assert!(options.prevent_dismiss_on_press);
        assert!(options.on_dismiss.is_some());
        assert!(options.on_anchor_pressed.is_none());
    }

    #[test]
    fn options_debug_hides_closures() {
        let mut sm: SlotMap<NodeId, ()> = SlotMap::with_key();
        let options = PopupOptions::new(sm.insert(())).on_dismiss(|| {});
        let dbg = format!("{options:?}");
        assert!(dbg.contains("PopupOptions"));
        assert!(dbg.contains("on_dismiss: true"));
    }

    #[test]
    fn idle_state_has_no_popup() {
        let state = PopupState::default();
        assert_eq!(state.phase(), PopupPhase::Idle);
        assert!(state.popup().is_none());
        assert!(state.result().is_none());
        assert!(!state.is_active("menu"));
    }
}
