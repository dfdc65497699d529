//! The layer coordinator: one popup, a stack of modals, and their timers.
//!
//! Every timer the coordinator arms is stored next to the state that owns it
//! and cleared on every path that leaves that state, so a late tick can never
//! act on a popup that has already been dismissed or replaced.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::clock::{TimerId, Timers};
use crate::config::LayerConfig;
use crate::dom::NodeId;
use crate::event::{DismissReason, Key, KeyEvent, Notice, NoticeQueue, PointerEvent};
use crate::geometry::Size;
use crate::position::{recalc_position, Placement, PositionError, RecalcResult};

use super::modal::{ModalEntry, ModalStack};
use super::popup::{ActivePopup, AnchorPressedCallback, PopupOptions, PopupPhase, PopupState};
use super::{LayerError, LayerHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerTag {
    Reposition,
    ShowDelay,
    AutoDismiss,
    AnchorPressed,
}

struct PendingAnchorPress {
    timer: TimerId,
    popup_id: String,
    event: PointerEvent,
    callback: Option<AnchorPressedCallback>,
}

/// Single source of truth for what floats above the main view.
pub struct LayerCoordinator {
    config: LayerConfig,
    timers: Timers<TimerTag>,
    state: PopupState,
    modals: ModalStack,
    anchor_press: Option<PendingAnchorPress>,
    notices: NoticeQueue,
}

impl LayerCoordinator {
    pub fn new(config: LayerConfig) -> Self {
        Self {
            config,
            timers: Timers::new(),
            state: PopupState::Idle,
            modals: ModalStack::new(),
            anchor_press: None,
            notices: NoticeQueue::new(),
        }
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn popup_phase(&self) -> PopupPhase {
        self.state.phase()
    }

    pub fn active_popup_id(&self) -> Option<&str> {
        self.state.popup().map(|p| p.id.as_str())
    }

    /// Latest geometry of the active popup.
    pub fn popup_position(&self) -> Option<RecalcResult> {
        self.state.result()
    }

    /// Whether the active popup may be drawn (show delay elapsed).
    pub fn is_popup_visible(&self) -> bool {
        self.state.popup().is_some_and(|p| p.visible)
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// When the next timer is due, for drivers that sleep in between.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Number of armed timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn notices_mut(&mut self) -> &mut NoticeQueue {
        &mut self.notices
    }

    /// Drain notices produced since the last drain.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // ── Popup operations ─────────────────────────────────────────────

    /// Show a popup, replacing any active one.
    ///
    /// Returns `Ok(true)` when the request instead toggled the active popup
    /// off (`dismiss_if_shown` with the same anchor); callers skip their own
    /// show logic in that case. With `show_delay` the popup is measured and
    /// positioned but kept invisible until the delay elapses.
    ///
    /// # Errors
    ///
    /// [`LayerError::MissingId`] for an empty id, [`LayerError::Position`] when
    /// inner positioning is combined with a leading `context` placement.
    pub fn show_popup(
        &mut self,
        options: PopupOptions,
        id: &str,
        show_delay: Option<Duration>,
    ) -> Result<bool, LayerError> {
        if id.is_empty() {
            return Err(LayerError::MissingId { kind: "popup" });
        }
        let priorities = if options.priorities.is_empty() {
            self.config.default_priorities.clone()
        } else {
            options.priorities.clone()
        };
        if options.use_inner_positioning && priorities.first() == Some(&Placement::Context) {
            return Err(PositionError::InnerContext.into());
        }

        if options.dismiss_if_shown {
            let same_anchor = self
                .state
                .popup()
                .is_some_and(|active| active.options.anchor == options.anchor);
            if same_anchor {
                self.dismiss_active(DismissReason::Toggled);
                return Ok(true);
            }
        }

        self.dismiss_active(DismissReason::Replaced);

        let reposition_timer = self
            .timers
            .set_interval(self.config.reposition_interval, TimerTag::Reposition);
        let show_delay_timer = show_delay
            .filter(|delay| !delay.is_zero())
            .map(|delay| self.timers.set_timeout(delay, TimerTag::ShowDelay));
        let visible = show_delay_timer.is_none();

        debug!(id, ?priorities, visible, "popup shown");
        self.notices.push(Notice::PopupShown { id: id.to_owned(), visible });
        self.state = PopupState::Measuring(ActivePopup {
            id: id.to_owned(),
            options,
            priorities,
            visible,
            size: None,
            reposition_timer,
            show_delay_timer,
        });
        Ok(false)
    }

    /// Record the popup's measured natural size and position it.
    ///
    /// Stale ids are ignored. Returns the new geometry, or `None` when the
    /// popup was not positioned (stale id, about to auto-dismiss, or dismissed
    /// because its anchor is gone).
    pub fn report_popup_size(
        &mut self,
        id: &str,
        size: Size,
        host: &impl LayerHost,
    ) -> Option<RecalcResult> {
        if !self.state.is_active(id) {
            trace!(id, "size report for inactive popup ignored");
            return None;
        }
        if let Some(popup) = self.state.popup_mut() {
            popup.size = Some(size);
        }
        match self.state.phase() {
            PopupPhase::Measuring | PopupPhase::Positioned => self.reposition(host),
            _ => None,
        }
    }

    /// Re-resolve the active popup right away (after a resize, for example).
    pub fn reposition_now(&mut self, host: &impl LayerHost) -> Option<RecalcResult> {
        match self.state.phase() {
            PopupPhase::Positioned => self.reposition(host),
            _ => None,
        }
    }

    /// Dismiss `id` after `delay` (default zero) unless cancelled first.
    ///
    /// Returns `false` when `id` is not the active popup.
    pub fn auto_dismiss_popup(&mut self, id: &str, delay: Option<Duration>) -> bool {
        if !self.state.is_active(id) {
            return false;
        }
        let timer = self
            .timers
            .set_timeout(delay.unwrap_or(Duration::ZERO), TimerTag::AutoDismiss);
        self.state = match std::mem::take(&mut self.state) {
            PopupState::Measuring(popup) => PopupState::Dismissing { popup, result: None, timer },
            PopupState::Positioned { popup, result } => PopupState::Dismissing {
                popup,
                result: Some(result),
                timer,
            },
            PopupState::Dismissing { popup, result, timer: old } => {
                self.timers.clear(old);
                PopupState::Dismissing { popup, result, timer }
            }
            PopupState::Idle => PopupState::Idle,
        };
        debug!(id, ?delay, "popup auto-dismiss armed");
        true
    }

    /// Disarm a pending auto-dismiss (pointer came back, for example).
    ///
    /// A popup measured while its dismissal was pending is positioned now.
    pub fn cancel_auto_dismiss(&mut self, id: &str, host: &impl LayerHost) -> bool {
        if !self.state.is_active(id) {
            return false;
        }
        match std::mem::take(&mut self.state) {
            PopupState::Dismissing { popup, result, timer } => {
                self.timers.clear(timer);
                let measured = popup.size.is_some();
                self.state = match result {
                    Some(result) => PopupState::Positioned { popup, result },
                    None => PopupState::Measuring(popup),
                };
                debug!(id, "popup auto-dismiss cancelled");
                if measured && self.state.phase() == PopupPhase::Measuring {
                    self.reposition(host);
                }
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Dismiss the popup named `id`. Requests for anything but the active
    /// popup are stale and ignored.
    pub fn dismiss_popup(&mut self, id: &str) -> bool {
        if !self.state.is_active(id) {
            trace!(id, "stale dismiss ignored");
            return false;
        }
        self.dismiss_active(DismissReason::Requested);
        true
    }

    // ── Time ─────────────────────────────────────────────────────────

    /// Advance virtual time to `now`, firing every timer that comes due.
    pub fn advance(&mut self, now: Duration, host: &impl LayerHost) {
        while let Some((id, tag)) = self.timers.pop_due(now) {
            trace!(?tag, at = ?self.timers.now(), "timer fired");
            self.on_timer(id, tag, host);
        }
        self.timers.settle(now);
    }

    fn on_timer(&mut self, id: TimerId, tag: TimerTag, host: &impl LayerHost) {
        match tag {
            TimerTag::Reposition => {
                let owned = self.state.popup().is_some_and(|p| p.reposition_timer == id);
                if !owned {
                    self.timers.clear(id);
                } else if self.state.phase() == PopupPhase::Positioned {
                    self.reposition(host);
                }
            }
            TimerTag::ShowDelay => {
                if let Some(popup) = self.state.popup_mut() {
                    if popup.show_delay_timer == Some(id) {
                        popup.show_delay_timer = None;
                        popup.visible = true;
                        let id = popup.id.clone();
                        debug!(%id, "popup revealed");
                        self.notices.push(Notice::PopupVisible { id });
                    }
                }
            }
            TimerTag::AutoDismiss => {
                if matches!(self.state, PopupState::Dismissing { timer, .. } if timer == id) {
                    self.dismiss_active(DismissReason::AutoDismiss);
                }
            }
            TimerTag::AnchorPressed => {
                if self.anchor_press.as_ref().is_some_and(|p| p.timer == id) {
                    if let Some(pending) = self.anchor_press.take() {
                        debug!(id = %pending.popup_id, "anchor pressed");
                        if let Some(callback) = pending.callback {
                            callback(pending.event);
                        }
                        self.notices.push(Notice::AnchorPressed { id: pending.popup_id });
                    }
                }
            }
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Outside-press handling for a pointer-down event.
    ///
    /// Presses inside the popup never dismiss. Presses on the anchor or
    /// trigger are left to the anchor's own handler when `dismiss_if_shown`
    /// is set. Everything else dismisses unless `prevent_dismiss_on_press`.
    /// A press on the anchor that dismisses schedules `on_anchor_pressed`.
    /// Returns whether the popup was dismissed.
    pub fn pointer_down(&mut self, event: PointerEvent, host: &impl LayerHost) -> bool {
        let Some(popup) = self.state.popup() else {
            return false;
        };
        let point = event.position;

        if let Some(result) = self.state.result() {
            if result.popup_region().contains_point(point) {
                return false;
            }
        }

        let hits = |node: Option<NodeId>| {
            node.and_then(|n| host.bounds(n))
                .is_some_and(|rect| rect.contains_point(point))
        };
        let on_anchor = hits(Some(popup.options.anchor));
        let on_trigger = hits(popup.options.trigger);

        if (on_anchor || on_trigger) && popup.options.dismiss_if_shown {
            return false;
        }
        if popup.options.prevent_dismiss_on_press {
            return false;
        }

        let popup_id = popup.id.clone();
        let callback = match self.state.popup_mut() {
            Some(popup) if on_anchor => popup.options.on_anchor_pressed.take(),
            _ => None,
        };
        self.dismiss_active(DismissReason::OutsidePress);

        if on_anchor {
            self.arm_anchor_press(popup_id, event, callback);
        }
        true
    }

    /// Escape closes the active popup. Returns whether it did.
    pub fn key_down(&mut self, key: KeyEvent) -> bool {
        if key.code != Key::Escape || self.state.popup().is_none() {
            return false;
        }
        self.dismiss_active(DismissReason::Escape);
        true
    }

    // ── Modals ───────────────────────────────────────────────────────

    /// Push a modal on top of the stack, dismissing any active popup.
    ///
    /// A modal already shown under `id` is replaced; its `on_dismiss` fires.
    ///
    /// # Errors
    ///
    /// [`LayerError::MissingId`] for an empty id.
    pub fn show_modal(&mut self, id: &str, entry: ModalEntry) -> Result<(), LayerError> {
        if id.is_empty() {
            return Err(LayerError::MissingId { kind: "modal" });
        }
        self.dismiss_active(DismissReason::ModalShown);
        if let Some(mut replaced) = self.modals.push(id, entry) {
            replaced.fire_dismiss();
        }
        debug!(id, depth = self.modals.len(), "modal shown");
        self.push_modal_notice();
        Ok(())
    }

    /// Remove the modal `id`. Returns `false` if it was not shown.
    pub fn dismiss_modal(&mut self, id: &str) -> bool {
        let Some(mut entry) = self.modals.remove(id) else {
            return false;
        };
        entry.fire_dismiss();
        debug!(id, depth = self.modals.len(), "modal dismissed");
        self.push_modal_notice();
        true
    }

    pub fn modal(&self, id: &str) -> Option<&ModalEntry> {
        self.modals.get(id)
    }

    pub fn top_modal(&self) -> Option<&str> {
        self.modals.top().map(|(id, _)| id)
    }

    /// Modal ids, bottom first.
    pub fn modal_ids(&self) -> Vec<String> {
        self.modals.ids().into_iter().map(str::to_owned).collect()
    }

    pub fn is_modal_displayed(&self, id: Option<&str>) -> bool {
        match id {
            Some(id) => self.modals.contains(id),
            None => !self.modals.is_empty(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reposition(&mut self, host: &impl LayerHost) -> Option<RecalcResult> {
        let popup = self.state.popup()?;
        let size = popup.size?;
        let viewport = host.viewport();
        let anchor = host.bounds(popup.options.anchor);
        let outcome = recalc_position(
            viewport,
            anchor,
            size,
            &popup.priorities,
            popup.options.use_inner_positioning,
        );

        let result = match outcome {
            Ok(Some(result)) => result,
            Ok(None) => {
                warn!(id = %popup.id, "popup anchor lost, dismissing");
                self.dismiss_active(DismissReason::AnchorLost);
                return None;
            }
            Err(err) => {
                warn!(id = %popup.id, %err, "popup could not be positioned");
                self.dismiss_active(DismissReason::Unpositionable);
                return None;
            }
        };

        let previous = self.state.result();
        self.state = match std::mem::take(&mut self.state) {
            PopupState::Measuring(popup) | PopupState::Positioned { popup, .. } => {
                PopupState::Positioned { popup, result }
            }
            other => other,
        };
        if previous != Some(result) {
            if let Some(popup) = self.state.popup() {
                trace!(id = %popup.id, ?result, "popup positioned");
                self.notices.push(Notice::PopupPositioned { id: popup.id.clone(), result });
            }
        }
        Some(result)
    }

    fn dismiss_active(&mut self, reason: DismissReason) {
        let popup = match std::mem::take(&mut self.state) {
            PopupState::Idle => return,
            PopupState::Measuring(popup) | PopupState::Positioned { popup, .. } => popup,
            PopupState::Dismissing { popup, timer, .. } => {
                self.timers.clear(timer);
                popup
            }
        };
        let ActivePopup {
            id,
            mut options,
            reposition_timer,
            mut show_delay_timer,
            ..
        } = popup;
        self.timers.clear(reposition_timer);
        self.timers.clear_slot(&mut show_delay_timer);

        debug!(%id, ?reason, "popup dismissed");
        if let Some(callback) = options.on_dismiss.take() {
            callback();
        }
        self.notices.push(Notice::PopupDismissed { id, reason });
    }

    fn arm_anchor_press(
        &mut self,
        popup_id: String,
        event: PointerEvent,
        callback: Option<AnchorPressedCallback>,
    ) {
        if let Some(previous) = self.anchor_press.take() {
            self.timers.clear(previous.timer);
        }
        let timer = self
            .timers
            .set_timeout(self.config.anchor_pressed_delay, TimerTag::AnchorPressed);
        self.anchor_press = Some(PendingAnchorPress {
            timer,
            popup_id,
            event,
            callback,
        });
    }

    fn push_modal_notice(&mut self) {
        self.notices.push(Notice::ModalStackChanged {
            top: self.top_modal().map(str::to_owned),
            depth: self.modals.len(),
        });
    }
}

impl Default for LayerCoordinator {
    fn default() -> Self {
        Self::new(LayerConfig::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Region;
    use pretty_assertions::assert_eq;
    use slotmap::SlotMap;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    struct FakeHost {
        viewport: Size,
        bounds: HashMap<NodeId, Region>,
    }

    impl LayerHost for FakeHost {
        fn viewport(&self) -> Size {
            self.viewport
        }
        fn bounds(&self, node: NodeId) -> Option<Region> {
            self.bounds.get(&node).copied()
        }
    }

    struct Fixture {
        layers: LayerCoordinator,
        host: FakeHost,
        anchor: NodeId,
        other_anchor: NodeId,
        trigger: NodeId,
    }

    fn fixture() -> Fixture {
        let mut sm: SlotMap<NodeId, ()> = SlotMap::with_key();
        let anchor = sm.insert(());
        let other_anchor = sm.insert(());
        let trigger = sm.insert(());
        let mut bounds = HashMap::new();
        bounds.insert(anchor, Region::from_edges(10, 10, 110, 40));
        bounds.insert(other_anchor, Region::new(400, 300, 50, 20));
        bounds.insert(trigger, Region::new(700, 10, 20, 20));
        Fixture {
            layers: LayerCoordinator::default(),
            host: FakeHost { viewport: Size::new(800, 600), bounds },
            anchor,
            other_anchor,
            trigger,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    fn show_positioned(f: &mut Fixture, id: &str, options: PopupOptions) -> RecalcResult {
        assert_eq!(f.layers.show_popup(options, id, None), Ok(false));
        f.layers
            .report_popup_size(id, Size::new(200, 150), &f.host)
            .expect("popup should be positioned")
    }

    // ── Show / measure ───────────────────────────────────────────────

    #[test]
    fn show_enters_measuring_then_positioned() {
        let mut f = fixture();
        f.layers.show_popup(PopupOptions::new(f.anchor), "menu", None).unwrap();
        assert_eq!(f.layers.popup_phase(), PopupPhase::Measuring);
        assert!(f.layers.popup_position().is_none());

        let result = f
            .layers
            .report_popup_size("menu", Size::new(200, 150), &f.host)
            .unwrap();
        assert_eq!(f.layers.popup_phase(), PopupPhase::Positioned);
        assert_eq!((result.popup_x, result.popup_y), (10, 40));
        assert_eq!(
            f.layers.drain_notices(),
            vec![
                Notice::PopupShown { id: "menu".into(), visible: true },
                Notice::PopupPositioned { id: "menu".into(), result },
            ]
        );
    }

    #[test]
    fn empty_id_is_rejected() {
        let mut f = fixture();
        let err = f.layers.show_popup(PopupOptions::new(f.anchor), "", None);
        assert_eq!(err, Err(LayerError::MissingId { kind: "popup" }));
        assert_eq!(f.layers.popup_phase(), PopupPhase::Idle);
    }

    #[test]
    fn inner_context_is_rejected_up_front() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor)
            .with_priorities([Placement::Context])
            .inner_positioning(true);
        let err = f.layers.show_popup(options, "menu", None);
        assert_eq!(err, Err(LayerError::Position(PositionError::InnerContext)));
        assert_eq!(f.layers.pending_timers(), 0);
    }

    #[test]
    fn replacing_fires_previous_on_dismiss() {
        let mut f = fixture();
        let (dismissed, on_dismiss) = counter();
        let options = PopupOptions::new(f.anchor).on_dismiss(on_dismiss);
        show_positioned(&mut f, "first", options);
        let options = PopupOptions::new(f.other_anchor);
        show_positioned(&mut f, "second", options);
        assert_eq!(dismissed.get(), 1);
        assert_eq!(f.layers.active_popup_id(), Some("second"));
        // Only the new popup's reposition interval remains armed.
        assert_eq!(f.layers.pending_timers(), 1);
    }

    #[test]
    fn dismiss_if_shown_toggles() {
        let mut f = fixture();
        let (dismissed, on_dismiss) = counter();
        let first = PopupOptions::new(f.anchor).dismiss_if_shown(true).on_dismiss(on_dismiss);
        assert_eq!(f.layers.show_popup(first, "menu", None), Ok(false));
        let second = PopupOptions::new(f.anchor).dismiss_if_shown(true);
        assert_eq!(f.layers.show_popup(second, "menu", None), Ok(true));

        assert_eq!(dismissed.get(), 1);
        assert_eq!(f.layers.popup_phase(), PopupPhase::Idle);
        assert_eq!(f.layers.pending_timers(), 0);
    }

    #[test]
    fn dismiss_if_shown_with_other_anchor_replaces() {
        let mut f = fixture();
        f.layers
            .show_popup(PopupOptions::new(f.anchor).dismiss_if_shown(true), "menu", None)
            .unwrap();
        let toggled = f
            .layers
            .show_popup(PopupOptions::new(f.other_anchor).dismiss_if_shown(true), "menu", None)
            .unwrap();
        assert!(!toggled);
        assert_eq!(f.layers.popup_phase(), PopupPhase::Measuring);
    }

    #[test]
    fn stale_size_report_is_ignored() {
        let mut f = fixture();
        f.layers.show_popup(PopupOptions::new(f.anchor), "menu", None).unwrap();
        assert!(f.layers.report_popup_size("old", Size::new(10, 10), &f.host).is_none());
        assert_eq!(f.layers.popup_phase(), PopupPhase::Measuring);
    }

    // ── Show delay ───────────────────────────────────────────────────

    #[test]
    fn show_delay_reveals_later() {
        let mut f = fixture();
        f.layers
            .show_popup(PopupOptions::new(f.anchor), "tip", Some(ms(300)))
            .unwrap();
        f.layers.report_popup_size("tip", Size::new(50, 10), &f.host);
        assert!(!f.layers.is_popup_visible());

        f.layers.advance(ms(299), &f.host);
        assert!(!f.layers.is_popup_visible());
        f.layers.advance(ms(300), &f.host);
        assert!(f.layers.is_popup_visible());
        assert!(f
            .layers
            .drain_notices()
            .contains(&Notice::PopupVisible { id: "tip".into() }));
    }

    #[test]
    fn dismiss_before_show_delay_clears_timer() {
        let mut f = fixture();
        f.layers
            .show_popup(PopupOptions::new(f.anchor), "tip", Some(ms(300)))
            .unwrap();
        assert_eq!(f.layers.pending_timers(), 2);
        f.layers.dismiss_popup("tip");
        assert_eq!(f.layers.pending_timers(), 0);
        f.layers.advance(ms(1000), &f.host);
        assert!(!f
            .layers
            .drain_notices()
            .iter()
            .any(|n| matches!(n, Notice::PopupVisible { .. })));
    }

    // ── Reposition loop ──────────────────────────────────────────────

    #[test]
    fn reposition_tick_tracks_anchor_movement() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "menu", options);
        f.layers.drain_notices();

        f.host.bounds.insert(f.anchor, Region::new(10, 100, 100, 30));
        f.layers.advance(ms(499), &f.host);
        assert_eq!(f.layers.popup_position().unwrap().popup_y, 40);

        f.layers.advance(ms(500), &f.host);
        assert_eq!(f.layers.popup_position().unwrap().popup_y, 130);
        assert_eq!(f.layers.drain_notices().len(), 1);
    }

    #[test]
    fn unchanged_geometry_emits_nothing() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "menu", options);
        f.layers.drain_notices();
        f.layers.advance(ms(2000), &f.host);
        assert!(f.layers.drain_notices().is_empty());
    }

    #[test]
    fn anchor_lost_dismisses() {
        let mut f = fixture();
        let (dismissed, on_dismiss) = counter();
        let options = PopupOptions::new(f.anchor).on_dismiss(on_dismiss);
        show_positioned(&mut f, "menu", options);
        f.host.bounds.remove(&f.anchor);
        f.layers.advance(ms(500), &f.host);
        assert_eq!(f.layers.popup_phase(), PopupPhase::Idle);
        assert_eq!(dismissed.get(), 1);
        assert_eq!(f.layers.pending_timers(), 0);
        assert!(f.layers.drain_notices().contains(&Notice::PopupDismissed {
            id: "menu".into(),
            reason: DismissReason::AnchorLost,
        }));
    }

    #[test]
    fn reposition_now_uses_fresh_viewport() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "menu", options);
        f.host.viewport = Size::new(800, 45);
        let result = f.layers.reposition_now(&f.host).unwrap();
        assert_eq!(result.anchor_position, Placement::Right);
        assert_eq!(result.constrained_popup_height, 45);
    }

    #[test]
    fn unresolvable_options_dismiss_with_own_reason() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor).inner_positioning(true);
        f.layers.show_popup(options, "menu", None).unwrap();
        if let Some(popup) = f.layers.state.popup_mut() {
            popup.priorities = vec![Placement::Context];
        }
        assert!(f.layers.report_popup_size("menu", Size::new(20, 5), &f.host).is_none());
        assert_eq!(f.layers.popup_phase(), PopupPhase::Idle);
        assert!(f.layers.drain_notices().contains(&Notice::PopupDismissed {
            id: "menu".into(),
            reason: DismissReason::Unpositionable,
        }));
    }

    // ── Auto-dismiss ─────────────────────────────────────────────────

    #[test]
    fn auto_dismiss_fires_after_delay() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "hover", options);
        assert!(f.layers.auto_dismiss_popup("hover", Some(ms(100))));
        assert_eq!(f.layers.popup_phase(), PopupPhase::Dismissing);
        assert!(f.layers.popup_position().is_some());

        f.layers.advance(ms(99), &f.host);
        assert_eq!(f.layers.popup_phase(), PopupPhase::Dismissing);
        f.layers.advance(ms(100), &f.host);
        assert_eq!(f.layers.popup_phase(), PopupPhase::Idle);
        assert_eq!(f.layers.pending_timers(), 0);
    }

    #[test]
    fn auto_dismiss_defaults_to_zero_delay() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "hover", options);
        f.layers.auto_dismiss_popup("hover", None);
        f.layers.advance(Duration::ZERO, &f.host);
        assert_eq!(f.layers.popup_phase(), PopupPhase::Idle);
    }

    #[test]
    fn dismissing_popup_is_not_repositioned() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        let before = show_positioned(&mut f, "hover", options);
        f.layers.auto_dismiss_popup("hover", Some(ms(800)));
        f.host.bounds.insert(f.anchor, Region::new(10, 200, 100, 30));
        f.layers.advance(ms(600), &f.host);
        assert_eq!(f.layers.popup_position(), Some(before));
    }

    #[test]
    fn cancel_auto_dismiss_restores_positioned() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "hover", options);
        f.layers.auto_dismiss_popup("hover", Some(ms(100)));
        assert!(f.layers.cancel_auto_dismiss("hover", &f.host));
        f.layers.advance(ms(200), &f.host);
        assert_eq!(f.layers.popup_phase(), PopupPhase::Positioned);
        assert!(!f.layers.cancel_auto_dismiss("hover", &f.host));
    }

    #[test]
    fn auto_dismiss_before_measurement_fires() {
        let mut f = fixture();
        let (dismissed, on_dismiss) = counter();
        let options = PopupOptions::new(f.anchor).on_dismiss(on_dismiss);
        f.layers.show_popup(options, "hover", None).unwrap();
        assert!(f.layers.auto_dismiss_popup("hover", Some(ms(200))));
        assert_eq!(f.layers.popup_phase(), PopupPhase::Dismissing);

        assert!(f.layers.report_popup_size("hover", Size::new(200, 150), &f.host).is_none());
        assert!(f.layers.popup_position().is_none());

        f.layers.advance(ms(200), &f.host);
        assert_eq!(f.layers.popup_phase(), PopupPhase::Idle);
        assert_eq!(dismissed.get(), 1);
        assert_eq!(f.layers.pending_timers(), 0);
        assert!(f.layers.drain_notices().contains(&Notice::PopupDismissed {
            id: "hover".into(),
            reason: DismissReason::AutoDismiss,
        }));
    }

    #[test]
    fn cancel_after_measuring_during_dismissal_positions() {
        let mut f = fixture();
        f.layers.show_popup(PopupOptions::new(f.anchor), "hover", None).unwrap();
        f.layers.auto_dismiss_popup("hover", Some(ms(200)));
        assert!(f.layers.report_popup_size("hover", Size::new(200, 150), &f.host).is_none());

        assert!(f.layers.cancel_auto_dismiss("hover", &f.host));
        assert_eq!(f.layers.popup_phase(), PopupPhase::Positioned);
        let result = f.layers.popup_position().unwrap();
        assert_eq!((result.popup_x, result.popup_y), (10, 40));

        f.layers.advance(ms(5000), &f.host);
        assert_eq!(f.layers.popup_phase(), PopupPhase::Positioned);
    }

    #[test]
    fn cancel_before_measurement_waits_for_size() {
        let mut f = fixture();
        f.layers.show_popup(PopupOptions::new(f.anchor), "hover", None).unwrap();
        f.layers.auto_dismiss_popup("hover", Some(ms(200)));
        assert!(f.layers.cancel_auto_dismiss("hover", &f.host));
        assert_eq!(f.layers.popup_phase(), PopupPhase::Measuring);

        f.layers.advance(ms(300), &f.host);
        assert_eq!(f.layers.popup_phase(), PopupPhase::Measuring);
        assert!(f.layers.report_popup_size("hover", Size::new(200, 150), &f.host).is_some());
        assert_eq!(f.layers.popup_phase(), PopupPhase::Positioned);
    }

    #[test]
    fn auto_dismiss_of_replaced_popup_is_ignored() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "first", options);
        f.layers.auto_dismiss_popup("first", Some(ms(100)));
        let options = PopupOptions::new(f.other_anchor);
        show_positioned(&mut f, "second", options);
        assert!(!f.layers.auto_dismiss_popup("first", None));
        f.layers.advance(ms(200), &f.host);
        assert_eq!(f.layers.active_popup_id(), Some("second"));
    }

    // ── Dismiss ──────────────────────────────────────────────────────

    #[test]
    fn stale_dismiss_is_ignored() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "second", options);
        assert!(!f.layers.dismiss_popup("first"));
        assert_eq!(f.layers.active_popup_id(), Some("second"));
        assert!(f.layers.dismiss_popup("second"));
        assert!(!f.layers.dismiss_popup("second"));
    }

    #[test]
    fn escape_dismisses_popup() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "menu", options);
        let esc = KeyEvent::new(Key::Escape, crate::event::Modifiers::NONE);
        assert!(f.layers.key_down(esc));
        assert!(!f.layers.key_down(esc));
    }

    // ── Outside press ────────────────────────────────────────────────

    #[test]
    fn press_inside_popup_keeps_it() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "menu", options);
        assert!(!f.layers.pointer_down(PointerEvent::down(50, 100), &f.host));
        assert_eq!(f.layers.popup_phase(), PopupPhase::Positioned);
    }

    #[test]
    fn press_elsewhere_dismisses() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "menu", options);
        assert!(f.layers.pointer_down(PointerEvent::down(600, 500), &f.host));
        assert_eq!(f.layers.popup_phase(), PopupPhase::Idle);
    }

    #[test]
    fn prevent_dismiss_on_press_keeps_it() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor).prevent_dismiss_on_press(true);
        show_positioned(&mut f, "menu", options);
        assert!(!f.layers.pointer_down(PointerEvent::down(600, 500), &f.host));
        assert_eq!(f.layers.popup_phase(), PopupPhase::Positioned);
    }

    #[test]
    fn anchor_press_with_toggle_is_left_to_anchor() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor).with_trigger(f.trigger).dismiss_if_shown(true);
        show_positioned(&mut f, "menu", options);
        assert!(!f.layers.pointer_down(PointerEvent::down(20, 20), &f.host));
        assert!(!f.layers.pointer_down(PointerEvent::down(705, 15), &f.host));
        assert_eq!(f.layers.popup_phase(), PopupPhase::Positioned);
    }

    #[test]
    fn anchor_press_fires_callback_after_delay() {
        let mut f = fixture();
        f.layers = LayerCoordinator::new(LayerConfig::new().with_anchor_pressed_delay(ms(50)));
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        let options = PopupOptions::new(f.anchor).on_anchor_pressed(move |e| *s.borrow_mut() = Some(e));
        show_positioned(&mut f, "menu", options);

        let press = PointerEvent::down(20, 20);
        assert!(f.layers.pointer_down(press, &f.host));
        assert!(seen.borrow().is_none());

        f.layers.advance(ms(50), &f.host);
        assert_eq!(*seen.borrow(), Some(press));
        assert!(f
            .layers
            .drain_notices()
            .contains(&Notice::AnchorPressed { id: "menu".into() }));
    }

    #[test]
    fn trigger_press_without_toggle_dismisses_without_callback() {
        let mut f = fixture();
        let called = Rc::new(Cell::new(false));
        let c = called.clone();
        let options = PopupOptions::new(f.anchor)
            .with_trigger(f.trigger)
            .on_anchor_pressed(move |_| c.set(true));
        show_positioned(&mut f, "menu", options);
        assert!(f.layers.pointer_down(PointerEvent::down(705, 15), &f.host));
        f.layers.advance(ms(10), &f.host);
        assert!(!called.get());
    }

    // ── Modals ───────────────────────────────────────────────────────

    #[test]
    fn showing_modal_dismisses_popup() {
        let mut f = fixture();
        let options = PopupOptions::new(f.anchor);
        show_positioned(&mut f, "menu", options);
        f.layers.show_modal("confirm", ModalEntry::new()).unwrap();
        assert_eq!(f.layers.popup_phase(), PopupPhase::Idle);
        assert_eq!(f.layers.top_modal(), Some("confirm"));
        let notices = f.layers.drain_notices();
        assert!(notices.contains(&Notice::PopupDismissed {
            id: "menu".into(),
            reason: DismissReason::ModalShown,
        }));
        assert_eq!(
            notices.last(),
            Some(&Notice::ModalStackChanged { top: Some("confirm".into()), depth: 1 })
        );
    }

    #[test]
    fn modal_stack_order_and_dismiss() {
        let mut f = fixture();
        let (dismissed, on_dismiss) = counter();
        f.layers.show_modal("a", ModalEntry::new().on_dismiss(on_dismiss)).unwrap();
        f.layers.show_modal("b", ModalEntry::new()).unwrap();
        assert_eq!(f.layers.modal_ids(), vec!["a".to_string(), "b".to_string()]);
        assert!(f.layers.is_modal_displayed(Some("a")));
        assert!(f.layers.is_modal_displayed(None));

        assert!(f.layers.dismiss_modal("a"));
        assert_eq!(dismissed.get(), 1);
        assert_eq!(f.layers.top_modal(), Some("b"));
        assert!(!f.layers.dismiss_modal("a"));
    }

    #[test]
    fn modal_without_id_is_rejected() {
        let mut f = fixture();
        assert_eq!(
            f.layers.show_modal("", ModalEntry::new()),
            Err(LayerError::MissingId { kind: "modal" })
        );
    }
}
