//! The root context object.
//!
//! [`LayerRoot`] owns the component tree, focus scopes, Tab order and the
//! popup/modal coordinator for one view tree. Nothing here is global: tests
//! and hosts create as many roots as they like and drop them when done.

use std::time::Duration;

use tracing::debug;

use crate::config::LayerConfig;
use crate::dom::{Dom, NodeData, NodeId};
use crate::error::Result;
use crate::event::{InputEvent, Key, Notice};
use crate::focus::{FocusChain, FocusId, FocusScopeManager};
use crate::layer::{LayerCoordinator, LayerHost, ModalEntry, PopupOptions};

/// Per-tree state: components, focus and layers.
pub struct LayerRoot {
    dom: Dom,
    focus: FocusScopeManager,
    chain: FocusChain,
    layers: LayerCoordinator,
}

impl LayerRoot {
    pub fn new(config: LayerConfig) -> Self {
        Self {
            dom: Dom::new(),
            focus: FocusScopeManager::new(),
            chain: FocusChain::new(),
            layers: LayerCoordinator::new(config),
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn focus(&self) -> &FocusScopeManager {
        &self.focus
    }

    pub fn chain(&self) -> &FocusChain {
        &self.chain
    }

    pub fn layers(&self) -> &LayerCoordinator {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerCoordinator {
        &mut self.layers
    }

    // ── Tree ─────────────────────────────────────────────────────────

    /// Mount a component under `parent`, or as the root when `parent` is `None`.
    pub fn mount(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        self.dom.mount(parent, data)
    }

    /// Unmount `node` and its subtree, dropping their focus handles and scopes.
    pub fn unmount(&mut self, node: NodeId) -> Vec<NodeId> {
        let removed = self.dom.remove(node);
        if !removed.is_empty() {
            self.focus.forget_nodes(&self.dom, &removed);
            self.rebuild_chain();
            debug!(count = removed.len(), "components unmounted");
        }
        removed
    }

    /// Move `node` under `new_parent` and re-evaluate focus restriction.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        self.dom.reparent(node, new_parent);
        self.focus.refresh(&self.dom);
        self.rebuild_chain();
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// Register a focusable component with its requested tab index.
    ///
    /// Returns `None` unless `node` is mounted and marked focusable.
    pub fn register_focusable(&mut self, node: NodeId, tab_index: i32) -> Option<FocusId> {
        if !self.dom.get(node).is_some_and(|data| data.focusable) {
            debug!(?node, "registration of non-focusable node ignored");
            return None;
        }
        let id = self.focus.register(&self.dom, node, tab_index);
        self.rebuild_chain();
        Some(id)
    }

    pub fn unregister_focusable(&mut self, id: FocusId) {
        self.focus.unregister(id);
        self.rebuild_chain();
    }

    /// The handle holding focus.
    pub fn focused(&self) -> Option<FocusId> {
        self.focus.focused()
    }

    /// Move focus to `id` if it is reachable.
    pub fn focus_handle(&mut self, id: FocusId) -> bool {
        if !self.chain.focus_handle(id) {
            return false;
        }
        self.focus.set_focused(Some(id));
        true
    }

    pub fn focus_next(&mut self) -> Option<FocusId> {
        let id = self.chain.focus_next();
        self.focus.set_focused(id);
        id
    }

    pub fn focus_previous(&mut self) -> Option<FocusId> {
        let id = self.chain.focus_previous();
        self.focus.set_focused(id);
        id
    }

    /// Activate a focus scope on `owner` outside of any modal.
    pub fn restrict_focus(&mut self, owner: NodeId) -> Result<()> {
        self.focus.activate(&self.dom, owner)?;
        self.rebuild_chain();
        Ok(())
    }

    /// Release the scope owned by `owner`, moving focus back where it was.
    ///
    /// Returns the handle that regained focus. A restore target that is still
    /// unreachable (restricted by a lower scope) leaves focus cleared.
    pub fn release_focus(&mut self, owner: NodeId) -> Option<FocusId> {
        let target = self.focus.release(&self.dom, owner);
        self.rebuild_chain();
        let handle = target.filter(|&handle| self.chain.focus_handle(handle))?;
        self.focus.set_focused(Some(handle));
        self.layers.notices_mut().push(Notice::FocusRestored { handle });
        Some(handle)
    }

    // ── Layers ───────────────────────────────────────────────────────

    /// See [`LayerCoordinator::show_popup`].
    pub fn show_popup(
        &mut self,
        options: PopupOptions,
        id: &str,
        show_delay: Option<Duration>,
    ) -> Result<bool> {
        Ok(self.layers.show_popup(options, id, show_delay)?)
    }

    pub fn dismiss_popup(&mut self, id: &str) -> bool {
        self.layers.dismiss_popup(id)
    }

    /// Show a modal and trap focus inside its focus root, if it names one.
    ///
    /// Both the id and the focus root are validated before anything changes.
    pub fn show_modal(&mut self, id: &str, entry: ModalEntry) -> Result<()> {
        if let Some(root) = entry.focus_root {
            FocusScopeManager::can_activate(&self.dom, root)?;
        }
        let new_root = entry.focus_root;
        let old_root = self.layers.modal(id).and_then(|m| m.focus_root);
        self.layers.show_modal(id, entry)?;

        if let Some(old) = old_root.filter(|old| Some(*old) != new_root) {
            self.focus.release(&self.dom, old);
        }
        if let Some(root) = new_root {
            self.focus.activate(&self.dom, root)?;
        }
        self.rebuild_chain();
        Ok(())
    }

    /// Dismiss a modal, release its focus scope and restore focus.
    pub fn dismiss_modal(&mut self, id: &str) -> bool {
        let root = self.layers.modal(id).and_then(|m| m.focus_root);
        if !self.layers.dismiss_modal(id) {
            return false;
        }
        match root {
            Some(root) => {
                self.release_focus(root);
            }
            None => self.rebuild_chain(),
        }
        true
    }

    /// Dismiss every modal, topmost first.
    pub fn dismiss_all_modals(&mut self) -> usize {
        let ids = self.layers.modal_ids();
        for id in ids.iter().rev() {
            self.dismiss_modal(id);
        }
        ids.len()
    }

    // ── Input & time ─────────────────────────────────────────────────

    /// Route one input event. Returns whether it was consumed.
    ///
    /// Tab / Shift+Tab move focus. Escape closes the popup, or else the top
    /// modal when it allows it. Presses run outside-press dismissal. A resize
    /// re-resolves the popup against the host's new viewport.
    pub fn handle_input(&mut self, event: InputEvent, host: &impl LayerHost) -> bool {
        match event {
            InputEvent::Key(key) if key.code == Key::Tab || key.code == Key::BackTab => {
                let moved = if key.is_reverse_tab() {
                    self.focus_previous()
                } else {
                    self.focus_next()
                };
                moved.is_some()
            }
            InputEvent::Key(key) if key.code == Key::Escape => {
                if self.layers.key_down(key) {
                    return true;
                }
                let top = self
                    .layers
                    .top_modal()
                    .filter(|id| self.layers.modal(id).is_some_and(|m| m.dismiss_on_escape))
                    .map(str::to_owned);
                match top {
                    Some(id) => self.dismiss_modal(&id),
                    None => false,
                }
            }
            InputEvent::Key(_) => false,
            InputEvent::Pointer(pointer) if pointer.is_down() => self.layers.pointer_down(pointer, host),
            InputEvent::Pointer(_) => false,
            InputEvent::Resize(_) => self.layers.reposition_now(host).is_some(),
        }
    }

    /// Advance virtual time, firing due timers.
    pub fn advance(&mut self, now: Duration, host: &impl LayerHost) {
        self.layers.advance(now, host);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.layers.drain_notices()
    }

    fn rebuild_chain(&mut self) {
        self.chain.rebuild(&self.dom, &self.focus);
        self.focus.set_focused(self.chain.current_handle());
    }
}

impl Default for LayerRoot {
    fn default() -> Self {
        Self::new(LayerConfig::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
