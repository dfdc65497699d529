//! Modal stack: ordered by show time, last is topmost and the only one rendered.

use std::fmt;

use crate::dom::NodeId;

use super::popup::DismissCallback;

/// A modal registered with the coordinator.
pub struct ModalEntry {
    /// Container whose subtree gets a focus restriction scope while shown.
    pub focus_root: Option<NodeId>,
    /// Whether Escape closes this modal when it is on top.
    pub dismiss_on_escape: bool,
    pub on_dismiss: Option<DismissCallback>,
}

impl ModalEntry {
    pub fn new() -> Self {
        Self {
            focus_root: None,
            dismiss_on_escape: true,
            on_dismiss: None,
        }
    }

    pub fn with_focus_root(mut self, root: NodeId) -> Self {
        self.focus_root = Some(root);
        self
    }

    pub fn dismiss_on_escape(mut self, dismiss: bool) -> Self {
        self.dismiss_on_escape = dismiss;
        self
    }

    pub fn on_dismiss(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_dismiss = Some(Box::new(f));
        self
    }

    /// Run and consume the dismiss callback, if any.
    pub(crate) fn fire_dismiss(&mut self) {
        if let Some(callback) = self.on_dismiss.take() {
            callback();
        }
    }
}

impl Default for ModalEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalEntry")
            .field("focus_root", &self.focus_root)
            .field("dismiss_on_escape", &self.dismiss_on_escape)
            .field("on_dismiss", &self.on_dismiss.is_some())
            .finish()
    }
}

/// Modals keyed by id, bottom first.
#[derive(Debug, Default)]
pub struct ModalStack {
    entries: Vec<(String, ModalEntry)>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a modal on top. A modal already registered under `id` is taken
    /// out of the stack and returned.
    pub fn push(&mut self, id: impl Into<String>, entry: ModalEntry) -> Option<ModalEntry> {
        let id = id.into();
        let replaced = self.remove(&id);
        self.entries.push((id, entry));
        replaced
    }

    /// Remove the modal with `id` wherever it sits.
    pub fn remove(&mut self, id: &str) -> Option<ModalEntry> {
        let pos = self.entries.iter().position(|(key, _)| key == id)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, id: &str) -> Option<&ModalEntry> {
        self.entries.iter().find(|(key, _)| key == id).map(|(_, entry)| entry)
    }

    /// The topmost modal.
    pub fn top(&self) -> Option<(&str, &ModalEntry)> {
        self.entries.last().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Ids bottom first.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
