//! Node types: NodeId, NodeData.

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a mounted component. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Data associated with a single mounted component.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Component name, used only for diagnostics.
    pub name: String,
    /// Whether this component can receive keyboard focus.
    pub focusable: bool,
    /// Opt-in for trapping focus inside this subtree (modal-like containers).
    pub restrict_focus_within: bool,
    /// Opt-in for limiting sequential navigation to this subtree without trapping.
    pub limit_focus_within: bool,
}

impl NodeData {
    /// Create a new `NodeData` with the given name and no focus behaviour.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            focusable: false,
            restrict_focus_within: false,
            limit_focus_within: false,
        }
    }

    /// Set whether this component can receive focus (builder).
    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    /// Allow this component to own a focus restriction scope (builder).
    pub fn restrict_focus_within(mut self, restrict: bool) -> Self {
        self.restrict_focus_within = restrict;
        self
    }

    /// Allow this component to own a focus limiting scope (builder).
    pub fn limit_focus_within(mut self, limit: bool) -> Self {
        self.limit_focus_within = limit;
        self
    }

    /// Whether a focus scope may be activated on this component.
    pub fn can_scope_focus(&self) -> bool {
        self.restrict_focus_within || self.limit_focus_within
    }
}
