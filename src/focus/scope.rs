//! Focus restriction scopes.
//!
//! Scopes form a stack keyed by owner node. Only the top scope is active:
//! every registered handle outside the active owner's subtree is restricted
//! (tab index forced to [`UNREACHABLE_TAB_INDEX`], original cached). Releasing
//! the top scope clears all restriction and re-applies the scope beneath it.
//!
//! # Invariants
//!
//! - The stack never holds the same owner twice.
//! - A handle is restricted iff a scope is active and the handle's node is not
//!   within the active owner's subtree (after every public operation).
//!
//! [`UNREACHABLE_TAB_INDEX`]: super::UNREACHABLE_TAB_INDEX

use tracing::{debug, trace};

use crate::dom::{Dom, NodeId};

use super::registry::{FocusId, FocusRegistry, FocusableHandle};
use super::FocusError;

#[derive(Debug, Clone, Copy)]
struct ScopeEntry {
    owner: NodeId,
    /// Handle that had focus when this scope was first activated.
    restore: Option<FocusId>,
}

/// Owns the focusable registry and the restriction scope stack.
#[derive(Debug, Default)]
pub struct FocusScopeManager {
    registry: FocusRegistry,
    stack: Vec<ScopeEntry>,
    focused: Option<FocusId>,
}

impl FocusScopeManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registry ─────────────────────────────────────────────────────

    /// Register a mounted focusable component.
    ///
    /// If a scope is active and `node` is outside it, the new handle starts
    /// out restricted.
    pub fn register(&mut self, dom: &Dom, node: NodeId, tab_index: i32) -> FocusId {
        let id = self.registry.insert(node, tab_index);
        if let Some(owner) = self.active_scope() {
            if !dom.is_within(node, owner) {
                if let Some(handle) = self.registry.get_mut(id) {
                    handle.restrict();
                }
            }
        }
        trace!(id = id.get(), restricted = self.is_restricted(id), "focusable registered");
        id
    }

    /// Forget a handle. Unknown ids are ignored.
    pub fn unregister(&mut self, id: FocusId) {
        if let Some(mut handle) = self.registry.remove(id) {
            handle.unrestrict();
            trace!(id = id.get(), "focusable unregistered");
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
    }

    /// Change a handle's requested tab index. While restricted the new value
    /// is cached and applied on release.
    pub fn set_tab_index(&mut self, id: FocusId, tab_index: i32) {
        if let Some(handle) = self.registry.get_mut(id) {
            handle.set_tab_index(tab_index);
        }
    }

    pub fn handle(&self, id: FocusId) -> Option<&FocusableHandle> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &FocusRegistry {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn is_restricted(&self, id: FocusId) -> bool {
        self.registry.get(id).is_some_and(FocusableHandle::is_restricted)
    }

    /// Effective tab index, `None` if the handle is not registered.
    pub fn effective_tab_index(&self, id: FocusId) -> Option<i32> {
        self.registry.get(id).map(FocusableHandle::effective_tab_index)
    }

    // ── Focus tracking ───────────────────────────────────────────────

    /// Record which handle currently holds focus.
    pub fn set_focused(&mut self, id: Option<FocusId>) {
        self.focused = id.filter(|id| self.registry.contains(*id));
    }

    pub fn focused(&self) -> Option<FocusId> {
        self.focused
    }

    // ── Scopes ───────────────────────────────────────────────────────

    /// The owner of the active (top) scope.
    pub fn active_scope(&self) -> Option<NodeId> {
        self.stack.last().map(|entry| entry.owner)
    }

    /// Owners on the stack, bottom first.
    pub fn scopes(&self) -> Vec<NodeId> {
        self.stack.iter().map(|entry| entry.owner).collect()
    }

    pub fn is_scope_pushed(&self, owner: NodeId) -> bool {
        self.stack.iter().any(|entry| entry.owner == owner)
    }

    /// Check that `owner` may own a scope without touching the stack.
    pub fn can_activate(dom: &Dom, owner: NodeId) -> Result<(), FocusError> {
        let data = dom.get(owner).ok_or(FocusError::UnknownOwner(owner))?;
        if data.can_scope_focus() {
            Ok(())
        } else {
            Err(FocusError::NotRestrictable(owner))
        }
    }

    /// Make `owner` the active scope.
    ///
    /// Re-activating the current top is a no-op. An owner already lower in the
    /// stack is moved to the top, keeping its original restore target.
    ///
    /// # Errors
    ///
    /// [`FocusError::UnknownOwner`] if `owner` is not mounted,
    /// [`FocusError::NotRestrictable`] if it did not opt in to focus scoping.
    pub fn activate(&mut self, dom: &Dom, owner: NodeId) -> Result<(), FocusError> {
        Self::can_activate(dom, owner)?;
        if self.active_scope() == Some(owner) {
            return Ok(());
        }

        let entry = match self.stack.iter().position(|entry| entry.owner == owner) {
            Some(pos) => self.stack.remove(pos),
            None => ScopeEntry {
                owner,
                restore: self.focused,
            },
        };
        self.stack.push(entry);
        let restricted = self.apply(dom);
        debug!(?owner, depth = self.stack.len(), restricted, "focus scope activated");
        Ok(())
    }

    /// Remove `owner` from the stack.
    ///
    /// Not on the stack: no-op. Active scope: restriction is cleared and the
    /// scope beneath (if any) is re-applied. Returns the handle that held focus
    /// when the released scope activated, if it is still registered, so the
    /// caller can move focus back.
    pub fn release(&mut self, dom: &Dom, owner: NodeId) -> Option<FocusId> {
        let pos = self.stack.iter().position(|entry| entry.owner == owner)?;
        let was_top = pos + 1 == self.stack.len();
        let entry = self.stack.remove(pos);
        if !was_top {
            debug!(?owner, "suspended focus scope released");
            return None;
        }

        self.clear_restriction();
        let restricted = self.apply(dom);
        debug!(?owner, depth = self.stack.len(), restricted, "focus scope released");

        let restore = entry.restore.filter(|id| self.registry.contains(*id));
        if restore.is_some() {
            self.focused = restore;
        }
        restore
    }

    /// Drop handles and scopes that belong to unmounted nodes.
    pub fn forget_nodes(&mut self, dom: &Dom, removed: &[NodeId]) {
        let stale: Vec<FocusId> = self
            .registry
            .iter()
            .filter(|h| removed.contains(&h.node))
            .map(|h| h.id)
            .collect();
        for id in stale {
            self.unregister(id);
        }
        for &node in removed {
            if self.is_scope_pushed(node) {
                self.release(dom, node);
            }
        }
    }

    /// Re-evaluate restriction against the current tree (after reparenting).
    pub fn refresh(&mut self, dom: &Dom) {
        self.apply(dom);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn clear_restriction(&mut self) {
        for handle in self.registry.iter_mut() {
            handle.unrestrict();
        }
    }

    /// Bring every handle in line with the active scope. Returns how many
    /// handles end up restricted.
    fn apply(&mut self, dom: &Dom) -> usize {
        let Some(owner) = self.active_scope() else {
            self.clear_restriction();
            return 0;
        };
        let mut restricted = 0;
        for handle in self.registry.iter_mut() {
            if dom.is_within(handle.node, owner) {
                handle.unrestrict();
            } else {
                handle.restrict();
                restricted += 1;
            }
        }
        restricted
    }
}

// ===========================================================================
// Tests
// ===========================================================================
