//! Sequential keyboard navigation order.

use std::collections::HashMap;

use crate::dom::Dom;

use super::registry::FocusId;
use super::scope::FocusScopeManager;

/// Ordered list of reachable handles for Tab / Shift+Tab.
///
/// Handles with a positive tab index come first in ascending index order,
/// then handles with index zero in tree order. Restricted handles (and any
/// with a negative index) are skipped. Focus cycles in both directions.
#[derive(Debug, Default)]
pub struct FocusChain {
    handles: Vec<FocusId>,
    current: Option<usize>,
}

impl FocusChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the chain from the registry.
    ///
    /// If `focused` is still reachable it stays current, otherwise focus is cleared.
    pub fn rebuild(&mut self, dom: &Dom, focus: &FocusScopeManager) {
        let previous = focus.focused().or_else(|| self.current_handle());

        let tree_order: HashMap<_, usize> = match dom.root() {
            Some(root) => dom
                .walk_depth_first(root)
                .into_iter()
                .enumerate()
                .map(|(i, node)| (node, i))
                .collect(),
            None => HashMap::new(),
        };

        let mut reachable: Vec<(i32, usize, FocusId)> = focus
            .registry()
            .iter()
            .filter(|h| h.is_reachable())
            .filter_map(|h| {
                let position = *tree_order.get(&h.node)?;
                Some((h.effective_tab_index(), position, h.id))
            })
            .collect();
        reachable.sort_by_key(|&(index, position, id)| (index == 0, index, position, id));

        self.handles = reachable.into_iter().map(|(_, _, id)| id).collect();
        self.current = previous.and_then(|id| self.handles.iter().position(|&h| h == id));
    }

    /// The handle that currently has focus, if any.
    pub fn current_handle(&self) -> Option<FocusId> {
        self.current.and_then(|idx| self.handles.get(idx).copied())
    }

    /// Move to the next handle, wrapping around.
    pub fn focus_next(&mut self) -> Option<FocusId> {
        self.step(|at, len| at.map_or(0, |i| (i + 1) % len))
    }

    /// Move to the previous handle, wrapping around.
    pub fn focus_previous(&mut self) -> Option<FocusId> {
        self.step(|at, len| at.filter(|&i| i > 0).unwrap_or(len) - 1)
    }

    fn step(&mut self, pick: impl FnOnce(Option<usize>, usize) -> usize) -> Option<FocusId> {
        if self.handles.is_empty() {
            return None;
        }
        let at = pick(self.current, self.handles.len());
        self.current = Some(at);
        self.handles.get(at).copied()
    }

    /// Focus a specific handle. Returns `false` if it is not reachable.
    pub fn focus_handle(&mut self, id: FocusId) -> bool {
        self.current = self.handles.iter().position(|&h| h == id).or(self.current);
        self.current_handle() == Some(id)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Reachable handles in navigation order.
    pub fn handles(&self) -> &[FocusId] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
