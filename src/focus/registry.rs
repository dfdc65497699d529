//! Registry of mounted focusable components.

use std::collections::BTreeMap;

use crate::dom::NodeId;

/// Tab index assigned to a handle that sequential navigation must skip.
pub const UNREACHABLE_TAB_INDEX: i32 = -1;

/// Identifier of a registered focusable. Ids increase monotonically and are
/// never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FocusId(u64);

impl FocusId {
    /// The raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A mounted focusable component and its tab-order bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusableHandle {
    pub id: FocusId,
    /// The component this handle belongs to.
    pub node: NodeId,
    tab_index: i32,
    /// Tab index saved while the handle is restricted.
    original_tab_index: Option<i32>,
}

impl FocusableHandle {
    /// Whether the handle is currently hidden from sequential navigation.
    pub fn is_restricted(&self) -> bool {
        self.original_tab_index.is_some()
    }

    /// The tab index navigation should use right now.
    pub fn effective_tab_index(&self) -> i32 {
        self.tab_index
    }

    /// The tab index the component asked for, regardless of restriction.
    pub fn original_tab_index(&self) -> i32 {
        self.original_tab_index.unwrap_or(self.tab_index)
    }

    /// Whether Tab / Shift+Tab can land on this handle.
    pub fn is_reachable(&self) -> bool {
        self.tab_index >= 0
    }

    pub(crate) fn restrict(&mut self) -> bool {
        if self.original_tab_index.is_some() {
            return false;
        }
        self.original_tab_index = Some(self.tab_index);
        self.tab_index = UNREACHABLE_TAB_INDEX;
        true
    }

    pub(crate) fn unrestrict(&mut self) -> bool {
        match self.original_tab_index.take() {
            Some(index) => {
                self.tab_index = index;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_tab_index(&mut self, index: i32) {
        match self.original_tab_index.as_mut() {
            Some(saved) => *saved = index,
            None => self.tab_index = index,
        }
    }
}

/// All currently registered focusable handles, ordered by id.
#[derive(Debug, Default)]
pub struct FocusRegistry {
    next_id: u64,
    handles: BTreeMap<FocusId, FocusableHandle>,
}

impl FocusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handle for `node` and return its fresh id.
    pub fn insert(&mut self, node: NodeId, tab_index: i32) -> FocusId {
        self.next_id += 1;
        let id = FocusId(self.next_id);
        self.handles.insert(
            id,
            FocusableHandle {
                id,
                node,
                tab_index,
                original_tab_index: None,
            },
        );
        id
    }

    /// Remove a handle. Returns `None` when it was not registered.
    pub fn remove(&mut self, id: FocusId) -> Option<FocusableHandle> {
        self.handles.remove(&id)
    }

    pub fn get(&self, id: FocusId) -> Option<&FocusableHandle> {
        self.handles.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: FocusId) -> Option<&mut FocusableHandle> {
        self.handles.get_mut(&id)
    }

    pub fn contains(&self, id: FocusId) -> bool {
        self.handles.contains_key(&id)
    }

    /// Handles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FocusableHandle> {
        self.handles.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut FocusableHandle> {
        self.handles.values_mut()
    }

    /// Ids of the handles registered for `node`.
    pub fn ids_for_node(&self, node: NodeId) -> Vec<FocusId> {
        self.handles
            .values()
            .filter(|h| h.node == node)
            .map(|h| h.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
