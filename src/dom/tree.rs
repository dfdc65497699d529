//! The mounted component tree.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};

/// Mounted components in a slotmap arena with parent and child links.
///
/// Focus scopes are defined over this tree: a handle belongs to a scope when
/// its node is the scope owner or one of the owner's descendants.
#[derive(Default)]
pub struct Dom {
    nodes: SlotMap<NodeId, NodeData>,
    links: SecondaryMap<NodeId, Links>,
    root: Option<NodeId>,
}

#[derive(Default)]
struct Links {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `data` as the last child of `parent`, or parentless when `None`.
    /// The first parentless node mounted becomes the root.
    ///
    /// An unknown `parent` leaves the node parentless.
    pub fn mount(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        let parent = parent.filter(|&p| self.nodes.contains_key(p));
        self.links.insert(id, Links { parent, children: Vec::new() });
        match parent {
            Some(p) => self.link_child(p, id),
            None => {
                self.root.get_or_insert(id);
            }
        }
        id
    }

    /// Unmount a node with its whole subtree, returning the removed ids in
    /// pre-order. Unknown ids remove nothing.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        let removed = self.walk_depth_first(id);
        if removed.is_empty() {
            return removed;
        }
        self.unlink(id);
        for &node in &removed {
            self.links.remove(node);
            self.nodes.remove(node);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        removed
    }

    /// Move `node` and its subtree to the end of `new_parent`'s children.
    /// Ignored when either id is unknown or `new_parent` lies inside `node`.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        if !self.contains(node) || !self.contains(new_parent) || self.is_within(new_parent, node) {
            return;
        }
        self.unlink(node);
        if let Some(links) = self.links.get_mut(node) {
            links.parent = Some(new_parent);
        }
        self.link_child(new_parent, node);
    }

    fn link_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(links) = self.links.get_mut(parent) {
            links.children.push(child);
        }
    }

    fn unlink(&mut self, node: NodeId) {
        let parent = self.links.get_mut(node).and_then(|links| links.parent.take());
        if let Some(links) = parent.and_then(|p| self.links.get_mut(p)) {
            links.children.retain(|&c| c != node);
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.links.get(id).and_then(|links| links.parent)
    }

    /// Children in mount order; empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.links.get(id).map_or(&[], |links| links.children.as_slice())
    }

    /// Ancestors of `id`, nearest first, excluding `id`.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Whether `id` is `owner` or lies somewhere beneath it.
    pub fn is_within(&self, id: NodeId, owner: NodeId) -> bool {
        self.contains(id) && (id == owner || self.ancestors(id).any(|a| a == owner))
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// `start` and its descendants in document (pre-order) order.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut pending = vec![start];
        while let Some(node) = pending.pop() {
            if self.contains(node) {
                order.push(node);
                pending.extend(self.children(node).iter().rev());
            }
        }
        order
    }
}
