//! Keyed child diffing.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::geometry::Offset;

/// A child key. Keys must be unique within a list and stable across renders.
pub trait ChildKey: Clone + Eq + Hash + Debug {
    /// Whether this value can identify a child at all.
    fn is_stable(&self) -> bool {
        true
    }
}

impl ChildKey for String {
    fn is_stable(&self) -> bool {
        !self.is_empty()
    }
}

impl ChildKey for &'static str {
    fn is_stable(&self) -> bool {
        !self.is_empty()
    }
}

macro_rules! int_child_key {
    ($($t:ty),*) => { $(impl ChildKey for $t {})* };
}

int_child_key!(u32, u64, usize, i32, i64);

/// Where each child currently sits on screen.
pub trait PositionSource<K> {
    fn position(&self, key: &K) -> Option<Offset>;
}

impl<K: Eq + Hash> PositionSource<K> for HashMap<K, Offset> {
    fn position(&self, key: &K) -> Option<Offset> {
        self.get(key).copied()
    }
}

/// Offset from a child's new position back to its old one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PositionDelta {
    pub left_delta: i32,
    pub top_delta: i32,
}

impl PositionDelta {
    /// `old - new`, so translating by the delta puts the child back where it was.
    pub fn between(old: Offset, new: Offset) -> Self {
        let d = old - new;
        Self { left_delta: d.x, top_delta: d.y }
    }

    pub fn is_zero(&self) -> bool {
        self.left_delta == 0 && self.top_delta == 0
    }
}

/// The classified result of one list edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEditSet<K> {
    /// Keys present now, absent before, in next order.
    pub added: Vec<K>,
    /// Keys present before, absent now, in previous order.
    pub removed: Vec<(K, PositionDelta)>,
    /// Surviving keys whose on-screen position changed, in next order.
    pub moved: Vec<(K, PositionDelta)>,
}

impl<K> ChildEditSet<K> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }
}

impl<K> Default for ChildEditSet<K> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            moved: Vec::new(),
        }
    }
}

/// Panic unless every key is stable and unique. A bad key list is an
/// integration bug, not a runtime condition.
pub(crate) fn assert_keys<K: ChildKey>(keys: &[K], which: &str) {
    let mut seen = HashSet::with_capacity(keys.len());
    for key in keys {
        assert!(key.is_stable(), "{which} children: key {key:?} is not a stable key");
        assert!(seen.insert(key), "{which} children: duplicate key {key:?}");
    }
}

/// Keys of `next` absent from `prev`, and of `prev` absent from `next`.
pub(crate) fn split_keys<K: ChildKey>(prev: &[K], next: &[K]) -> (Vec<K>, Vec<K>) {
    let prev_set: HashSet<&K> = prev.iter().collect();
    let next_set: HashSet<&K> = next.iter().collect();
    let added = next.iter().filter(|k| !prev_set.contains(k)).cloned().collect();
    let removed = prev.iter().filter(|k| !next_set.contains(k)).cloned().collect();
    (added, removed)
}

/// `next` with every removed key re-inserted right after its previous
/// neighbour, so leaving children can still be drawn while they fade.
pub(crate) fn transient_order<K: ChildKey>(prev: &[K], next: &[K], removed: &[K]) -> Vec<K> {
    let removed: HashSet<&K> = removed.iter().collect();
    let mut order = next.to_vec();
    for (i, key) in prev.iter().enumerate() {
        if !removed.contains(key) {
            continue;
        }
        let at = match i.checked_sub(1) {
            None => 0,
            Some(before) => order
                .iter()
                .position(|k| *k == prev[before])
                .map_or(order.len(), |pos| pos + 1),
        };
        order.insert(at, key.clone());
    }
    order
}
