//! Flex layout for a single keyed list.
//!
//! [`ListLayout`] lays fixed-size children out in a column or row with taffy
//! and answers [`PositionSource`] queries, so hosts without a layout engine of
//! their own can drive a [`ListEditAnimator`](super::ListEditAnimator).

use std::collections::HashMap;

use taffy::prelude::{AvailableSpace, Dimension, Display, FlexDirection, FromLength, LengthPercentage, Style, TaffyTree};
use taffy::NodeId as TaffyNode;

use crate::geometry::{Offset, Region, Size};

use super::diff::{ChildKey, PositionSource};

/// Layout failures reported by taffy.
#[derive(Debug, thiserror::Error)]
#[error("list layout failed: {0}")]
pub struct LayoutError(#[from] taffy::TaffyError);

/// Main axis of a [`ListLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListDirection {
    #[default]
    Column,
    Row,
}

/// Keyed children in a single flex line.
pub struct ListLayout<K: ChildKey> {
    tree: TaffyTree<()>,
    root: TaffyNode,
    nodes: HashMap<K, TaffyNode>,
    order: Vec<K>,
    direction: ListDirection,
    gap: i32,
}

impl<K: ChildKey> ListLayout<K> {
    pub fn new(direction: ListDirection) -> Result<Self, LayoutError> {
        let mut tree = TaffyTree::new();
        let root = tree.new_leaf(container_style(direction, 0))?;
        Ok(Self {
            tree,
            root,
            nodes: HashMap::new(),
            order: Vec::new(),
            direction,
            gap: 0,
        })
    }

    /// Space between consecutive children along the main axis.
    pub fn with_gap(mut self, gap: i32) -> Result<Self, LayoutError> {
        self.gap = gap.max(0);
        self.tree
            .set_style(self.root, container_style(self.direction, self.gap))?;
        Ok(self)
    }

    /// Replace the children. Keys seen before keep their taffy node; keys no
    /// longer listed are dropped.
    pub fn set_children(&mut self, children: &[(K, Size)]) -> Result<(), LayoutError> {
        let mut kept = HashMap::with_capacity(children.len());
        let mut ids = Vec::with_capacity(children.len());
        for (key, size) in children {
            let style = child_style(*size);
            let id = match self.nodes.remove(key) {
                Some(id) => {
                    self.tree.set_style(id, style)?;
                    id
                }
                None => self.tree.new_leaf(style)?,
            };
            kept.insert(key.clone(), id);
            ids.push(id);
        }
        for (_, stale) in self.nodes.drain() {
            self.tree.remove(stale)?;
        }
        self.tree.set_children(self.root, &ids)?;
        self.nodes = kept;
        self.order = children.iter().map(|(key, _)| key.clone()).collect();
        Ok(())
    }

    /// Run layout inside `available` cells.
    pub fn compute(&mut self, available: Size) -> Result<(), LayoutError> {
        self.tree.compute_layout(
            self.root,
            taffy::geometry::Size {
                width: AvailableSpace::Definite(available.width as f32),
                height: AvailableSpace::Definite(available.height as f32),
            },
        )?;
        Ok(())
    }

    /// Laid-out bounds of `key`, rounded to whole cells.
    pub fn region(&self, key: &K) -> Option<Region> {
        let id = self.nodes.get(key)?;
        let layout = self.tree.layout(*id).ok()?;
        Some(Region {
            x: layout.location.x.round() as i32,
            y: layout.location.y.round() as i32,
            width: layout.size.width.round() as i32,
            height: layout.size.height.round() as i32,
        })
    }

    /// Keys in layout order.
    pub fn keys(&self) -> &[K] {
        &self.order
    }
}

impl<K: ChildKey> PositionSource<K> for ListLayout<K> {
    fn position(&self, key: &K) -> Option<Offset> {
        self.region(key).map(Region::offset)
    }
}

fn container_style(direction: ListDirection, gap: i32) -> Style {
    let gap = LengthPercentage::from_length(gap as f32);
    Style {
        display: Display::Flex,
        flex_direction: match direction {
            ListDirection::Column => FlexDirection::Column,
            ListDirection::Row => FlexDirection::Row,
        },
        gap: taffy::geometry::Size { width: gap, height: gap },
        ..Default::default()
    }
}

fn child_style(size: Size) -> Style {
    Style {
        size: taffy::geometry::Size {
            width: Dimension::from_length(size.width.max(0) as f32),
            height: Dimension::from_length(size.height.max(0) as f32),
        },
        flex_shrink: 0.0,
        ..Default::default()
    }
}
