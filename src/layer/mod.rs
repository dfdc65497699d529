//! Popup and modal layering.
//!
//! [`LayerCoordinator`] owns at most one popup and a stack of modals. It never
//! draws anything: geometry comes from a [`LayerHost`], and every visible
//! change is reported as a [`Notice`](crate::event::Notice).

pub mod coordinator;
pub mod modal;
pub mod popup;

pub use coordinator::LayerCoordinator;
pub use modal::{ModalEntry, ModalStack};
pub use popup::{AnchorPressedCallback, DismissCallback, PopupOptions, PopupPhase};

use crate::dom::NodeId;
use crate::geometry::{Region, Size};
use crate::position::PositionError;

/// Measurement source for the coordinator.
pub trait LayerHost {
    /// Size of the area popups are confined to.
    fn viewport(&self) -> Size;

    /// Current bounds of `node` in viewport coordinates, `None` when it is no
    /// longer mounted or visible.
    fn bounds(&self, node: NodeId) -> Option<Region>;
}

/// Errors raised by popup and modal operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    #[error("a {kind} needs a non-empty id")]
    MissingId { kind: &'static str },
    #[error(transparent)]
    Position(#[from] PositionError),
}
