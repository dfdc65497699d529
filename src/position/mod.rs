//! Anchor-relative popup placement.
//!
//! [`recalc_position`] is a pure function: given the viewport, the anchor's
//! bounds, the popup's measured size and a priority list of [`Placement`]s it
//! returns where the popup goes and how large it may be drawn.

pub mod placement;
pub mod resolver;

pub use placement::{Placement, DEFAULT_PRIORITIES};
pub use resolver::{recalc_position, RecalcResult};

/// Errors raised by the placement resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// Inner positioning only makes sense for edge placements.
    #[error("inner positioning cannot be combined with the `context` placement")]
    InnerContext,
    /// A placement name could not be parsed.
    #[error("unknown placement `{0}`")]
    UnknownPlacement(String),
}
