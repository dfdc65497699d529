//! Crate-level error type.
//!
//! Each subsystem owns a small `thiserror` enum; [`Error`] aggregates them for
//! callers that drive the whole [`LayerRoot`](crate::root::LayerRoot).

use crate::focus::FocusError;
use crate::layer::LayerError;
use crate::position::PositionError;

/// Any error raised by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Position(#[from] PositionError),
    #[error(transparent)]
    Focus(#[from] FocusError),
    #[error(transparent)]
    Layer(#[from] LayerError),
}

/// Convenience alias for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
