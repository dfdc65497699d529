//! # layerkit
//!
//! Headless popup placement, modal layering, focus scoping and list-edit
//! animation for retained UI trees.
//!
//! The host owns rendering. layerkit tells it where popups go, which modal is
//! on top, which focusable components Tab may reach and how to animate a keyed
//! list edit. Everything it decides is reported as a [`Notice`](event::Notice)
//! the host drains after each call.
//!
//! ## Core Systems
//!
//! - **[`position`]**: Anchor-relative placement resolver (pure function)
//! - **[`focus`]**: Focusable registry, restriction scopes, Tab order
//! - **[`layer`]**: Popup state machine and modal stack
//! - **[`animate`]**: Keyed list diffing and staged transitions
//! - **[`root`]**: [`LayerRoot`], the per-tree context object tying them together
//! - **[`driver`]**: Tokio loop mapping wall-clock time onto the timer queue
//!
//! ## Foundation
//!
//! - **[`geometry`]**: Offset, Size, Region
//! - **[`dom`]**: Slotmap-backed component tree
//! - **[`clock`]**: Deterministic virtual timers
//! - **[`event`]**: Input events, notices, notice queue
//! - **[`config`]**: Timing and placement defaults
//! - **[`error`]**: Crate error type

// Foundation
pub mod clock;
pub mod config;
pub mod dom;
pub mod error;
pub mod event;
pub mod geometry;

// Core systems
pub mod animate;
pub mod focus;
pub mod layer;
pub mod position;

// Context and driver
pub mod driver;
pub mod root;

pub use config::{AnimationConfig, LayerConfig};
pub use error::{Error, Result};
pub use root::LayerRoot;
