//! Focus registry, restriction scopes and sequential navigation.
//!
//! - [`FocusRegistry`] holds one [`FocusableHandle`] per mounted focusable component.
//! - [`FocusScopeManager`] keeps a stack of restriction scopes; while a scope is
//!   active every handle outside its subtree is unreachable by Tab.
//! - [`FocusChain`] computes the Tab / Shift+Tab order over reachable handles.

pub mod chain;
pub mod registry;
pub mod scope;

pub use chain::FocusChain;
pub use registry::{FocusId, FocusRegistry, FocusableHandle, UNREACHABLE_TAB_INDEX};
pub use scope::FocusScopeManager;

use crate::dom::NodeId;

/// Errors raised by focus scope operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FocusError {
    /// The owner did not opt in with `restrict_focus_within` / `limit_focus_within`.
    #[error("node {0:?} cannot restrict focus: it did not opt in to focus scoping")]
    NotRestrictable(NodeId),
    /// The owner is not mounted.
    #[error("node {0:?} is not mounted")]
    UnknownOwner(NodeId),
}
