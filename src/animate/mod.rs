//! List edit animation.
//!
//! - [`diff`] classifies keyed children as added, removed or moved.
//! - [`ListEditAnimator`] turns one edit into a staged [`TransitionPlan`].
//! - [`ListLayout`] is a taffy-backed [`PositionSource`] for simple lists.

pub mod animator;
pub mod diff;
pub mod layout;

pub use animator::{AnimationPhase, ListEditAnimator, Transition, TransitionExecutor, TransitionKind, TransitionPlan};
pub use diff::{ChildEditSet, ChildKey, PositionDelta, PositionSource};
pub use layout::{LayoutError, ListDirection, ListLayout};
