//! Event system: inbound input, outbound notices, notice queue.

pub mod handler;
pub mod input;
pub mod notice;

pub use handler::NoticeQueue;
pub use input::{from_crossterm, InputEvent, Key, KeyEvent, Modifiers, PointerAction, PointerButton, PointerEvent};
pub use notice::{DismissReason, Notice};
