//! Notice queue: the in-process pub/sub between the layer and the host.
//!
//! [`NoticeQueue`] accumulates [`Notice`]s as operations run. The host drains
//! it after each call and applies the changes to its view. Nothing is
//! delivered re-entrantly, so handlers never observe half-applied state.

use std::collections::VecDeque;

use tracing::trace;

use super::notice::Notice;

/// FIFO queue of pending notices.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    queue: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a notice.
    pub fn push(&mut self, notice: Notice) {
        trace!(notice = notice.name(), "notice queued");
        self.queue.push_back(notice);
    }

    /// Drain all pending notices in the order they were pushed.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.queue.drain(..).collect()
    }

    /// Peek at pending notices without consuming them.
    pub fn pending(&self) -> impl Iterator<Item = &Notice> {
        self.queue.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::notice::DismissReason;

    fn shown(id: &str) -> Notice {
        Notice::PopupShown { id: id.into(), visible: true }
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = NoticeQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut queue = NoticeQueue::new();
        queue.push(shown("first"));
        queue.push(Notice::PopupDismissed {
            id: "first".into(),
            reason: DismissReason::Requested,
        });
        queue.push(shown("second"));
        assert_eq!(queue.pending_count(), 3);

        let notices = queue.drain();
        assert_eq!(notices[0], shown("first"));
        assert_eq!(notices[2], shown("second"));
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn pending_does_not_consume() {
        let mut queue = NoticeQueue::new();
        queue.push(shown("menu"));
        assert_eq!(queue.pending().count(), 1);
        assert_eq!(queue.pending_count(), 1);
    }
}
