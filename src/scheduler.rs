//! Frame scheduling with explicit cancellation.

use std::collections::BTreeSet;

/// Opaque ticket for one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(u64);

/// Something that delivers one callback per display refresh.
pub trait FrameScheduler {
    /// Ask for a callback at the next refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request. Cancelling an already delivered or unknown
    /// handle is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Single-threaded frame queue.
///
/// Every handle requested before a refresh is handed out by the next
/// [`FrameQueue::drain`]; cancelled handles never are.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: BTreeSet<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending handle, oldest first.
    pub fn drain(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    pub fn n_pending(&self) -> usize {
        self.pending.len()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_frames_are_not_delivered() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        let b = queue.request_frame();
        queue.cancel_frame(a);
        assert_eq!(queue.drain(), vec![b]);
        assert_eq!(queue.n_pending(), 0);
        queue.cancel_frame(b);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn handles_are_unique() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        queue.drain();
        let b = queue.request_frame();
        assert_ne!(a, b);
    }
}
