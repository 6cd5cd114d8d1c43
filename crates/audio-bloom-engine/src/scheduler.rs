//! Display-refresh frame scheduling.
//!
//! The host calls [`FrameScheduler::take_due`] once per display refresh. The
//! engine re-requests a frame at the top of every callback and cancels by
//! handle when the loop should end, so there is never more than one pending
//! callback per scheduler.

/// Identifies one scheduled frame callback
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a callback for the next refresh, replacing any pending one
    pub fn request_frame(&mut self) -> FrameHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = FrameHandle(self.next_id);
        if let Some(previous) = self.pending.replace(handle) {
            log::trace!("frame {:?} superseded by {:?}", previous, handle);
        }
        handle
    }

    /// Cancel `handle` if it is still pending. Stale handles are ignored.
    pub fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Hand the pending callback to the host for this refresh tick
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
