//! Host-loop seams: who decides when the next tick runs, and what time it is.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Token for one scheduled tick. A tick delivered with a handle the engine no longer expects
/// is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Something that can deliver a tick later, like a display's frame callback.
pub trait FrameScheduler {
    /// Request one future tick.
    fn schedule_next(&mut self) -> FrameHandle;

    /// Withdraw a request made with [`FrameScheduler::schedule_next`].
    fn cancel(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    pending: Option<FrameHandle>,
    scheduled: u64,
    cancelled: u64,
}

/// Scheduler driven by hand, for headless runs and tests.
///
/// Clones share state, so a caller can keep one clone to inspect what the engine requested.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    /// Empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent request that has been neither delivered nor cancelled.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.state.borrow().pending
    }

    /// Remove and return the pending request, as a host would when delivering it.
    pub fn take_pending(&self) -> Option<FrameHandle> {
        self.state.borrow_mut().pending.take()
    }

    /// Total requests made.
    pub fn scheduled_count(&self) -> u64 {
        self.state.borrow().scheduled
    }

    /// Total cancellations received.
    pub fn cancelled_count(&self) -> u64 {
        self.state.borrow().cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_next(&mut self) -> FrameHandle {
        let mut s = self.state.borrow_mut();
        s.next_id += 1;
        s.scheduled += 1;
        let handle = FrameHandle(s.next_id);
        s.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let mut s = self.state.borrow_mut();
        s.cancelled += 1;
        if s.pending == Some(handle) {
            s.pending = None;
        }
    }
}

/// Monotonic time source.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scheduler.rs"]
mod tests;
