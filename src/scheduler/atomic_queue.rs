//! The inter-thread hand-off queue (spec.md §3 `AtomicProcessQueue`, §4.1
//! "inter-thread hand-off").
//!
//! Any kernel-thread group may push a process onto another group's
//! `AtomicProcessQueue`; only the owning group's dispatcher pops. Grounded
//! on the teacher's `io_wait.rs` wait-queue pattern (a mutex-guarded queue
//! the owner blocks on when empty), generalized from a global
//! `BTreeMap<IoChannel, WaitQueue>` registry to one instance per
//! kernel-thread group.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::primitives::ProcessId;

pub(crate) struct AtomicProcessQueue {
    queue: Mutex<VecDeque<ProcessId>>,
    arrived: Condvar,
    shutdown: AtomicBool,
}

impl AtomicProcessQueue {
    pub(crate) fn new() -> Self {
        AtomicProcessQueue {
            queue: Mutex::new(VecDeque::new()),
            arrived: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Push from any thread. O(1) amortized per spec.md §4.1.
    pub(crate) fn push(&self, pid: ProcessId) {
        let mut q = self.queue.lock();
        q.push_back(pid);
        self.arrived.notify_one();
    }

    /// Drain whatever is currently queued, without blocking. Called by the
    /// owning dispatcher opportunistically between turns.
    pub(crate) fn drain_into(&self, local: &mut VecDeque<ProcessId>) {
        let mut q = self.queue.lock();
        local.extend(q.drain(..));
    }

    /// Block the owning dispatcher until either something is pushed or
    /// `shutdown` is requested, then drain it in one atomic batch.
    pub(crate) fn wait_and_drain_into(&self, local: &mut VecDeque<ProcessId>) {
        let mut q = self.queue.lock();
        while q.is_empty() && !self.shutdown.load(Ordering::Acquire) {
            self.arrived.wait(&mut q);
        }
        local.extend(q.drain(..));
    }

    /// Ask a dispatcher parked in `wait_and_drain_into` to wake up and
    /// notice `shutdown`.
    pub(crate) fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        let _q = self.queue.lock();
        self.arrived.notify_all();
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}
