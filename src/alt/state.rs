//! The alter's atomic state machine (spec.md §4.3's
//! `NotAlting → Enabling → Waiting → Disabling → NotAlting`, plus the
//! `Enabling → EnablingFired` early-exit) and the handle guards use to fire
//! it from outside the alting process.
//!
//! Grounded on the teacher's use of atomic flags for IRQ-safe scheduler
//! state (`scheduler/mod.rs`'s `PREEMPTION_DISABLED`/`SCHEDULER_ENABLED`),
//! generalized from two independent booleans to one small state enum since
//! ALT needs more than two states and the transitions must be mutually
//! exclusive.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::primitives::ProcessId;
use crate::scheduler;
use crate::scheduler::kernel_thread::KernelThread;

const NOT_ALTING: u8 = 0;
const ENABLING: u8 = 1;
const ENABLING_FIRED: u8 = 2;
const WAITING: u8 = 3;
const READY: u8 = 4;
const DISABLING: u8 = 5;

/// Shared between the alting process (which drives `enable`/`disable`) and
/// any guard that later resolves asynchronously (a writer arriving on a
/// channel guard, a timer deadline for a timeout guard).
pub(crate) struct AltCell {
    state: AtomicU8,
    pid: ProcessId,
    home: Arc<KernelThread>,
}

impl AltCell {
    pub(crate) fn new(pid: ProcessId, home: Arc<KernelThread>) -> Self {
        AltCell {
            state: AtomicU8::new(NOT_ALTING),
            pid,
            home,
        }
    }

    pub(crate) fn set_enabling(&self) {
        self.state.store(ENABLING, Ordering::Release);
    }

    pub(crate) fn set_disabling(&self) {
        self.state.store(DISABLING, Ordering::Release);
    }

    pub(crate) fn set_not_alting(&self) {
        self.state.store(NOT_ALTING, Ordering::Release);
    }

    /// CAS `Enabling -> Waiting`. Returns `true` if no guard fired in the
    /// meantime (the caller should suspend); `false` means a guard already
    /// raced ahead to `EnablingFired` and the caller must skip the wait.
    pub(crate) fn try_start_waiting(&self) -> bool {
        self.state
            .compare_exchange(ENABLING, WAITING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Called by a guard when its event resolves. Performs the
    /// `Enabling -> EnablingFired` or `Waiting -> Ready` transition; a
    /// `Ready` transition also re-enqueues the alting process onto its
    /// home group. Returns whether this call was the one that fired it
    /// (idempotent: later callers on an already-fired cell see `false`).
    pub(crate) fn fire(&self) -> bool {
        loop {
            let current = self.state.load(Ordering::Acquire);
            match current {
                ENABLING => {
                    if self
                        .state
                        .compare_exchange(ENABLING, ENABLING_FIRED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return true;
                    }
                }
                WAITING => {
                    if self
                        .state
                        .compare_exchange(WAITING, READY, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        scheduler::mark_runnable(self.pid);
                        self.home.enqueue(self.pid);
                        return true;
                    }
                }
                _ => return false,
            }
        }
    }

    pub(crate) fn pid(&self) -> ProcessId {
        self.pid
    }
}

/// A guard's handle onto the alting process it may wake. Guards store this
/// (or nothing, if they were immediately ready at enable time) while
/// registered.
#[derive(Clone)]
pub struct AlterRegistration {
    cell: Arc<AltCell>,
}

impl AlterRegistration {
    pub(crate) fn new(cell: Arc<AltCell>) -> Self {
        AlterRegistration { cell }
    }

    pub fn pid(&self) -> ProcessId {
        self.cell.pid()
    }

    /// Resolve the event this registration stands for. Returns `true` if
    /// this call actually transitioned the alt (first resolver wins).
    pub fn fire(&self) -> bool {
        self.cell.fire()
    }
}
