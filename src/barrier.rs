//! Barriers (spec.md §4.4): a multi-party synchronizer with an enrolment
//! model. Every enrolled [`BarrierEnd`] must call [`BarrierEnd::sync`]
//! before any of them proceeds past that round.
//!
//! Grounded on the teacher's `io_wait.rs` wait-queue pattern, generalized
//! from a single global queue keyed by channel id to one queue owned by
//! each `Barrier` instance. Per-thread sub-queues (spec.md's wording) are
//! folded into [`crate::scheduler::free_process_chain`], which already
//! routes each woken process to its own home kernel thread.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::mobile::Mobile;
use crate::primitives::{self, ProcessId};
use crate::scheduler;

struct State {
    enrolled: usize,
    left_to_sync: usize,
    parked: Vec<ProcessId>,
}

/// A multi-party rendezvous point. Construct with [`Barrier::new`], wrap in
/// an `Arc`, then hand out one [`BarrierEnd`] per participant via
/// [`Barrier::enrolled_end`].
pub struct Barrier {
    state: Mutex<State>,
}

impl Barrier {
    pub fn new() -> Self {
        Barrier {
            state: Mutex::new(State {
                enrolled: 0,
                left_to_sync: 0,
                parked: Vec::new(),
            }),
        }
    }

    /// Enroll one more participant and hand back its end.
    pub fn enrolled_end(self: &Arc<Self>) -> BarrierEnd {
        let mut state = self.state.lock();
        state.enrolled += 1;
        state.left_to_sync += 1;
        drop(state);
        BarrierEnd {
            barrier: Mobile::new(Arc::clone(self)),
        }
    }

    /// Enroll a participant before it has started running, so the returned
    /// end can be handed to a not-yet-spawned process without racing its
    /// first `sync` against this barrier's enrolment count (spec.md
    /// §4.4's `halfEnroll`).
    pub fn half_enroll(self: &Arc<Self>) -> BarrierEnd {
        self.enrolled_end()
    }

    /// Finish constructing an end produced by [`Barrier::half_enroll`]. In
    /// this runtime enrolment is a single atomic step (the mutex already
    /// rules out the pre-start race the two-phase split exists to avoid),
    /// so this is the identity function; it exists so callers ported from a
    /// two-thread enrolment discipline have something to call.
    pub fn complete_enroll(&self, end: BarrierEnd) -> BarrierEnd {
        end
    }

    fn resign(&self) {
        let mut state = self.state.lock();
        state.enrolled = state.enrolled.saturating_sub(1);
        if state.left_to_sync > 0 {
            state.left_to_sync -= 1;
        }
        Self::complete_round_if_ready(state);
    }

    fn sync(&self) {
        let pid = primitives::current_process().expect("barrier sync outside a csp-rt process");
        let mut state = self.state.lock();
        state.left_to_sync -= 1;
        if state.left_to_sync == 0 {
            Self::complete_round_if_ready(state);
        } else {
            state.parked.push(pid);
            drop(state);
            scheduler::reschedule_at("barrier::sync");
        }
    }

    /// Called with the lock held whenever `left_to_sync` may have just
    /// reached zero. Releases every parked process and resets the count for
    /// the next round.
    fn complete_round_if_ready(mut state: MutexGuard<'_, State>) {
        if state.left_to_sync != 0 {
            return;
        }
        let parked = std::mem::take(&mut state.parked);
        state.left_to_sync = state.enrolled;
        drop(state);
        scheduler::free_process_chain(&parked);
    }
}

impl Default for Barrier {
    fn default() -> Self {
        Self::new()
    }
}

/// A participant's handle onto a [`Barrier`]. Move-only: resigning (or
/// dropping) consumes it, and a second resign on an already-resigned end is
/// a documented no-op rather than a panic (spec.md §3's `Mobile<T>`).
pub struct BarrierEnd {
    barrier: Mobile<Arc<Barrier>>,
}

impl BarrierEnd {
    /// Block until every other enrolled end has also called `sync` this
    /// round.
    pub fn sync(&self) {
        let barrier = self.barrier.get().expect("sync called on a resigned BarrierEnd");
        barrier.sync();
    }

    /// Leave the barrier. Idempotent: resigning an already-resigned end
    /// does nothing.
    pub fn resign(&mut self) {
        if let Some(barrier) = self.barrier.take() {
            barrier.resign();
        }
    }
}

impl Drop for BarrierEnd {
    fn drop(&mut self) {
        self.resign();
    }
}
