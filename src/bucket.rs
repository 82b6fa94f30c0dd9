//! Buckets (spec.md §4.4): a count-free latch. Any process may
//! [`Bucket::fall_into`] it and park; a separate [`Bucket::flush`] releases
//! everyone parked at that moment in one batch.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::primitives::{self, ProcessId};
use crate::scheduler;

struct State {
    parked: Vec<ProcessId>,
}

/// A latch with no enrolment: unlike [`crate::barrier::Barrier`], nothing
/// needs to join before processes can fall in, and a flush releases
/// whoever happens to be parked rather than waiting for a fixed count.
pub struct Bucket {
    state: Mutex<State>,
}

impl Bucket {
    pub fn new() -> Arc<Self> {
        Arc::new(Bucket {
            state: Mutex::new(State { parked: Vec::new() }),
        })
    }

    /// Park the calling process until the next [`Bucket::flush`].
    pub fn fall_into(&self) {
        let pid = primitives::current_process().expect("fall_into outside a csp-rt process");
        let mut state = self.state.lock();
        state.parked.push(pid);
        drop(state);
        scheduler::reschedule_at("bucket::fall_into");
    }

    /// Release every process currently parked in this bucket.
    pub fn flush(&self) {
        let mut state = self.state.lock();
        let parked = std::mem::take(&mut state.parked);
        drop(state);
        scheduler::free_process_chain(&parked);
    }

    /// How many processes are currently parked.
    pub fn holding(&self) -> usize {
        self.state.lock().parked.len()
    }
}
