//! Relative and absolute timeout guards (spec.md §4.3).
//!
//! Grounded on [`crate::time`] and the runtime's [`crate::scheduler`] timer
//! queue; generalized from the teacher's tick-driven `utils/timer.rs`
//! callbacks to a one-shot wake scheduled against a monotonic deadline.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::alt::guard::Guard;
use crate::alt::state::AlterRegistration;
use crate::primitives::ProcessId;
use crate::scheduler;
use crate::time::Time;

#[derive(Default)]
struct Round {
    deadline: Option<Time>,
    fired: bool,
}

/// Fires `delta` after the first `enable` of each select round. Reused
/// across repeated selects on the same `Alt`: each round recomputes its own
/// deadline from the moment that round's `enable` runs (spec.md §4.3: "on
/// re-enable the deadline is recomputed").
pub struct RelativeTimeoutGuard {
    delta: Duration,
    round: Arc<Mutex<Round>>,
}

impl RelativeTimeoutGuard {
    pub fn new(delta: Duration) -> Self {
        RelativeTimeoutGuard {
            delta,
            round: Arc::new(Mutex::new(Round::default())),
        }
    }
}

impl Guard for RelativeTimeoutGuard {
    fn enable(&self, registration: AlterRegistration) -> bool {
        let mut round = self.round.lock();
        let delta = self.delta;
        let deadline = *round.deadline.get_or_insert_with(|| Time::now() + delta);
        if deadline.has_passed() {
            round.fired = true;
            return true;
        }
        let shared = Arc::clone(&self.round);
        scheduler::schedule_wake_at(deadline, move || {
            let mut round = shared.lock();
            round.fired = true;
            drop(round);
            registration.fire();
        });
        false
    }

    fn disable(&self, _alter: ProcessId) -> bool {
        let mut round = self.round.lock();
        let fired = round.fired;
        *round = Round::default();
        fired
    }
}

/// Fires once `Time::now() >= deadline`. Unlike the relative guard, the
/// deadline is fixed at construction and does not move on reuse.
pub struct AbsoluteTimeoutGuard {
    deadline: Time,
    fired: Arc<Mutex<bool>>,
}

impl AbsoluteTimeoutGuard {
    pub fn new(deadline: Time) -> Self {
        AbsoluteTimeoutGuard {
            deadline,
            fired: Arc::new(Mutex::new(false)),
        }
    }
}

impl Guard for AbsoluteTimeoutGuard {
    fn enable(&self, registration: AlterRegistration) -> bool {
        if self.deadline.has_passed() {
            *self.fired.lock() = true;
            return true;
        }
        let shared = Arc::clone(&self.fired);
        scheduler::schedule_wake_at(self.deadline, move || {
            *shared.lock() = true;
            registration.fire();
        });
        false
    }

    fn disable(&self, _alter: ProcessId) -> bool {
        let mut fired = self.fired.lock();
        let result = *fired;
        *fired = false;
        result
    }
}
