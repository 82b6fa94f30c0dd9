//! The alternative construct (spec.md §4.3): choose among a list of guards,
//! by priority or fairly.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::alt::guard::Guard;
use crate::alt::state::{AltCell, AlterRegistration};
use crate::primitives;
use crate::scheduler;

/// A set of guards to choose among. Built once and reused across repeated
/// `pri_select`/`fair_select` calls — a fair select remembers, across
/// calls, which guard it favored last so starvation-free rotation works
/// over the `Alt`'s whole lifetime rather than resetting every round.
pub struct Alt {
    guards: Vec<Box<dyn Guard>>,
    fair_index: Mutex<usize>,
}

impl Alt {
    pub fn new(guards: Vec<Box<dyn Guard>>) -> Self {
        assert!(!guards.is_empty(), "Alt requires at least one guard");
        Alt {
            guards,
            fair_index: Mutex::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Select the lowest-indexed ready guard, returning its index.
    pub fn pri_select(&self) -> usize {
        self.select(false)
    }

    /// Select among the ready guards, rotating which one is favored on ties
    /// across successive calls so no guard starves.
    pub fn fair_select(&self) -> usize {
        self.select(true)
    }

    fn select(&self, fair: bool) -> usize {
        let pid = primitives::current_process().expect("select outside a csp-rt process");
        let home = scheduler::current_group_handle();
        let cell = Arc::new(AltCell::new(pid, home));
        cell.set_enabling();

        let mut any_ready = false;
        for guard in &self.guards {
            let registration = AlterRegistration::new(Arc::clone(&cell));
            if guard.enable(registration) {
                any_ready = true;
            }
        }

        if !any_ready && cell.try_start_waiting() {
            scheduler::reschedule_at("alt::select");
        }

        cell.set_disabling();
        let mut fired = Vec::with_capacity(self.guards.len());
        for (i, guard) in self.guards.iter().enumerate() {
            if guard.disable(pid) {
                fired.push(i);
            }
        }
        cell.set_not_alting();

        assert!(!fired.is_empty(), "alt woke with no selectable guard");
        let chosen = if fair { self.fair_pick(&fired) } else { fired[0] };
        self.guards[chosen].activate();
        chosen
    }

    fn fair_pick(&self, fired: &[usize]) -> usize {
        let n = self.guards.len();
        let mut index = self.fair_index.lock();
        for offset in 0..n {
            let i = (*index + offset) % n;
            if fired.contains(&i) {
                *index = (i + 1) % n;
                return i;
            }
        }
        unreachable!("fired is non-empty and every entry is within 0..n")
    }
}
