//! The timer queue backing sleeping processes and the relative/absolute
//! timeout ALT guards (spec.md §4.1 "timer queue for sleeping processes").
//!
//! Grounded on the teacher's `utils/timer.rs` min-heap-of-deadlines pattern,
//! generalized from hardware-tick callbacks to an arbitrary wake callback.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};

use crate::time::Time;

type WakeFn = Box<dyn FnOnce() + Send>;

struct Sleeper {
    deadline: Time,
    seq: u64,
    wake: WakeFn,
}

impl PartialEq for Sleeper {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}
impl Eq for Sleeper {}

impl PartialOrd for Sleeper {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sleeper {
    /// Reversed: `BinaryHeap` is a max-heap, and we want the earliest
    /// deadline on top. `seq` only breaks ties between equal deadlines.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other.deadline.cmp(&self.deadline).then(other.seq.cmp(&self.seq))
    }
}

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// A single background thread that runs an arbitrary callback when a
/// registered deadline passes — sleeping processes re-enqueue themselves;
/// timeout ALT guards fire their alt registration.
///
/// One instance serves the whole runtime; it is intentionally not
/// per-kernel-thread, since sleepers are rare compared to run-queue churn
/// and a dedicated heap avoids scanning every group's queue on a tick.
pub(crate) struct TimerQueue {
    heap: Mutex<BinaryHeap<Sleeper>>,
    woken: Condvar,
}

impl TimerQueue {
    pub(crate) fn new() -> Arc<Self> {
        let tq = Arc::new(TimerQueue {
            heap: Mutex::new(BinaryHeap::new()),
            woken: Condvar::new(),
        });
        let worker = Arc::clone(&tq);
        thread::Builder::new()
            .name("csp-rt-timer".to_string())
            .spawn(move || worker.run())
            .expect("failed to spawn csp-rt timer thread");
        tq
    }

    /// Run `wake` once, on the timer thread, no earlier than `deadline`.
    pub(crate) fn schedule_wake(&self, deadline: Time, wake: impl FnOnce() + Send + 'static) {
        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut heap = self.heap.lock();
        heap.push(Sleeper { deadline, seq, wake: Box::new(wake) });
        self.woken.notify_all();
    }

    /// How many deadlines are still pending. A non-zero count means some
    /// process will eventually be woken on its own, so the deadlock
    /// watchdog must not mistake the quiet for a stall.
    pub(crate) fn pending_count(&self) -> usize {
        self.heap.lock().len()
    }

    fn run(self: Arc<Self>) {
        let mut heap = self.heap.lock();
        loop {
            match heap.peek() {
                None => {
                    self.woken.wait(&mut heap);
                }
                Some(next) if !next.deadline.has_passed() => {
                    let deadline = next.deadline;
                    let timeout = deadline.saturating_duration_since(Time::now());
                    self.woken.wait_for(&mut heap, timeout);
                }
                Some(_) => {
                    let due = heap.pop().expect("peek just confirmed an element");
                    log::debug!("csp-rt: timer deadline reached, waking");
                    (due.wake)();
                }
            }
        }
    }
}
