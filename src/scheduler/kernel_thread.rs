//! C2 mechanism: one kernel-thread group.
//!
//! Each group owns a local FIFO run queue and an [`AtomicProcessQueue`] for
//! cross-group hand-off, and runs a dedicated dispatcher OS thread that
//! grants the "turn" to exactly one member process at a time — the
//! operational meaning of "cooperative scheduling within a kernel thread"
//! in a runtime where every process is itself backed by a real OS thread
//! (see DESIGN.md's Open Question resolution). Member processes park while
//! not holding the turn and are woken by `Thread::unpark` when granted it.
//!
//! Grounded on the teacher's mechanism/policy split
//! (`scheduler/traits.rs`'s `Scheduler`/`KernelSchedCtx`, `scheduler/mod.rs`'s
//! single global dispatch loop) generalized from a single global scheduler
//! to N independent per-group dispatchers.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, Thread};

use parking_lot::{Condvar, Mutex};

use crate::primitives::{self, KernelThreadId, ProcessId};
use crate::scheduler::atomic_queue::AtomicProcessQueue;

/// Why a process's turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TurnOutcome {
    /// Voluntary `yield_now`: re-enqueue at the tail, it remains Ready.
    Yielded,
    /// `reschedule`: the process registered itself elsewhere (a channel's
    /// `waiting` slot, a barrier sub-queue, ...) and must not be
    /// re-enqueued; some other part of the system will `schedule` it back.
    Blocked,
    /// The process's body returned; deregister it permanently.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    Idle,
    Running(ProcessId),
    Done(ProcessId, TurnOutcome),
}

struct TurnSignal {
    state: Mutex<Turn>,
    changed: Condvar,
}

impl TurnSignal {
    fn new() -> Self {
        TurnSignal {
            state: Mutex::new(Turn::Idle),
            changed: Condvar::new(),
        }
    }
}

/// One kernel-thread group: a dispatcher plus the processes assigned to it.
///
/// The group's "local run queue" (spec.md §3) is the `local` `VecDeque`
/// owned by [`KernelThread::dispatch_loop`]'s stack frame: only the
/// dispatcher ever reads or reorders it, matching the single-writer/
/// single-reader protocol spec.md §4.1 describes. Every enqueue — whether
/// from a process on this group or from a remote one — funnels through the
/// shared [`AtomicProcessQueue`], which the dispatcher drains into `local`
/// each time it needs a new process to run.
pub struct KernelThread {
    id: KernelThreadId,
    incoming: AtomicProcessQueue,
    turn: TurnSignal,
    handles: Mutex<HashMap<ProcessId, Thread>>,
    member_count: Mutex<usize>,
    idle_and_empty: AtomicBool,
}

impl KernelThread {
    /// Spin up a new group: a dispatcher OS thread plus empty queues.
    pub(crate) fn spawn() -> Arc<Self> {
        let kt = Arc::new(KernelThread {
            id: KernelThreadId::fresh(),
            incoming: AtomicProcessQueue::new(),
            turn: TurnSignal::new(),
            handles: Mutex::new(HashMap::new()),
            member_count: Mutex::new(0),
            idle_and_empty: AtomicBool::new(true),
        });
        let dispatcher_kt = Arc::clone(&kt);
        thread::Builder::new()
            .name(format!("csp-rt-dispatch-{}", kt.id.as_u64()))
            .spawn(move || dispatcher_kt.dispatch_loop())
            .expect("failed to spawn csp-rt dispatcher thread");
        kt
    }

    pub fn id(&self) -> KernelThreadId {
        self.id
    }

    /// Register a freshly-created process's OS thread handle, and account
    /// for it as a member of this group.
    pub(crate) fn register(&self, pid: ProcessId, handle: Thread) {
        self.handles.lock().insert(pid, handle);
        *self.member_count.lock() += 1;
    }

    pub(crate) fn member_count(&self) -> usize {
        *self.member_count.lock()
    }

    /// Append `pid` to this group's run queue. Used both for same-group
    /// targets (`schedule` called by a process whose home is this group)
    /// and for the inter-thread hand-off path (spec.md §4.1) where the
    /// caller lives on a different group — the two cases are
    /// indistinguishable to the dispatcher, which always learns about new
    /// work through the same `AtomicProcessQueue`.
    pub(crate) fn enqueue(&self, pid: ProcessId) {
        self.idle_and_empty.store(false, Ordering::Release);
        self.incoming.push(pid);
    }

    pub(crate) fn request_shutdown(&self) {
        self.incoming.request_shutdown();
    }

    /// The currently-running process on this group yields: re-enqueue at
    /// the tail, then park until granted the turn again.
    pub(crate) fn yield_now(self: &Arc<Self>, pid: ProcessId) {
        self.end_turn(pid, TurnOutcome::Yielded);
        self.park_until_granted(pid);
    }

    /// The currently-running process blocks: do not re-enqueue (the caller
    /// already registered itself on some external wait list), park until
    /// some future `schedule(pid)` grants the turn again.
    pub(crate) fn reschedule(self: &Arc<Self>, pid: ProcessId) {
        self.end_turn(pid, TurnOutcome::Blocked);
        self.park_until_granted(pid);
    }

    /// The currently-running process's body has returned.
    pub(crate) fn finish(self: &Arc<Self>, pid: ProcessId) {
        self.end_turn(pid, TurnOutcome::Finished);
        self.handles.lock().remove(&pid);
        *self.member_count.lock() -= 1;
    }

    fn end_turn(&self, pid: ProcessId, outcome: TurnOutcome) {
        let mut state = self.turn.state.lock();
        debug_assert_eq!(*state, Turn::Running(pid));
        *state = Turn::Done(pid, outcome);
        self.turn.changed.notify_all();
    }

    fn park_until_granted(&self, pid: ProcessId) {
        loop {
            thread::park();
            if *self.turn.state.lock() == Turn::Running(pid) {
                return;
            }
        }
    }

    /// The dispatcher's main loop: pick a ready process, grant it the turn,
    /// wait for it to yield/block/finish, and react.
    fn dispatch_loop(self: Arc<Self>) {
        let mut local: VecDeque<ProcessId> = VecDeque::new();
        loop {
            if local.is_empty() {
                if self.member_count() == 0 && self.incoming.is_shutdown() {
                    return;
                }
                self.idle_and_empty.store(true, Ordering::Release);
                self.incoming.wait_and_drain_into(&mut local);
                self.idle_and_empty.store(false, Ordering::Release);
                if local.is_empty() {
                    if self.incoming.is_shutdown() && self.member_count() == 0 {
                        return;
                    }
                    continue;
                }
            } else {
                self.incoming.drain_into(&mut local);
            }

            let Some(pid) = local.pop_front() else {
                continue;
            };

            let handle = match self.handles.lock().get(&pid).cloned() {
                Some(h) => h,
                None => continue, // process already finished/unregistered
            };

            {
                let mut state = self.turn.state.lock();
                *state = Turn::Running(pid);
            }
            handle.unpark();

            let outcome = {
                let mut state = self.turn.state.lock();
                loop {
                    match *state {
                        Turn::Done(done_pid, outcome) if done_pid == pid => break outcome,
                        _ => self.turn.changed.wait(&mut state),
                    }
                }
            };
            {
                let mut state = self.turn.state.lock();
                *state = Turn::Idle;
            }

            match outcome {
                TurnOutcome::Yielded => local.push_back(pid),
                TurnOutcome::Blocked => {}
                TurnOutcome::Finished => {
                    self.handles.lock().remove(&pid);
                }
            }
        }
    }

    /// Whether this group currently has no ready work (used by `fork`'s
    /// least-loaded placement heuristic).
    pub(crate) fn is_idle(&self) -> bool {
        self.idle_and_empty.load(Ordering::Acquire)
    }
}

/// Bind the calling OS thread's process identity and block it until the
/// dispatcher first grants it the turn. Called once, right when a
/// process's backing OS thread starts.
pub(crate) fn await_first_turn(kt: &Arc<KernelThread>, pid: ProcessId) {
    primitives::bind_current(pid, kt.id);
    loop {
        thread::park();
        if *kt.turn.state.lock() == Turn::Running(pid) {
            return;
        }
    }
}
