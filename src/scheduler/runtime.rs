//! The crate-level scheduler singleton and its public operations
//! (spec.md §4.1: `schedule`, `yield_now`, `reschedule`, `free_process`,
//! `free_process_chain`, `run_in_this_thread`, `fork`, `fork_in_this_thread`).
//!
//! Grounded on the teacher's `static SCHEDULER: Mutex<Option<Scheduler>>`
//! singleton (`scheduler/scheduler_manager.rs`), generalized from a single
//! global run queue to a fixed pool of [`KernelThread`] groups.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::{BlockedProcess, CspError, CspResult};
use crate::primitives::{self, ProcessId};
use crate::process::{Process, ProcessHandle};
use crate::scheduler::kernel_thread::{self, KernelThread};
use crate::scheduler::timer::TimerQueue;
use crate::time::Time;

/// How often the deadlock watchdog polls for total-system quiescence.
const WATCHDOG_POLL: Duration = Duration::from_millis(50);
/// A second confirming poll before declaring a deadlock, so a group that
/// merely raced between going idle and an in-flight `schedule()` isn't
/// mistaken for a stall.
const WATCHDOG_CONFIRM: Duration = Duration::from_millis(20);

/// Sizing for the pool of kernel-thread groups the runtime spawns on first
/// use (spec.md §6: "number of kernel threads to spawn... default:
/// available-cores-1").
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    pub kernel_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(2);
        RuntimeConfig {
            kernel_threads: cores.saturating_sub(1).max(1),
        }
    }
}

thread_local! {
    /// The kernel-thread group the process running on *this* OS thread is a
    /// member of, cached so `yield_now`/`reschedule`/`finish` never need to
    /// consult the global home-group table.
    static CURRENT_GROUP: RefCell<Option<Arc<KernelThread>>> = const { RefCell::new(None) };
}

fn current_group() -> Option<Arc<KernelThread>> {
    CURRENT_GROUP.with(|g| g.borrow().clone())
}

struct Runtime {
    groups: Vec<Arc<KernelThread>>,
    timers: Arc<TimerQueue>,
    homes: Mutex<HashMap<ProcessId, Arc<KernelThread>>>,
    /// The most recent site each currently-blocked process parked at
    /// (spec.md §4.5/§7: deadlock is reported with each process's most
    /// recent block trace). Cleared the moment a process is scheduled.
    blocked_sites: Mutex<HashMap<ProcessId, &'static str>>,
    /// The last deadlock the watchdog declared, if any, taken (and thus
    /// cleared) by the next [`check_deadlock`] call.
    last_deadlock: Mutex<Option<Vec<BlockedProcess>>>,
}

impl Runtime {
    fn new(config: RuntimeConfig) -> Self {
        let groups = (0..config.kernel_threads.max(1))
            .map(|_| KernelThread::spawn())
            .collect();
        log::info!(
            "csp-rt: runtime started with {} kernel-thread group(s)",
            config.kernel_threads.max(1)
        );
        Runtime {
            groups,
            timers: TimerQueue::new(),
            homes: Mutex::new(HashMap::new()),
            blocked_sites: Mutex::new(HashMap::new()),
            last_deadlock: Mutex::new(None),
        }
    }

    /// The group with no ready work, or the one with the fewest members if
    /// all are busy — spec.md's "multiplex many processes onto a
    /// configurable number of kernel threads", used by `fork`'s placement.
    fn least_loaded(&self) -> Arc<KernelThread> {
        self.groups
            .iter()
            .find(|g| g.is_idle())
            .or_else(|| self.groups.iter().min_by_key(|g| g.member_count()))
            .expect("runtime always has at least one kernel-thread group")
            .clone()
    }

    fn home_of(&self, pid: ProcessId) -> Option<Arc<KernelThread>> {
        self.homes.lock().get(&pid).cloned()
    }

    fn set_home(&self, pid: ProcessId, group: Arc<KernelThread>) {
        self.homes.lock().insert(pid, group);
    }

    fn forget(&self, pid: ProcessId) {
        self.homes.lock().remove(&pid);
        self.blocked_sites.lock().remove(&pid);
    }

    fn mark_blocked(&self, pid: ProcessId, site: &'static str) {
        self.blocked_sites.lock().insert(pid, site);
    }

    fn mark_runnable(&self, pid: ProcessId) {
        self.blocked_sites.lock().remove(&pid);
    }

    /// Whether every group is parked with nothing to run and nothing is
    /// pending on the timer queue — the system-wide quiescence a deadlock
    /// watchdog poll treats as a candidate stall.
    fn quiescent(&self) -> bool {
        self.timers.pending_count() == 0 && self.groups.iter().all(|g| g.is_idle())
    }

    fn snapshot_blocked(&self) -> Vec<BlockedProcess> {
        self.blocked_sites
            .lock()
            .iter()
            .map(|(&process, &block_site)| BlockedProcess { process, block_site })
            .collect()
    }
}

static RUNTIME: OnceCell<Runtime> = OnceCell::new();
static WATCHDOG_STARTED: OnceCell<()> = OnceCell::new();

fn runtime() -> &'static Runtime {
    init(RuntimeConfig::default())
}

fn init(config: RuntimeConfig) -> &'static Runtime {
    let rt = RUNTIME.get_or_init(|| Runtime::new(config));
    WATCHDOG_STARTED.get_or_init(|| spawn_watchdog(rt));
    rt
}

/// Replace the default runtime sizing. Must be called before the first
/// scheduling operation; a no-op (the existing runtime wins) if the runtime
/// was already initialized.
pub fn configure(config: RuntimeConfig) {
    init(config);
}

/// Report the most recently detected deadlock, if the watchdog has found
/// one since the last call (spec.md §4.5: "detected... reported with the
/// most recent block trace"). Consuming: a deadlock is reported once.
pub fn check_deadlock() -> CspResult<()> {
    match runtime().last_deadlock.lock().take() {
        Some(blocked) => Err(CspError::Deadlock { blocked }),
        None => Ok(()),
    }
}

fn spawn_watchdog(rt: &'static Runtime) {
    thread::Builder::new()
        .name("csp-rt-deadlock-watchdog".to_string())
        .spawn(move || watchdog_loop(rt))
        .expect("failed to spawn csp-rt deadlock watchdog thread");
}

/// Poll for total quiescence with live blocked processes (spec.md §4.5:
/// "empty run queue across all threads with non-empty wait lists"). A
/// single idle snapshot could be a race with an in-flight `schedule()`, so
/// a confirming second poll must agree before the stall is declared real.
fn watchdog_loop(rt: &'static Runtime) {
    loop {
        thread::sleep(WATCHDOG_POLL);
        if !rt.quiescent() {
            continue;
        }
        thread::sleep(WATCHDOG_CONFIRM);
        if !rt.quiescent() {
            continue;
        }
        let blocked = rt.snapshot_blocked();
        if blocked.is_empty() {
            continue;
        }
        log::error!(
            "csp-rt: deadlock detected, {} process(es) blocked with no runnable work",
            blocked.len()
        );
        *rt.last_deadlock.lock() = Some(blocked);
        for group in &rt.groups {
            group.request_shutdown();
        }
    }
}

/// Schedule `p`: append it to its home group's run queue, whether that
/// group is the caller's own or belongs to another OS thread (spec.md
/// §4.1's inter-thread hand-off — both cases funnel through the same
/// `AtomicProcessQueue`, see [`KernelThread::enqueue`]).
pub fn schedule(pid: ProcessId) {
    let rt = runtime();
    let group = rt
        .home_of(pid)
        .expect("schedule() called for a process with no registered home group");
    rt.mark_runnable(pid);
    log::debug!("csp-rt: scheduling {} on {}", pid, group.id());
    group.enqueue(pid);
}

/// Clear `pid`'s block-site bookkeeping without enqueueing it anywhere
/// (spec.md §4.5's watchdog must not keep naming a process as blocked once
/// something else has already made it runnable). For callers that enqueue
/// directly onto a known group instead of going through [`schedule`] — the
/// `alt` module's `AltCell::fire`, which already holds the alter's home.
pub(crate) fn mark_runnable(pid: ProcessId) {
    runtime().mark_runnable(pid);
}

/// Wake one parked process, routing it to its home group. An alias for
/// [`schedule`] at the public-API level (spec.md's `freeProcess`).
pub fn free_process(pid: ProcessId) {
    schedule(pid);
}

/// Wake a chain of parked processes in order, each routed to its own home
/// group (spec.md's `freeProcessChain`).
pub fn free_process_chain(pids: &[ProcessId]) {
    for &pid in pids {
        free_process(pid);
    }
}

/// The running process yields: re-enqueue at the tail of its own group's
/// run queue, then resume when its turn comes back around.
pub fn yield_now() {
    let pid = primitives::current_process().expect("yield_now() called outside a csp-rt process");
    let group = current_group().expect("yield_now() called outside a csp-rt process");
    group.yield_now(pid);
}

/// The running process blocks without being re-enqueued: the caller must
/// already have registered itself on some wait list (a channel's
/// `waiting`, a barrier sub-queue, ...) before calling this.
pub fn reschedule() {
    let pid = primitives::current_process().expect("reschedule() called outside a csp-rt process");
    let group = current_group().expect("reschedule() called outside a csp-rt process");
    group.reschedule(pid);
}

/// As [`reschedule`], additionally recording `site` as this process's most
/// recent block location (spec.md §4.5/§7: a declared deadlock is reported
/// with each stuck process's most recent block trace). Callers that park a
/// process on some wait list should use this instead of the bare
/// `reschedule` so the watchdog has something to name.
pub(crate) fn reschedule_at(site: &'static str) {
    let pid = primitives::current_process().expect("reschedule() called outside a csp-rt process");
    runtime().mark_blocked(pid, site);
    reschedule();
}

pub(crate) fn sleep_until(deadline: Time) {
    let pid = primitives::current_process().expect("sleep_until() called outside a csp-rt process");
    let group = current_group().expect("sleep_until() called outside a csp-rt process");
    let wake_group = Arc::clone(&group);
    runtime().timers.schedule_wake(deadline, move || wake_group.enqueue(pid));
    group.reschedule(pid);
}

/// The caller's own kernel-thread group, for callers (e.g. [`crate::alt`])
/// that need to enqueue onto it directly rather than through `schedule`.
pub(crate) fn current_group_handle() -> Arc<KernelThread> {
    current_group().expect("called outside a csp-rt process")
}

/// Run `wake` once on the timer thread no earlier than `deadline` (backs
/// the relative/absolute timeout ALT guards).
pub(crate) fn schedule_wake_at(deadline: Time, wake: impl FnOnce() + Send + 'static) {
    runtime().timers.schedule_wake(deadline, wake);
}

/// Start `p` on a group other than the caller's own, chosen by a
/// least-loaded heuristic, so it can run in parallel with the caller
/// (spec.md's `fork`).
pub fn fork(p: Process) -> CspResult<ProcessHandle> {
    spawn_into(p, runtime().least_loaded())
}

/// Start `p` on the caller's own group: cooperative with the caller, never
/// truly parallel to it (spec.md's `forkInThisThread`). Falls back to
/// [`fork`]'s placement when called from outside any running process.
pub fn fork_in_this_thread(p: Process) -> CspResult<ProcessHandle> {
    match current_group() {
        Some(group) => spawn_into(p, group),
        None => fork(p),
    }
}

/// Start `p` like [`fork_in_this_thread`], then block the caller until it
/// finishes (spec.md's `runInThisThread`: "block the caller on an implicit
/// barrier until `p` finishes").
pub fn run_in_this_thread(p: Process) -> CspResult<()> {
    let mut handle = fork_in_this_thread(p)?;
    handle.join();
    Ok(())
}

fn spawn_into(p: Process, group: Arc<KernelThread>) -> CspResult<ProcessHandle> {
    let pid = ProcessId::fresh();
    runtime().set_home(pid, group.clone());
    let spawn_group = Arc::clone(&group);
    let mut builder = thread::Builder::new().name(format!("csp-rt-{}", pid.as_u64()));
    if let Some(stack_size) = p.stack_size() {
        builder = builder.stack_size(stack_size);
    }
    let join = builder
        .spawn(move || {
            let handle = thread::current();
            spawn_group.register(pid, handle);
            CURRENT_GROUP.with(|g| *g.borrow_mut() = Some(Arc::clone(&spawn_group)));
            spawn_group.enqueue(pid);
            kernel_thread::await_first_turn(&spawn_group, pid);

            p.run();

            spawn_group.finish(pid);
            runtime().forget(pid);
        })
        .map_err(CspError::ResourceExhausted)?;
    Ok(ProcessHandle::new(pid, join))
}
