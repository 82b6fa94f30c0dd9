//! C1 — the primitive layer: process identity and the low-level atomics
//! the rest of the runtime is built from.
//!
//! Grounded on the teacher's newtype-per-identifier pattern
//! (`scheduler/thread.rs`'s `ThreadId`, `scheduler/process.rs`'s
//! `ProcessId`), generalized so that one `ProcessId` now names a whole CSP
//! process (the unit of scheduling in this spec) rather than an OS-level
//! thread specifically.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identity of a scheduled process (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(u64);

static NEXT_PROCESS_ID: AtomicU64 = AtomicU64::new(1);

impl ProcessId {
    /// Allocate a fresh, never-reused process id.
    pub(crate) fn fresh() -> Self {
        ProcessId(NEXT_PROCESS_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Process({})", self.0)
    }
}

/// Identity of a kernel-thread group (spec.md §3's "home kernel thread").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KernelThreadId(u64);

static NEXT_KERNEL_THREAD_ID: AtomicU64 = AtomicU64::new(1);

impl KernelThreadId {
    pub(crate) fn fresh() -> Self {
        KernelThreadId(NEXT_KERNEL_THREAD_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for KernelThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KernelThread({})", self.0)
    }
}

thread_local! {
    /// The identity of the process running on *this* OS thread, if any.
    ///
    /// Every CSP process in this runtime is backed by one native OS thread
    /// (see DESIGN.md's resolution of the stack-representation Open
    /// Question), so "current process" and "current OS thread" coincide.
    static CURRENT_PROCESS: Cell<Option<ProcessId>> = const { Cell::new(None) };
    /// The kernel-thread group the current process is assigned to.
    static CURRENT_KERNEL_THREAD: Cell<Option<KernelThreadId>> = const { Cell::new(None) };
}

/// The process currently executing on this OS thread, if this thread is
/// running inside the csp-rt scheduler at all.
pub fn current_process() -> Option<ProcessId> {
    CURRENT_PROCESS.with(|c| c.get())
}

/// The kernel-thread group the calling process is assigned to.
pub fn current_kernel_thread() -> Option<KernelThreadId> {
    CURRENT_KERNEL_THREAD.with(|c| c.get())
}

/// Bind the current OS thread's process/kernel-thread identity. Called once
/// by the scheduler when a process's backing OS thread starts running.
pub(crate) fn bind_current(process: ProcessId, kernel_thread: KernelThreadId) {
    CURRENT_PROCESS.with(|c| c.set(Some(process)));
    CURRENT_KERNEL_THREAD.with(|c| c.set(Some(kernel_thread)));
}
