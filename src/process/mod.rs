//! Process identity, bodies, and structured-concurrency scopes.
//!
//! Grounded on the teacher's `scheduler/process.rs` process-as-container
//! pattern and `scheduler/thread.rs`'s `ThreadState`, generalized: a
//! `csp-rt` process is the unit of both identity and execution (no
//! separate process/thread split), and its state machine gains the
//! ALT-specific states spec.md §3 requires.

mod scope;

pub use scope::ScopedForking;

use std::thread::JoinHandle;

use crate::primitives::ProcessId;

/// The scheduler state of a process (spec.md §3), mirroring the shape of
/// the teacher's `ThreadState` with the ALT phases this runtime adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Ready,
    Blocked,
    AltEnabling,
    AltWaiting,
    AltDisabling,
    Finished,
}

/// A process body: a runnable closure plus an optional stack-size hint.
///
/// `csp-rt` processes are backed by native OS threads (DESIGN.md), so the
/// stack-size hint maps directly onto `std::thread::Builder::stack_size`
/// rather than a hand-rolled stack allocation.
pub struct Process {
    body: Box<dyn FnOnce() + Send + 'static>,
    stack_size: Option<usize>,
}

impl Process {
    /// Wrap a closure as a process body with the platform default stack
    /// size.
    pub fn new(body: impl FnOnce() + Send + 'static) -> Self {
        Process {
            body: Box::new(body),
            stack_size: None,
        }
    }

    /// As [`Process::new`], but with an explicit stack size hint.
    pub fn with_stack_size(body: impl FnOnce() + Send + 'static, stack_size: usize) -> Self {
        Process {
            body: Box::new(body),
            stack_size: Some(stack_size),
        }
    }

    pub(crate) fn stack_size(&self) -> Option<usize> {
        self.stack_size
    }

    pub(crate) fn run(self) {
        (self.body)()
    }
}

/// A handle to a started process (spec.md §6: `fork`/`forkInThisThread`
/// return a handle a `ScopedForking` scope joins on exit).
pub struct ProcessHandle {
    id: ProcessId,
    join: Option<JoinHandle<()>>,
}

impl ProcessHandle {
    pub(crate) fn new(id: ProcessId, join: JoinHandle<()>) -> Self {
        ProcessHandle { id, join: Some(join) }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Block until this process's body has returned. Idempotent: joining
    /// twice is a no-op the second time.
    pub fn join(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
