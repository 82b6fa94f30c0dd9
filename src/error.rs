//! Crate-wide error types.
//!
//! Grounded on the teacher's preference for explicit `Result` returns over
//! panics in non-test code (`scheduler/ipc.rs`'s `Result<_, IpcError>` port
//! API), generalized from a single IPC-flavoured enum to the three failure
//! kinds spec.md §7 defines for the whole runtime.

use std::fmt;

use crate::primitives::ProcessId;

/// A channel (or channel end) has been poisoned and can no longer
/// communicate.
///
/// Poison is a cooperative cancellation signal, not a panic: it is stored as
/// a boolean in the channel's state and surfaced here only at the point
/// where a process attempts to read or write after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("channel is poisoned")]
pub struct PoisonError;

/// Errors that can escape a `csp-rt` operation.
#[derive(Debug, thiserror::Error)]
pub enum CspError {
    /// The channel end involved in this operation has been poisoned.
    #[error("poisoned: {0}")]
    Poisoned(#[from] PoisonError),

    /// All kernel-thread groups are idle with non-empty wait lists: no
    /// process can ever make progress again. Fatal; reported with the most
    /// recent block site of each stuck process.
    #[error("deadlock detected: {} process(es) blocked with no runnable work", blocked.len())]
    Deadlock { blocked: Vec<BlockedProcess> },

    /// The OS refused to create a new kernel thread or allocate a stack
    /// while forking a process. Already-spawned siblings are joined (via
    /// `ScopedForking`) before this propagates.
    #[error("could not allocate resources to fork a process: {0}")]
    ResourceExhausted(#[source] std::io::Error),
}

/// A snapshot of one process blocked at the moment a deadlock was declared.
#[derive(Debug, Clone)]
pub struct BlockedProcess {
    pub process: ProcessId,
    pub block_site: &'static str,
}

impl fmt::Display for BlockedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} blocked at {}", self.process, self.block_site)
    }
}

pub type CspResult<T> = Result<T, CspError>;
