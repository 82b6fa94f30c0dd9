//! csp-rt: a cooperative Communicating Sequential Processes runtime.
//!
//! Independent processes communicate exclusively through synchronous typed
//! channels, synchronize on barriers and buckets, and choose among ready
//! events with a non-deterministic [`alt::Alt`]. Many processes are
//! multiplexed onto a configurable number of kernel-thread groups;
//! scheduling is cooperative within a group, and groups run in parallel.
//!
//! The five core subsystems mirror the component breakdown this runtime was
//! designed around:
//!
//! - [`primitives`] — process identity and low-level atomics.
//! - [`scheduler`] — per-group run queues, the atomic inter-group process
//!   queue, and the timer queue for sleeping processes.
//! - [`channel`] — synchronous rendezvous and buffered channels, in all
//!   four sharing variants.
//! - [`alt`] — the `Alt` guard enable/disable protocol.
//! - [`barrier`] and [`bucket`] — multi-party synchronizers.

pub mod alt;
pub mod barrier;
pub mod bucket;
pub mod channel;
pub mod demos;
pub mod error;
pub mod mobile;
pub mod primitives;
pub mod process;
pub mod scheduler;
pub mod time;

pub use error::{CspError, CspResult};
pub use mobile::Mobile;
pub use process::{Process, ProcessHandle, ProcessState, ScopedForking};
pub use scheduler::{
    check_deadlock, configure, fork, fork_in_this_thread, free_process, free_process_chain,
    reschedule, run_in_this_thread, schedule, yield_now, RuntimeConfig,
};
pub use time::Time;
