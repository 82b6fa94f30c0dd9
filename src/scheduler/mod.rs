//! C2 — the scheduler: per-group run queues, the atomic inter-group
//! process queue, the timer queue, and the crate-level singleton tying
//! them together.

mod atomic_queue;
pub(crate) mod kernel_thread;
mod runtime;
pub(crate) mod timer;

pub use runtime::{
    configure, fork, fork_in_this_thread, free_process, free_process_chain, reschedule,
    run_in_this_thread, schedule, yield_now, RuntimeConfig,
};
pub use runtime::check_deadlock;
pub(crate) use runtime::{
    current_group_handle, mark_runnable, reschedule_at, schedule_wake_at, sleep_until,
};
