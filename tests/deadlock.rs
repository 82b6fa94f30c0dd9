//! Deadlock detection (spec.md §4.5/§7): once every kernel-thread group is
//! idle with a process still blocked and no timer pending, the watchdog
//! declares a deadlock reported with that process's most recent block site.

use std::time::Duration;

use csp_rt::channel::one2one;
use csp_rt::{check_deadlock, fork, CspError, Process};

#[test]
fn check_deadlock_reports_a_process_blocked_on_a_channel_with_no_writer() {
    let (reader, writer) = one2one::<i32>();
    drop(writer); // no writer will ever arrive; the reader blocks forever

    // Forked directly (not through a `ScopedForking` scope) so nothing in
    // this test ever tries to join the permanently-parked thread it leaks.
    fork(Process::new(move || {
        let _ = reader.read();
    }))
    .unwrap();

    std::thread::sleep(Duration::from_millis(300));

    match check_deadlock() {
        Err(CspError::Deadlock { blocked }) => {
            assert!(!blocked.is_empty());
            assert!(blocked.iter().any(|b| b.block_site == "channel::read"));
        }
        other => panic!("expected a reported deadlock, got {other:?}"),
    }
}
