//! Monotonic time value with microsecond resolution and saturating
//! arithmetic, plus the `sleep_for`/`sleep_until` helpers used by the
//! relative/absolute timeout guards in [`crate::alt`].
//!
//! Grounded on spec.md §6 ("monotonic `currentTime`, `sleepFor`,
//! `sleepUntil`, arithmetic on a `Time` value with at least microsecond
//! resolution") and §7 ("saturating arithmetic at the representable
//! bounds; no exception").

use std::ops::{Add, Sub};
use std::time::{Duration, Instant};

/// A monotonic point in time, microsecond resolution.
///
/// Backed by [`std::time::Instant`] rather than a wall-clock timestamp: the
/// runtime only ever needs to compare and add durations, and `Instant` is
/// guaranteed monotonic on every platform std supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(Instant);

impl Time {
    /// The current monotonic time.
    pub fn now() -> Self {
        Time(Instant::now())
    }

    /// `self + delta`, saturating at the representable bounds instead of
    /// panicking on overflow.
    pub fn saturating_add(self, delta: Duration) -> Self {
        Time(self.0.checked_add(delta).unwrap_or(self.0 + MAX_PRACTICAL_DELTA))
    }

    /// Duration elapsed since `earlier`, or `Duration::ZERO` if `self` is
    /// not after `earlier` (never panics/underflows).
    pub fn saturating_duration_since(self, earlier: Time) -> Duration {
        self.0.saturating_duration_since(earlier.0)
    }

    /// Whether this point in time has already passed.
    pub fn has_passed(self) -> bool {
        self <= Time::now()
    }
}

/// A delta large enough that adding it again can't be distinguished from
/// "effectively never" by any caller of this crate, used so
/// `saturating_add` never has to fall back to panicking.
const MAX_PRACTICAL_DELTA: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 100);

impl Add<Duration> for Time {
    type Output = Time;
    fn add(self, rhs: Duration) -> Time {
        self.saturating_add(rhs)
    }
}

impl Sub<Time> for Time {
    type Output = Duration;
    fn sub(self, rhs: Time) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

/// Monotonic current time (spec.md §6's `currentTime`).
pub fn current_time() -> Time {
    Time::now()
}

/// Suspend the calling process for `duration` (spec.md §6's `sleepFor`).
///
/// Inside a csp-rt process this yields the caller's turn rather than
/// blocking the underlying OS thread, so sibling processes sharing the same
/// kernel-thread group keep running while this one waits — sleep is a
/// suspension point like a channel read, not a thread-level pause. Called
/// from outside any csp-rt process (e.g. from `main` before forking
/// anything), there is no turn to yield, so it falls back to blocking the
/// calling OS thread directly.
pub fn sleep_for(duration: Duration) {
    sleep_until(Time::now() + duration);
}

/// Suspend the calling process until `deadline` (spec.md §6's `sleepUntil`).
/// See [`sleep_for`] for the in-process-vs-bare-thread distinction.
pub fn sleep_until(deadline: Time) {
    if crate::primitives::current_process().is_some() {
        crate::scheduler::sleep_until(deadline);
        return;
    }
    let now = Time::now();
    if deadline > now {
        std::thread::sleep(deadline.saturating_duration_since(now));
    }
}
