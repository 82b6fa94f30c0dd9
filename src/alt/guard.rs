//! The `Guard` abstraction (spec.md §3, §4.3): a polymorphic capability
//! with `enable`/`disable`/`activate`.

use crate::alt::state::AlterRegistration;
use crate::primitives::ProcessId;

/// One event an [`crate::alt::Alt`] can select among.
///
/// `enable`/`disable` never touch the guarded value itself (a channel read,
/// a timeout firing) — they only decide readiness. The winning guard's
/// actual effect (reading the channel, observing the timeout) is performed
/// by ordinary code after `select()` returns the chosen index.
pub trait Guard: Send {
    /// Called once per guard, in order, at the start of a select round.
    /// Returns `true` if the guard is ready right now (in which case it
    /// must not register `registration` anywhere — there is nothing left
    /// to fire asynchronously). Returns `false` after recording
    /// `registration` so some later event can call
    /// [`AlterRegistration::fire`].
    fn enable(&self, registration: AlterRegistration) -> bool;

    /// Called once per guard, in order, at the end of a select round (after
    /// any wait). Returns whether this guard is the (or a) selectable
    /// event: either it was ready at enable time, or it fired while the
    /// alter was enabling/waiting.
    fn disable(&self, alter: ProcessId) -> bool;

    /// Called on the guard chosen by `select()`. Most guards have nothing
    /// to do here; guards with per-round state (the relative timeout guard)
    /// use it, or the `disable` call itself, to reset for the next round.
    fn activate(&self) {}
}
