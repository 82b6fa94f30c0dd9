//! Extended rendezvous (spec.md §4.2.1, §9's `ScopedExtInput`).
//!
//! `beginExtInput` delivers a value without releasing the peer that sent
//! it; `endExtInput` releases it. Modeled as an RAII guard so that a panic
//! during the extended action still runs the release (Testable Property 3,
//! scenario S5) — grounded on the teacher's scoped-acquisition pattern
//! (`arch/x86_64/interrupts.rs`'s `DisableInterrupts` guard).

use crate::primitives::ProcessId;

/// What `endExtInput` must still do when this token is dropped: release a
/// parked writer, or nothing (the value came from a writer that was never
/// blocked, or from a buffer, so there is no one left holding anything
/// open).
pub(crate) struct ExtToken {
    held_writer: Option<ProcessId>,
}

impl ExtToken {
    pub(crate) fn held_writer(pid: ProcessId) -> Self {
        ExtToken { held_writer: Some(pid) }
    }

    pub(crate) fn none() -> Self {
        ExtToken { held_writer: None }
    }

    pub(crate) fn take_held_writer(&mut self) -> Option<ProcessId> {
        self.held_writer.take()
    }
}

/// An in-progress extended input on a reader end. Dropping it (on any exit
/// path, including unwind) performs `endExtInput`.
pub struct ScopedExtInput<'a, T> {
    reader: &'a super::Reader<T>,
    token: Option<ExtToken>,
    value: Option<T>,
    /// Held for the Any-reader sharing variant, so a second reader process
    /// blocks until this extended action ends rather than racing it.
    _shared_guard: Option<parking_lot::MutexGuard<'a, ()>>,
}

impl<'a, T> ScopedExtInput<'a, T> {
    pub(crate) fn new(
        reader: &'a super::Reader<T>,
        value: T,
        token: ExtToken,
        shared_guard: Option<parking_lot::MutexGuard<'a, ()>>,
    ) -> Self {
        ScopedExtInput {
            reader,
            token: Some(token),
            value: Some(value),
            _shared_guard: shared_guard,
        }
    }

    /// The value delivered by `beginExtInput`, borrowed for the duration of
    /// the extended action.
    pub fn value(&self) -> &T {
        self.value.as_ref().expect("value taken exactly once, at drop or via into_inner")
    }

    pub fn value_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("value taken exactly once, at drop or via into_inner")
    }

    /// Consume the guard, taking the value and ending the extended input
    /// immediately rather than at scope exit.
    pub fn into_inner(mut self) -> T {
        self.end();
        self.value.take().expect("value present until end() or drop")
    }

    fn end(&mut self) {
        if let Some(token) = self.token.take() {
            self.reader.end_ext_input(token);
        }
    }
}

impl<T> Drop for ScopedExtInput<'_, T> {
    fn drop(&mut self) {
        self.end();
    }
}
