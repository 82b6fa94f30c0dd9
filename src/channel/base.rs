//! The unbuffered rendezvous core (spec.md §4.2.1).
//!
//! Grounded on the teacher's `ipc.rs` blocking-receive pattern
//! (`Result<Message, IpcError>` plus a wait queue), generalized from
//! queued messages to a single in-flight value handed directly from
//! writer to reader.

use parking_lot::Mutex;

use crate::alt::state::AlterRegistration;
use crate::channel::ext::ExtToken;
use crate::error::{CspResult, PoisonError};
use crate::primitives::{self, ProcessId};
use crate::scheduler;

/// The party currently parked on a channel (spec.md §3's `waiting`).
pub(crate) enum Waiter {
    Reader(ProcessId),
    Writer(ProcessId),
    Alter(AlterRegistration),
}

struct Inner<T> {
    waiting: Option<Waiter>,
    slot: Option<T>,
    poisoned: bool,
}

/// The one/one rendezvous engine shared by every sharing variant; the
/// reader-shared and writer-shared mutexes live one layer up, in
/// [`crate::channel::ends`].
pub(crate) struct Unbuffered<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Unbuffered<T> {
    pub(crate) fn new() -> Self {
        Unbuffered {
            inner: Mutex::new(Inner {
                waiting: None,
                slot: None,
                poisoned: false,
            }),
        }
    }

    pub(crate) fn read(&self) -> CspResult<T> {
        let my_pid = primitives::current_process().expect("channel read outside a csp-rt process");
        let mut inner = self.inner.lock();
        if inner.poisoned {
            return Err(PoisonError.into());
        }
        match inner.waiting.take() {
            Some(Waiter::Writer(writer_pid)) => {
                let value = inner.slot.take().expect("parked writer always leaves a value");
                drop(inner);
                scheduler::schedule(writer_pid);
                Ok(value)
            }
            _ => {
                inner.waiting = Some(Waiter::Reader(my_pid));
                drop(inner);
                scheduler::reschedule_at("channel::read");
                let mut inner = self.inner.lock();
                let value = inner.slot.take().expect("wake after successful rendezvous always carries a value");
                Ok(value)
            }
        }
    }

    pub(crate) fn write(&self, value: T) -> CspResult<()> {
        let my_pid = primitives::current_process().expect("channel write outside a csp-rt process");
        let mut inner = self.inner.lock();
        if inner.poisoned {
            return Err(PoisonError.into());
        }
        match inner.waiting.take() {
            Some(Waiter::Reader(reader_pid)) => {
                inner.slot = Some(value);
                drop(inner);
                scheduler::schedule(reader_pid);
                Ok(())
            }
            Some(Waiter::Alter(registration)) => {
                // The reader is alting on this channel: wake the alt, then
                // take the reader's place as an ordinary parked writer so
                // the alt's eventual real `read()` completes normally.
                registration.fire();
                inner.slot = Some(value);
                inner.waiting = Some(Waiter::Writer(my_pid));
                drop(inner);
                scheduler::reschedule_at("channel::write");
                let inner = self.inner.lock();
                if inner.poisoned && inner.slot.is_some() {
                    return Err(PoisonError.into());
                }
                Ok(())
            }
            _ => {
                inner.slot = Some(value);
                inner.waiting = Some(Waiter::Writer(my_pid));
                drop(inner);
                scheduler::reschedule_at("channel::write");
                let inner = self.inner.lock();
                if inner.poisoned && inner.slot.is_some() {
                    return Err(PoisonError.into());
                }
                Ok(())
            }
        }
    }

    /// Deliver a value from a parked writer without releasing it
    /// (spec.md §4.2.1's extended input). If no writer is parked yet, this
    /// behaves exactly like an ordinary blocking read — the writer that
    /// eventually arrives never blocks in that case, so there is nothing to
    /// hold open.
    pub(crate) fn begin_ext_input(&self) -> CspResult<(T, ExtToken)> {
        let my_pid = primitives::current_process().expect("ext input outside a csp-rt process");
        let mut inner = self.inner.lock();
        if inner.poisoned {
            return Err(PoisonError.into());
        }
        match inner.waiting.take() {
            Some(Waiter::Writer(writer_pid)) => {
                let value = inner.slot.take().expect("parked writer always leaves a value");
                Ok((value, ExtToken::held_writer(writer_pid)))
            }
            _ => {
                inner.waiting = Some(Waiter::Reader(my_pid));
                drop(inner);
                scheduler::reschedule_at("channel::ext_input");
                let mut inner = self.inner.lock();
                let value = inner.slot.take().expect("wake after successful rendezvous always carries a value");
                Ok((value, ExtToken::none()))
            }
        }
    }

    pub(crate) fn end_ext_input(&self, token: ExtToken) {
        if let Some(writer_pid) = token.take_held_writer() {
            scheduler::schedule(writer_pid);
        }
    }

    pub(crate) fn poison(&self) {
        let mut inner = self.inner.lock();
        inner.poisoned = true;
        match inner.waiting.take() {
            Some(Waiter::Reader(pid)) | Some(Waiter::Writer(pid)) => {
                drop(inner);
                scheduler::schedule(pid);
            }
            Some(Waiter::Alter(registration)) => {
                drop(inner);
                registration.fire();
            }
            None => {}
        }
    }

    pub(crate) fn pending(&self) -> bool {
        let inner = self.inner.lock();
        inner.poisoned || matches!(inner.waiting, Some(Waiter::Writer(_)))
    }

    pub(crate) fn enable(&self, registration: AlterRegistration) -> bool {
        let mut inner = self.inner.lock();
        if inner.poisoned || matches!(inner.waiting, Some(Waiter::Writer(_))) {
            return true;
        }
        inner.waiting = Some(Waiter::Alter(registration));
        false
    }

    pub(crate) fn disable(&self, alter: ProcessId) -> bool {
        let mut inner = self.inner.lock();
        let still_registered = matches!(
            &inner.waiting,
            Some(Waiter::Alter(registration)) if registration.pid() == alter
        );
        if still_registered {
            inner.waiting = None;
            false
        } else {
            true
        }
    }
}
