//! The buffered-channel core (spec.md §4.2.2): a [`Buffer`] policy plus the
//! same `waiting`/poison bookkeeping as the unbuffered core, reused so a
//! writer blocked on a full buffer and a reader blocked on an empty one
//! still rendezvous through one `waiting` slot.

use parking_lot::Mutex;

use crate::alt::state::AlterRegistration;
use crate::channel::buffer::Buffer;
use crate::channel::ext::ExtToken;
use crate::error::{CspResult, PoisonError};
use crate::primitives::{self, ProcessId};
use crate::scheduler;

use super::base::Waiter;

struct Inner<T> {
    buffer: Box<dyn Buffer<T>>,
    waiting: Option<Waiter>,
    /// A writer's value, parked because the buffer was full when it tried
    /// to put. Admitted into the buffer as soon as a slot frees.
    blocked_write: Option<T>,
    poisoned: bool,
}

pub(crate) struct Buffered<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Buffered<T> {
    pub(crate) fn new(buffer: Box<dyn Buffer<T>>) -> Self {
        Buffered {
            inner: Mutex::new(Inner {
                buffer,
                waiting: None,
                blocked_write: None,
                poisoned: false,
            }),
        }
    }

    /// If a writer is parked and a slot just freed, admit its value and
    /// wake it.
    fn admit_blocked_writer(inner: &mut Inner<T>) {
        if inner.buffer.output_would_succeed() {
            if let Some(Waiter::Writer(pid)) = inner.waiting.take() {
                let value = inner.blocked_write.take().expect("parked writer always leaves a pending value");
                inner.buffer.put(value);
                scheduler::schedule(pid);
            }
        }
    }

    pub(crate) fn read(&self) -> CspResult<T> {
        let my_pid = primitives::current_process().expect("channel read outside a csp-rt process");
        let mut inner = self.inner.lock();
        if !inner.buffer.input_would_succeed() {
            if inner.poisoned {
                return Err(PoisonError.into());
            }
            inner.waiting = Some(Waiter::Reader(my_pid));
            drop(inner);
            scheduler::reschedule_at("channel::read");
            let mut inner = self.inner.lock();
            if inner.buffer.input_would_succeed() {
                let value = inner.buffer.get();
                Self::admit_blocked_writer(&mut inner);
                return Ok(value);
            }
            debug_assert!(inner.poisoned, "reader woken with nothing to read and no poison");
            return Err(PoisonError.into());
        }
        let value = inner.buffer.get();
        Self::admit_blocked_writer(&mut inner);
        Ok(value)
    }

    pub(crate) fn write(&self, value: T) -> CspResult<()> {
        let my_pid = primitives::current_process().expect("channel write outside a csp-rt process");
        let mut inner = self.inner.lock();
        if inner.poisoned {
            return Err(PoisonError.into());
        }
        if inner.buffer.output_would_succeed() {
            inner.buffer.put(value);
            match inner.waiting.take() {
                Some(Waiter::Reader(pid)) => scheduler::schedule(pid),
                Some(Waiter::Alter(registration)) => registration.fire(),
                _ => {}
            }
            return Ok(());
        }
        inner.blocked_write = Some(value);
        inner.waiting = Some(Waiter::Writer(my_pid));
        drop(inner);
        scheduler::reschedule_at("channel::write");
        let inner = self.inner.lock();
        if inner.poisoned && inner.blocked_write.is_some() {
            return Err(PoisonError.into());
        }
        Ok(())
    }

    /// Buffered extended input commits the read (and wakes any writer
    /// blocked on the now-free slot) immediately; there is no parked
    /// writer to hold open the way unbuffered extended input holds one
    /// (spec.md §4.2.2).
    pub(crate) fn begin_ext_input(&self) -> CspResult<(T, ExtToken)> {
        let value = self.read()?;
        Ok((value, ExtToken::none()))
    }

    pub(crate) fn end_ext_input(&self, _token: ExtToken) {}

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
        inner.poisoned || inner.buffer.input_would_succeed()
    }

    pub(crate) fn enable(&self, registration: AlterRegistration) -> bool {
        let mut inner = self.inner.lock();
        if inner.poisoned || inner.buffer.input_would_succeed() {
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
