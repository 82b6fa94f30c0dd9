//! The channel input guard (spec.md §4.3): wraps a channel's reader end so
//! an [`crate::alt::Alt`] can wait for "this channel has something to
//! read" alongside timeouts and skips.

use std::cell::Cell;

use crate::alt::guard::Guard;
use crate::alt::state::AlterRegistration;
use crate::channel::Reader;
use crate::primitives::ProcessId;

/// A repeated guard (spec.md §4.3's "Repeated guard") is just another
/// `ChannelInputGuard` built from a cloned `Reader` — each position in the
/// guard list is independent, matching the spec note that repeated guards
/// over the same channel are allowed.
pub struct ChannelInputGuard<T> {
    reader: Reader<T>,
    ready_at_enable: Cell<bool>,
}

impl<T: Send + 'static> ChannelInputGuard<T> {
    pub fn new(reader: Reader<T>) -> Self {
        ChannelInputGuard {
            reader,
            ready_at_enable: Cell::new(false),
        }
    }
}

impl<T: Send + 'static> Guard for ChannelInputGuard<T> {
    fn enable(&self, registration: AlterRegistration) -> bool {
        let ready = self.reader.enable_guard(registration);
        self.ready_at_enable.set(ready);
        ready
    }

    fn disable(&self, alter: ProcessId) -> bool {
        if self.ready_at_enable.get() {
            self.ready_at_enable.set(false);
            return true;
        }
        self.reader.disable_guard(alter)
    }
}
