//! Reader and writer handles (spec.md §4.1): the sharing variants all wrap
//! the same rendezvous core, differing only in whether a handle carries a
//! mutex that serializes concurrent holders of an Any-reader/Any-writer end.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::alt::state::AlterRegistration;
use crate::channel::base::Unbuffered;
use crate::channel::buffered::Buffered;
use crate::channel::ext::{ExtToken, ScopedExtInput};
use crate::error::CspResult;
use crate::primitives::ProcessId;

/// Dispatches to whichever rendezvous engine backs a channel. Kept as an
/// enum rather than `Arc<dyn Trait>` since there are exactly two shapes and
/// neither needs to be added to by users of this crate.
pub(crate) enum Core<T> {
    Unbuffered(Unbuffered<T>),
    Buffered(Buffered<T>),
}

impl<T> Core<T> {
    fn read(&self) -> CspResult<T> {
        match self {
            Core::Unbuffered(c) => c.read(),
            Core::Buffered(c) => c.read(),
        }
    }

    fn write(&self, value: T) -> CspResult<()> {
        match self {
            Core::Unbuffered(c) => c.write(value),
            Core::Buffered(c) => c.write(value),
        }
    }

    fn begin_ext_input(&self) -> CspResult<(T, ExtToken)> {
        match self {
            Core::Unbuffered(c) => c.begin_ext_input(),
            Core::Buffered(c) => c.begin_ext_input(),
        }
    }

    fn end_ext_input(&self, token: ExtToken) {
        match self {
            Core::Unbuffered(c) => c.end_ext_input(token),
            Core::Buffered(c) => c.end_ext_input(token),
        }
    }

    fn poison(&self) {
        match self {
            Core::Unbuffered(c) => c.poison(),
            Core::Buffered(c) => c.poison(),
        }
    }

    fn pending(&self) -> bool {
        match self {
            Core::Unbuffered(c) => c.pending(),
            Core::Buffered(c) => c.pending(),
        }
    }

    fn enable(&self, registration: AlterRegistration) -> bool {
        match self {
            Core::Unbuffered(c) => c.enable(registration),
            Core::Buffered(c) => c.enable(registration),
        }
    }

    fn disable(&self, alter: ProcessId) -> bool {
        match self {
            Core::Unbuffered(c) => c.disable(alter),
            Core::Buffered(c) => c.disable(alter),
        }
    }
}

/// The reading end of a channel. Cloneable so an Any-reader channel can hand
/// out one handle per reading process; cloned handles over a One-reader
/// channel are the caller's responsibility to use from a single process at
/// a time (spec.md §4.1's sharing contract is a usage discipline, not
/// something the type system enforces here, matching the teacher's
/// `Arc`-shared handle style elsewhere in the tree).
pub struct Reader<T> {
    pub(crate) core: Arc<Core<T>>,
    /// `Some` for the Any-reader sharing variants, serializing concurrent
    /// readers so only one is ever parked against the core at a time.
    shared: Option<Arc<Mutex<()>>>,
}

impl<T> Clone for Reader<T> {
    fn clone(&self) -> Self {
        Reader {
            core: Arc::clone(&self.core),
            shared: self.shared.clone(),
        }
    }
}

impl<T: Send + 'static> Reader<T> {
    pub(crate) fn new(core: Arc<Core<T>>, shared: Option<Arc<Mutex<()>>>) -> Self {
        Reader { core, shared }
    }

    /// Block until a value is available, returning it.
    pub fn read(&self) -> CspResult<T> {
        let _guard = self.shared.as_ref().map(|m| m.lock());
        self.core.read()
    }

    /// Begin an extended rendezvous: the value is delivered immediately but
    /// the peer that sent it (if any) is not released until the returned
    /// guard is dropped or consumed.
    pub fn ext_input(&self) -> CspResult<ScopedExtInput<'_, T>> {
        let guard = self.shared.as_ref().map(|m| m.lock());
        let (value, token) = self.core.begin_ext_input()?;
        Ok(ScopedExtInput::new(self, value, token, guard))
    }

    pub(crate) fn end_ext_input(&self, token: ExtToken) {
        self.core.end_ext_input(token);
    }

    /// Poison the channel: every current and future `read`/`write` fails,
    /// and the poison propagates to whichever end is currently parked.
    pub fn poison(&self) {
        self.core.poison();
    }

    /// True if a `read` would not block right now.
    pub fn pending(&self) -> bool {
        self.core.pending()
    }

    pub(crate) fn enable_guard(&self, registration: AlterRegistration) -> bool {
        self.core.enable(registration)
    }

    pub(crate) fn disable_guard(&self, alter: ProcessId) -> bool {
        self.core.disable(alter)
    }
}

/// The writing end of a channel.
pub struct Writer<T> {
    pub(crate) core: Arc<Core<T>>,
    shared: Option<Arc<Mutex<()>>>,
}

impl<T> Clone for Writer<T> {
    fn clone(&self) -> Self {
        Writer {
            core: Arc::clone(&self.core),
            shared: self.shared.clone(),
        }
    }
}

impl<T: Send + 'static> Writer<T> {
    pub(crate) fn new(core: Arc<Core<T>>, shared: Option<Arc<Mutex<()>>>) -> Self {
        Writer { core, shared }
    }

    /// Block until the value has been taken by a reader (unbuffered) or
    /// admitted into the buffer (buffered).
    pub fn write(&self, value: T) -> CspResult<()> {
        let _guard = self.shared.as_ref().map(|m| m.lock());
        self.core.write(value)
    }

    pub fn poison(&self) {
        self.core.poison();
    }
}
