//! Channels (spec.md §4): synchronous rendezvous and buffered variants, each
//! available in the four sharing configurations described by [`Sharing`].

mod base;
pub mod buffer;
mod buffered;
mod ends;
mod ext;

use std::sync::Arc;

use parking_lot::Mutex;

pub use buffer::{Buffer, FifoBuffer, InfiniteBuffer, OverwritingBuffer};
pub use ends::{Reader, Writer};
pub use ext::ScopedExtInput;

use base::Unbuffered;
use buffered::Buffered;
use ends::Core;

/// Which ends of a channel may be held by more than one process at a time
/// (spec.md §4.1). A plain channel allows exactly one reader and one
/// writer process; the Any-* variants add a mutex per shared end so
/// multiple processes can take turns holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
    OneReaderOneWriter,
    OneReaderAnyWriter,
    AnyReaderOneWriter,
    AnyReaderAnyWriter,
}

impl Sharing {
    fn reader_shared(self) -> bool {
        matches!(self, Sharing::AnyReaderOneWriter | Sharing::AnyReaderAnyWriter)
    }

    fn writer_shared(self) -> bool {
        matches!(self, Sharing::OneReaderAnyWriter | Sharing::AnyReaderAnyWriter)
    }
}

fn make_ends<T: Send + 'static>(core: Core<T>, sharing: Sharing) -> (Reader<T>, Writer<T>) {
    let core = Arc::new(core);
    let reader_lock = sharing.reader_shared().then(|| Arc::new(Mutex::new(())));
    let writer_lock = sharing.writer_shared().then(|| Arc::new(Mutex::new(())));
    (
        Reader::new(Arc::clone(&core), reader_lock),
        Writer::new(core, writer_lock),
    )
}

/// A synchronous rendezvous channel: `write` blocks until a reader takes
/// the value (spec.md §4.2.1).
pub fn unbuffered<T: Send + 'static>(sharing: Sharing) -> (Reader<T>, Writer<T>) {
    make_ends(Core::Unbuffered(Unbuffered::new()), sharing)
}

/// A channel backed by a buffering policy (spec.md §4.2.2): `write` blocks
/// only when the buffer refuses the value (a full FIFO buffer), and `read`
/// blocks only when the buffer is empty.
pub fn buffered<T: Send + 'static>(sharing: Sharing, buffer: Box<dyn Buffer<T>>) -> (Reader<T>, Writer<T>) {
    make_ends(Core::Buffered(Buffered::new(buffer)), sharing)
}

/// One reader process, one writer process, synchronous rendezvous.
pub fn one2one<T: Send + 'static>() -> (Reader<T>, Writer<T>) {
    unbuffered(Sharing::OneReaderOneWriter)
}

/// One reader process, any number of writer processes taking turns.
pub fn one2any<T: Send + 'static>() -> (Reader<T>, Writer<T>) {
    unbuffered(Sharing::OneReaderAnyWriter)
}

/// Any number of reader processes taking turns, one writer process.
pub fn any2one<T: Send + 'static>() -> (Reader<T>, Writer<T>) {
    unbuffered(Sharing::AnyReaderOneWriter)
}

/// Any number of reader processes and any number of writer processes, each
/// taking turns on their respective end.
pub fn any2any<T: Send + 'static>() -> (Reader<T>, Writer<T>) {
    unbuffered(Sharing::AnyReaderAnyWriter)
}

/// One reader, one writer, backed by a buffering policy.
pub fn one2one_buffered<T: Send + 'static>(buffer: Box<dyn Buffer<T>>) -> (Reader<T>, Writer<T>) {
    buffered(Sharing::OneReaderOneWriter, buffer)
}

/// One reader, any writers, backed by a buffering policy.
pub fn one2any_buffered<T: Send + 'static>(buffer: Box<dyn Buffer<T>>) -> (Reader<T>, Writer<T>) {
    buffered(Sharing::OneReaderAnyWriter, buffer)
}

/// Any readers, one writer, backed by a buffering policy.
pub fn any2one_buffered<T: Send + 'static>(buffer: Box<dyn Buffer<T>>) -> (Reader<T>, Writer<T>) {
    buffered(Sharing::AnyReaderOneWriter, buffer)
}

/// Any readers, any writers, backed by a buffering policy.
pub fn any2any_buffered<T: Send + 'static>(buffer: Box<dyn Buffer<T>>) -> (Reader<T>, Writer<T>) {
    buffered(Sharing::AnyReaderAnyWriter, buffer)
}
