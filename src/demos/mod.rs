//! Small channel-connecting processes (spec.md §9's commstime-style demo
//! plumbing), grounded on the original source's `common/basic.h` template
//! process library: `Id`, `Prefix`, `Successor`, `SeqDelta`, and
//! `ChannelPoisoner`, translated from one-shot template classes into plain
//! functions over [`crate::channel::Reader`]/[`crate::channel::Writer`]
//! since Rust processes are closures rather than objects with a `run`
//! method.
//!
//! `Delta` (the original's parallel-output sibling of `SeqDelta`) is left
//! out: it forks its own child processes internally, which does not fit
//! the "one function, one process body" shape the rest of this module
//! uses, and `SeqDelta` already covers the same commstime wiring.

mod identity;
mod poisoner;
mod prefix;
mod seq_delta;
mod successor;

pub use identity::identity;
pub use poisoner::{poison_reader, poison_writer};
pub use prefix::prefix;
pub use seq_delta::seq_delta;
pub use successor::successor;
