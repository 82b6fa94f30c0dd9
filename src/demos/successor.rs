//! Grounded on `common/basic.h`'s `Successor`: read a value, increment it,
//! write it on. Kept around mostly for its occam-pi history and its use in
//! the commstime benchmark ring.
//!
//! The original dispatches to the prefix `++` operator on `DATA_TYPE`;
//! generalized here to an explicit `increment` closure since Rust has no
//! single trait every incrementable type implements.

use crate::channel::{Reader, Writer};

pub fn successor<T: Send + 'static>(input: Reader<T>, output: Writer<T>, mut increment: impl FnMut(&mut T)) {
    loop {
        let mut value = match input.read() {
            Ok(value) => value,
            Err(_) => {
                output.poison();
                return;
            }
        };
        increment(&mut value);
        if output.write(value).is_err() {
            input.poison();
            return;
        }
    }
}
