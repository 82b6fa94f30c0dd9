//! Grounded on `common/basic.h`'s `Id`: forward everything from one channel
//! to another, unchanged.

use crate::channel::{Reader, Writer};

/// Read a value, write it on, forever. On poison in either direction,
/// poison the other end too so the signal keeps propagating along the
/// pipeline.
pub fn identity<T: Send + 'static>(input: Reader<T>, output: Writer<T>) {
    loop {
        let value = match input.read() {
            Ok(value) => value,
            Err(_) => {
                output.poison();
                return;
            }
        };
        if output.write(value).is_err() {
            input.poison();
            return;
        }
    }
}
