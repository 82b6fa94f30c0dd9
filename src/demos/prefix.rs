//! Grounded on `common/basic.h`'s `Prefix`: send an initial value before
//! behaving like [`crate::demos::identity`]. Used to break the cycle in a
//! commstime ring, where something has to produce the first value before
//! any reader has written anything.

use crate::channel::{Reader, Writer};

/// Write `initial` `times` times, then forward values read from `input` to
/// `output` forever.
pub fn prefix<T: Clone + Send + 'static>(input: Reader<T>, output: Writer<T>, initial: T, times: usize) {
    for _ in 0..times {
        if output.write(initial.clone()).is_err() {
            input.poison();
            return;
        }
    }
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
