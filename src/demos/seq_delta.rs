//! Grounded on `common/basic.h`'s `SeqDelta`: fan a value out to two output
//! channels, one after the other. Faster than a parallel `Delta` but can
//! deadlock a ring if both downstream processes are expected to run in
//! lockstep — same caveat the original documents.

use crate::channel::{Reader, Writer};

pub fn seq_delta<T: Clone + Send + 'static>(input: Reader<T>, output0: Writer<T>, output1: Writer<T>) {
    loop {
        let value = match input.read() {
            Ok(value) => value,
            Err(_) => {
                output0.poison();
                output1.poison();
                return;
            }
        };
        if output0.write(value.clone()).is_err() {
            input.poison();
            output1.poison();
            return;
        }
        if output1.write(value).is_err() {
            input.poison();
            output0.poison();
            return;
        }
    }
}
