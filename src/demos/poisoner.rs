//! Grounded on `common/basic.h`'s `ChannelPoisoner`: a one-shot process
//! whose entire body is poisoning the end it was handed. Useful for
//! tearing down a pipeline from one spot without threading a poison call
//! through every participant.

use crate::channel::{Reader, Writer};

pub fn poison_reader<T: Send + 'static>(end: Reader<T>) {
    end.poison();
}

pub fn poison_writer<T: Send + 'static>(end: Writer<T>) {
    end.poison();
}
