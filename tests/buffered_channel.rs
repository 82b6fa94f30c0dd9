//! Buffered channels: draining after writer-poison (spec.md §8 property 5,
//! scenario S3) and the Overwriting/Infinite policies' non-blocking writers.

use std::sync::{Arc, Mutex};

use csp_rt::channel::{one2one_buffered, FifoBuffer, InfiniteBuffer, OverwritingBuffer};
use csp_rt::{Process, ScopedForking};

#[test]
fn fifo_buffer_drains_fully_after_writer_poison() {
    // spec.md scenario S3: FIFO-2 buffer preloaded with [20, 21], writer
    // poisons, then reads 1 and 2 still succeed and read 3 sees poison.
    let (reader, writer) = one2one_buffered::<i32>(Box::new(FifoBuffer::new(2)));

    let mut scope = ScopedForking::new();
    scope
        .fork(Process::new(move || {
            writer.write(20).unwrap();
            writer.write(21).unwrap();
            writer.poison();
        }))
        .unwrap();
    drop(scope);

    let outcomes = Arc::new(Mutex::new(Vec::new()));
    {
        let outcomes = Arc::clone(&outcomes);
        let mut scope = ScopedForking::new();
        scope
            .fork(Process::new(move || {
                for _ in 0..3 {
                    outcomes.lock().unwrap().push(reader.read());
                }
            }))
            .unwrap();
    }

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes[0].as_ref().unwrap(), &20);
    assert_eq!(outcomes[1].as_ref().unwrap(), &21);
    assert!(outcomes[2].is_err());
}

#[test]
fn fifo_buffer_blocks_writer_once_full() {
    let (reader, writer) = one2one_buffered::<i32>(Box::new(FifoBuffer::new(1)));
    let second_write_completed = Arc::new(Mutex::new(false));

    let mut scope = ScopedForking::new();
    {
        let second_write_completed = Arc::clone(&second_write_completed);
        scope
            .fork(Process::new(move || {
                writer.write(1).unwrap();
                // The buffer (capacity 1) is now full; this write must
                // block until a reader makes room.
                writer.write(2).unwrap();
                *second_write_completed.lock().unwrap() = true;
            }))
            .unwrap();
    }
    std::thread::sleep(std::time::Duration::from_millis(30));
    assert!(!*second_write_completed.lock().unwrap());

    scope
        .fork(Process::new(move || {
            assert_eq!(reader.read().unwrap(), 1);
            assert_eq!(reader.read().unwrap(), 2);
        }))
        .unwrap();
    drop(scope);

    assert!(*second_write_completed.lock().unwrap());
}

#[test]
fn overwriting_buffer_never_blocks_the_writer() {
    let (reader, writer) = one2one_buffered::<i32>(Box::new(OverwritingBuffer::new(2)));
    let mut scope = ScopedForking::new();
    scope
        .fork(Process::new(move || {
            for i in 0..5 {
                writer.write(i).unwrap();
            }
        }))
        .unwrap();
    drop(scope);

    // Only the last two values (capacity 2) survive.
    let received = Arc::new(Mutex::new(Vec::new()));
    {
        let received = Arc::clone(&received);
        let mut scope = ScopedForking::new();
        scope
            .fork(Process::new(move || {
                received.lock().unwrap().push(reader.read().unwrap());
                received.lock().unwrap().push(reader.read().unwrap());
            }))
            .unwrap();
    }
    assert_eq!(*received.lock().unwrap(), vec![3, 4]);
}

#[test]
fn infinite_buffer_never_blocks_the_writer() {
    let (reader, writer) = one2one_buffered::<i32>(Box::new(InfiniteBuffer::new()));
    let mut scope = ScopedForking::new();
    scope
        .fork(Process::new(move || {
            for i in 0..500 {
                writer.write(i).unwrap();
            }
        }))
        .unwrap();
    drop(scope);

    let received = Arc::new(Mutex::new(Vec::new()));
    {
        let received = Arc::clone(&received);
        let mut scope = ScopedForking::new();
        scope
            .fork(Process::new(move || {
                for _ in 0..500 {
                    received.lock().unwrap().push(reader.read().unwrap());
                }
            }))
            .unwrap();
    }
    assert_eq!(*received.lock().unwrap(), (0..500).collect::<Vec<_>>());
}
