//! Buffer policies for buffered channels (spec.md §3 "Buffered channel"):
//! FIFO-N, Overwriting-N, and Infinite-FIFO.
//!
//! Grounded on the teacher's `ipc.rs` `Port` (a bounded `VecDeque` plus
//! capacity plus wait queue), generalized from fixed 256-byte messages to
//! a generic `T` and split into three policies instead of one fixed-size
//! ring.

use std::collections::VecDeque;

/// A buffer's storage and admission policy. The channel above never
/// inspects buffer internals directly; it only asks whether a `put`/`get`
/// would currently succeed (spec.md §3's `inputWouldSucceed` /
/// `outputWouldSucceed`).
pub trait Buffer<T>: Send {
    /// Insert a value. Only called when [`Buffer::output_would_succeed`]
    /// was true (or the policy never refuses writes, e.g. overwriting or
    /// infinite).
    fn put(&mut self, value: T);

    /// Remove and return the next value in FIFO order. Only called when
    /// [`Buffer::input_would_succeed`] is true.
    fn get(&mut self) -> T;

    /// Would a read succeed right now without blocking?
    fn input_would_succeed(&self) -> bool;

    /// Would a write succeed right now without blocking?
    fn output_would_succeed(&self) -> bool;
}

/// Bounded FIFO of capacity `N`. A writer blocks once `len == capacity`;
/// a reader blocks only when empty.
pub struct FifoBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> FifoBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "FifoBuffer capacity must be at least 1");
        FifoBuffer {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }
}

impl<T: Send> Buffer<T> for FifoBuffer<T> {
    fn put(&mut self, value: T) {
        debug_assert!(self.items.len() < self.capacity);
        self.items.push_back(value);
    }

    fn get(&mut self) -> T {
        self.items.pop_front().expect("get() called on an empty FifoBuffer")
    }

    fn input_would_succeed(&self) -> bool {
        !self.items.is_empty()
    }

    fn output_would_succeed(&self) -> bool {
        self.items.len() < self.capacity
    }
}

/// Keeps the most recent `N` values; a write to a full buffer silently
/// drops the oldest entry instead of blocking. `output_would_succeed` is
/// therefore always true.
pub struct OverwritingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> OverwritingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "OverwritingBuffer capacity must be at least 1");
        OverwritingBuffer {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }
}

impl<T: Send> Buffer<T> for OverwritingBuffer<T> {
    fn put(&mut self, value: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(value);
    }

    fn get(&mut self) -> T {
        self.items
            .pop_front()
            .expect("get() called on an empty OverwritingBuffer")
    }

    fn input_would_succeed(&self) -> bool {
        !self.items.is_empty()
    }

    fn output_would_succeed(&self) -> bool {
        true
    }
}

/// Unbounded FIFO; writers never block.
#[derive(Default)]
pub struct InfiniteBuffer<T> {
    items: VecDeque<T>,
}

impl<T> InfiniteBuffer<T> {
    pub fn new() -> Self {
        InfiniteBuffer { items: VecDeque::new() }
    }
}

impl<T: Send> Buffer<T> for InfiniteBuffer<T> {
    fn put(&mut self, value: T) {
        self.items.push_back(value);
    }

    fn get(&mut self) -> T {
        self.items.pop_front().expect("get() called on an empty InfiniteBuffer")
    }

    fn input_would_succeed(&self) -> bool {
        !self.items.is_empty()
    }

    fn output_would_succeed(&self) -> bool {
        true
    }
}
