// SPDX-License-Identifier: MPL-2.0
//! Bounded FIFO that drops its oldest entry on overflow.
//!
//! Used for the diagnostics event log and for the offline action queue.

use std::collections::VecDeque;

pub use crate::domain::diagnostics::BufferCapacity;

/// A FIFO with fixed capacity.
///
/// When full, pushing a new element evicts the oldest one and hands it back
/// to the caller. Elements are kept oldest first.
///
/// # Example
///
/// ```
/// use feedback_kit::diagnostics::CircularBuffer;
///
/// let mut buffer = CircularBuffer::with_raw_capacity(2);
/// assert_eq!(buffer.push(1), None);
/// assert_eq!(buffer.push(2), None);
/// assert_eq!(buffer.push(3), Some(1));
///
/// let items: Vec<_> = buffer.iter().copied().collect();
/// assert_eq!(items, vec![2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> CircularBuffer<T> {
    /// Creates a buffer sized for diagnostic events.
    #[must_use]
    pub fn new(capacity: BufferCapacity) -> Self {
        Self::with_raw_capacity(capacity.value())
    }

    /// Creates a buffer with an arbitrary capacity (at least 1).
    #[must_use]
    pub fn with_raw_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Appends an element, returning the evicted oldest element if the
    /// buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.data.len() >= self.capacity {
            self.data.pop_front()
        } else {
            None
        };
        self.data.push_back(item);
        evicted
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Removes and returns every element, oldest first.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.data.drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
