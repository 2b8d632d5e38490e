#![allow(clippy::len_without_is_empty)]
use std::ops::Index;

/// A fixed-capacity ringbuffer that overwrites its oldest element once full
#[derive(Debug, Default, Clone)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    ix: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be non-zero");
        Self {
            buffer: Vec::<T>::with_capacity(capacity),
            ix: 0,
            capacity,
        }
    }

    /// Returns the number of stored elements
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Insert an element into the buffer, overwriting the oldest element, and return the write index
    pub fn push(&mut self, item: T) -> usize {
        let ix = self.ix;
        if ix >= self.len() {
            self.buffer.push(item);
        } else {
            self.buffer[ix] = item;
        }
        self.ix = (ix + 1) % self.capacity;
        ix
    }

    /// Iterate from the oldest to the newest element
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let split = if self.is_full() { self.ix } else { 0 };
        let (newer, older) = self.buffer.split_at(split);
        older.iter().chain(newer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.ix = 0;
    }

    /// Get a slice view of the internal buffer in storage order
    pub fn view(&self) -> &[T] {
        &self.buffer
    }
}

impl<T> Index<usize> for RingBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.buffer[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ringbuffer_functional() {
        let mut buf = RingBuffer::new(4);
        assert_eq!(buf.len(), 0, "initialized empty");

        for i in 0..4 {
            buf.push(i * 2);
        }

        assert!(buf.is_full());
        assert_eq!(buf.view(), [0, 2, 4, 6], "contents correct");

        buf.push(1);
        let ix = buf.push(3);
        assert_eq!(ix, 1, "write index is correct");
        assert_eq!(buf.len(), 4, "length unchanged");
        assert_eq!(buf.view(), [1, 3, 4, 6], "contents overwritten correctly");
        assert_eq!(
            buf.iter().copied().collect::<Vec<_>>(),
            [4, 6, 1, 3],
            "iteration runs oldest first"
        );
    }

    #[test]
    fn ringbuffer_partial_iter_and_clear() {
        let mut buf = RingBuffer::new(3);
        buf.push('a');
        buf.push('b');
        assert_eq!(buf.iter().collect::<String>(), "ab");

        buf.clear();
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.push('c'), 0, "write index restarts after clear");
    }

    #[test]
    #[should_panic]
    fn ringbuffer_zero_capacity() {
        RingBuffer::<u8>::new(0);
    }
}
