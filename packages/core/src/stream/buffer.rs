//! Stream buffer and stream buffer pool, per spec.md §3: "A stream buffer
//! is a flat contiguous byte region of fixed capacity. The pool caches up
//! to `max_buffers` idle buffers of a nominal `buffer_size`; `get` returns
//! an idle buffer or allocates a new one while `outstanding < max_buffers`,
//! else fails. `put` returns a buffer; if it matches the current nominal
//! size and the idle list is below `max_buffers`, it is retained, otherwise
//! freed. `set_buffer_size` clears the idle list if the size changes;
//! `set_max_buffers` evicts excess idle buffers."
//!
//! There's no 1:1 file in `original_source` for this — the original relies
//! on Boost.Asio's internal buffer allocator. Grounded instead on the
//! pool's own invariants in spec.md §8 invariant 5.

use bytes::BytesMut;

/// A fixed-capacity byte region leased from a [`BufferPool`].
#[derive(Debug)]
pub struct StreamBuffer {
    bytes: BytesMut,
}

impl StreamBuffer {
    fn new(capacity: usize) -> Self {
        StreamBuffer { bytes: BytesMut::zeroed(capacity) }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

/// A pool of [`StreamBuffer`]s of a nominal size, bounded by `max_buffers`
/// buffers outstanding-or-idle at once.
#[derive(Debug)]
pub struct BufferPool {
    buffer_size: usize,
    max_buffers: usize,
    idle: Vec<StreamBuffer>,
    outstanding: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("buffer pool exhausted: {outstanding} buffers already outstanding, max is {max_buffers}")]
pub struct PoolExhausted {
    pub outstanding: usize,
    pub max_buffers: usize,
}

impl BufferPool {
    #[must_use]
    pub fn new(buffer_size: usize, max_buffers: usize) -> Self {
        BufferPool { buffer_size, max_buffers, idle: Vec::new(), outstanding: 0 }
    }

    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    #[must_use]
    pub fn max_buffers(&self) -> usize {
        self.max_buffers
    }

    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Returns an idle buffer if one is available, otherwise allocates a
    /// new one while `outstanding < max_buffers`.
    pub fn get(&mut self) -> Result<StreamBuffer, PoolExhausted> {
        if let Some(buffer) = self.idle.pop() {
            self.outstanding += 1;
            return Ok(buffer);
        }
        if self.outstanding >= self.max_buffers {
            return Err(PoolExhausted { outstanding: self.outstanding, max_buffers: self.max_buffers });
        }
        self.outstanding += 1;
        Ok(StreamBuffer::new(self.buffer_size))
    }

    /// Returns a buffer to the pool. Retained as idle only if it matches
    /// the current nominal size and the idle list has room; otherwise
    /// dropped.
    pub fn put(&mut self, buffer: StreamBuffer) {
        self.outstanding = self.outstanding.saturating_sub(1);
        if buffer.capacity() == self.buffer_size && self.idle.len() < self.max_buffers {
            self.idle.push(buffer);
        }
    }

    /// Changes the nominal buffer size, clearing the idle list if it
    /// differs from the previous size (stale-sized idle buffers are
    /// useless once the nominal size changes).
    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        if buffer_size != self.buffer_size {
            self.buffer_size = buffer_size;
            self.idle.clear();
        }
    }

    /// Changes the pool's cap, evicting excess idle buffers if it shrank.
    pub fn set_max_buffers(&mut self, max_buffers: usize) {
        self.max_buffers = max_buffers;
        if self.idle.len() > max_buffers {
            self.idle.truncate(max_buffers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_allocates_until_max_then_fails() {
        let mut pool = BufferPool::new(64, 2);
        let a = pool.get().unwrap();
        let b = pool.get().unwrap();
        assert_eq!(pool.outstanding(), 2);
        assert!(pool.get().is_err());
        pool.put(a);
        pool.put(b);
    }

    #[test]
    fn put_retains_matching_size_up_to_max_buffers() {
        let mut pool = BufferPool::new(64, 1);
        let a = pool.get().unwrap();
        pool.put(a);
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.outstanding(), 0);

        let b = pool.get().unwrap();
        assert_eq!(pool.idle_count(), 0);
        pool.put(b);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn set_buffer_size_change_clears_idle_list() {
        let mut pool = BufferPool::new(64, 4);
        let a = pool.get().unwrap();
        pool.put(a);
        assert_eq!(pool.idle_count(), 1);
        pool.set_buffer_size(128);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn set_buffer_size_same_value_is_a_no_op() {
        let mut pool = BufferPool::new(64, 4);
        let a = pool.get().unwrap();
        pool.put(a);
        pool.set_buffer_size(64);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn s5_shrinking_max_buffers_evicts_excess_idle() {
        let mut pool = BufferPool::new(64, 4);
        let bufs: Vec<_> = (0..4).map(|_| pool.get().unwrap()).collect();
        for b in bufs {
            pool.put(b);
        }
        assert_eq!(pool.idle_count(), 4);
        pool.set_max_buffers(2);
        assert_eq!(pool.idle_count(), 2);
    }

    #[test]
    fn s5_get_after_shrinking_to_one_with_one_outstanding_fails() {
        let mut pool = BufferPool::new(64, 4);
        let _a = pool.get().unwrap();
        pool.set_max_buffers(1);
        assert!(pool.get().is_err());
    }
}
