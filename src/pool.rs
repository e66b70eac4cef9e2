//! Generation buffer pool backing decoded frames.
//!
//! Inbound bytes accumulate in a single mutable buffer until a frame is
//! complete; the frame's bytes are then frozen into an immutable
//! generation. Decoded values hold zero-copy slices of that generation, so
//! the backing allocation stays alive exactly as long as any value decoded
//! from it and is released as a group when the last slice is dropped. The
//! pool itself never reallocates a generation in place.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::Error;

/// Pool of inbound bytes, frozen one frame generation at a time.
#[derive(Debug)]
pub struct FramePool {
    buf: BytesMut,
    capacity: usize,
    generation: u64,
}

impl FramePool {
    /// Creates a pool that refuses to buffer more than `capacity` bytes at
    /// a time.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            capacity,
            generation: 0,
        }
    }

    /// Applies a renegotiated capacity. Bytes already pending are kept
    /// even if they exceed the new limit; only further growth is refused.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Number of bytes currently accumulated and not yet frozen.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the pool holds no pending bytes.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of generations frozen so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Accumulated bytes, in arrival order.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Appends inbound bytes.
    ///
    /// Fails with [`Error::NoMemory`] if the pending buffer would exceed
    /// the pool capacity; the caller's decode is aborted but previously
    /// frozen generations are untouched.
    pub fn extend(&mut self, src: &[u8]) -> Result<(), Error> {
        if self.buf.len() + src.len() > self.capacity {
            return Err(Error::NoMemory);
        }
        self.buf.extend_from_slice(src);
        Ok(())
    }

    /// Discards `len` pending bytes from the front.
    pub fn advance(&mut self, len: usize) {
        self.buf.advance(len);
    }

    /// Freezes the first `len` pending bytes into an immutable generation.
    ///
    /// The returned [`Bytes`] (and every slice taken from it) shares one
    /// refcounted allocation; dropping the last slice releases the whole
    /// generation together.
    pub fn freeze(&mut self, len: usize) -> Bytes {
        self.generation += 1;
        self.buf.split_to(len).freeze()
    }

    /// Releases the pool's hold on the current backing allocation.
    ///
    /// No-op while bytes are pending: callers gate this on the assembler
    /// being idle, the only point where no frame is mid-assembly.
    pub fn recycle(&mut self) {
        if self.buf.is_empty() {
            self.buf = BytesMut::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeze_splits_generations() {
        let mut pool = FramePool::new(64);
        pool.extend(b"abcdef").unwrap();
        let first = pool.freeze(3);
        assert_eq!(&first[..], b"abc");
        assert_eq!(pool.pending(), b"def");
        assert_eq!(pool.generation(), 1);

        let second = pool.freeze(3);
        assert_eq!(&second[..], b"def");
        assert!(pool.is_empty());
        assert_eq!(pool.generation(), 2);

        // earlier generations stay valid after later freezes
        assert_eq!(&first[..], b"abc");
    }

    #[test]
    fn capacity_is_enforced() {
        let mut pool = FramePool::new(4);
        pool.extend(b"abcd").unwrap();
        assert!(matches!(pool.extend(b"e"), Err(Error::NoMemory)));
        // the pending bytes are untouched by the failed extend
        assert_eq!(pool.pending(), b"abcd");
    }

    #[test]
    fn recycle_requires_empty_pool() {
        let mut pool = FramePool::new(16);
        pool.extend(b"abc").unwrap();
        pool.recycle();
        assert_eq!(pool.pending(), b"abc");

        pool.advance(3);
        pool.recycle();
        assert!(pool.is_empty());
    }
}
