// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2025 - 2026 Michael Büsch <m@bues.ch>

//! Bounded byte FIFO over a caller-owned buffer.
//!
//! The FIFO is safe for exactly one producer and one consumer
//! without any lock. The producer only ever writes the write index word
//! and the consumer only ever writes the read index word.
//!
//! Each index word carries the slot index in its low bits and a lap bit
//! in its top bit. The lap bit flips every time the index wraps around.
//! Equal slot indices mean "empty" if the lap bits are equal
//! and "full" if they differ. That way the full flag is published
//! atomically together with the index that caused it.
//!
//! Bytes are always copied before the index word is published
//! with a release store. The other side reads the index word
//! with an acquire load before touching the bytes.

use crate::{
    FifoError, FifoResult,
    endpoint::{Consumer, Producer},
};
use core::{
    marker::PhantomData,
    ptr::{NonNull, copy_nonoverlapping},
    sync::atomic::{AtomicUsize, Ordering},
};

/// Lap bit of an index word.
///
/// Slice lengths never exceed `isize::MAX`, so the top bit is never part of an index.
const LAP: usize = 1 << (usize::BITS - 1);

/// Slot index part of an index word.
#[inline(always)]
const fn slot(word: usize) -> usize {
    word & !LAP
}

/// Advance an index word by `n` slots. `n` must not exceed `capacity`.
#[inline(always)]
const fn advance(word: usize, n: usize, capacity: usize) -> usize {
    let index = slot(word) + n;
    if index >= capacity {
        (index - capacity) | ((word & LAP) ^ LAP)
    } else {
        index | (word & LAP)
    }
}

/// Both indices point to the same slot, one lap apart.
#[inline(always)]
const fn is_full(write: usize, read: usize) -> bool {
    slot(write) == slot(read) && (write & LAP) != (read & LAP)
}

/// Number of free bytes.
///
/// With `D = write - read` the free space is `(capacity - D) mod capacity`.
/// A result of zero is either completely empty or completely full.
#[inline(always)]
const fn free_space(capacity: usize, write: usize, read: usize) -> usize {
    let left = (capacity - slot(write) + slot(read)) % capacity;
    if left != 0 {
        left
    } else if is_full(write, read) {
        0
    } else {
        capacity
    }
}

/// Bounded byte FIFO.
///
/// The FIFO wraps a byte buffer owned by the caller. It never allocates.
/// The capacity is the length of that buffer.
///
/// Use [ByteFifo::put] and [ByteFifo::get] if producer and consumer
/// run in the same context.
/// Use [ByteFifo::split] to hand the producer and the consumer side
/// to two different contexts, e.g. an interrupt handler and `main()`.
pub struct ByteFifo<'buf> {
    storage: NonNull<u8>,
    capacity: usize,
    write: AtomicUsize,
    read: AtomicUsize,
    _storage: PhantomData<&'buf mut [u8]>,
}

// SAFETY: The FIFO holds the unique borrow of the buffer.
// `&mut [u8]` is Send, and so are the atomic indices.
unsafe impl Send for ByteFifo<'_> {}

// SAFETY:
// All public `&self` methods only load the atomic index words.
// The buffer is only accessed from `produce` and `consume`,
// whose callers guarantee that there is at most one producer
// and at most one consumer at any time.
// Producer and consumer never access the same slot concurrently,
// because a slot only changes hands with an index publication
// (release store, acquire load).
unsafe impl Sync for ByteFifo<'_> {}

impl<'buf> ByteFifo<'buf> {
    /// Create a new, empty FIFO on top of `buf`.
    ///
    /// Returns [FifoError::InvalidArgument] if `buf` is empty.
    pub fn new(buf: &'buf mut [u8]) -> FifoResult<Self> {
        if buf.is_empty() {
            return Err(FifoError::InvalidArgument);
        }
        let capacity = buf.len();

        #[cfg(feature = "defmt")]
        defmt::trace!("bfifo: init, capacity={=usize}", capacity);

        Ok(Self {
            storage: NonNull::from(buf).cast::<u8>(),
            capacity,
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
            _storage: PhantomData,
        })
    }

    /// Re-initialize the FIFO on top of `buf`.
    ///
    /// All buffered bytes are discarded.
    /// On error the FIFO is left untouched.
    pub fn init(&mut self, buf: &'buf mut [u8]) -> FifoResult<()> {
        *self = Self::new(buf)?;
        Ok(())
    }

    /// Discard all buffered bytes.
    pub fn clear(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::trace!("bfifo: clear");

        *self.write.get_mut() = 0;
        *self.read.get_mut() = 0;
    }

    /// Total number of bytes the FIFO can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of free bytes.
    #[inline]
    pub fn free_space(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        free_space(self.capacity, write, read)
    }

    /// Number of stored, unread bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.capacity - self.free_space()
    }

    /// Returns `true` if no bytes are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if all `capacity` bytes are stored.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_space() == 0
    }

    /// Put all of `bytes` into the FIFO, or nothing.
    ///
    /// Returns [FifoError::OutOfRange] if `bytes` is longer than the capacity.
    /// Returns [FifoError::Full] if there is not enough free space right now.
    /// Partial writes never happen.
    #[inline]
    pub fn put(&mut self, bytes: &[u8]) -> FifoResult<()> {
        // SAFETY: `&mut self` excludes every other producer.
        unsafe { self.produce(bytes) }
    }

    /// Put a single byte into the FIFO.
    #[inline]
    pub fn put_byte(&mut self, byte: u8) -> FifoResult<()> {
        self.put(core::slice::from_ref(&byte))
    }

    /// Get up to `dst.len()` bytes from the FIFO.
    ///
    /// Returns the number of bytes copied to the start of `dst`,
    /// which may be less than requested.
    /// An empty `dst` returns `Ok(0)`.
    /// Returns [FifoError::Empty] if there is nothing to read.
    #[inline]
    pub fn get(&mut self, dst: &mut [u8]) -> FifoResult<usize> {
        // SAFETY: `&mut self` excludes every other consumer.
        unsafe { self.consume(dst) }
    }

    /// Get a single byte from the FIFO.
    #[inline]
    pub fn get_byte(&mut self) -> FifoResult<u8> {
        let mut byte = 0;
        self.get(core::slice::from_mut(&mut byte))?;
        Ok(byte)
    }

    /// Split the FIFO into its producer and consumer side.
    ///
    /// The two handles can be moved to different execution contexts.
    pub fn split(&mut self) -> (Producer<'_, 'buf>, Consumer<'_, 'buf>) {
        let fifo: &Self = self;
        // SAFETY:
        // We hold `&mut self` for the lifetime of both handles.
        // Therefore, exactly one producer and one consumer exist.
        unsafe { (Producer::new(fifo), Consumer::new(fifo)) }
    }

    /// Producer side of [ByteFifo::put].
    ///
    /// # Safety
    ///
    /// The caller must be the only producer of this FIFO for the duration of the call.
    pub(crate) unsafe fn produce(&self, bytes: &[u8]) -> FifoResult<()> {
        let len = bytes.len();
        if len > self.capacity {
            // Can never fit. This is not the same as being full right now.
            return Err(FifoError::OutOfRange);
        }
        if len == 0 {
            return Ok(());
        }

        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);
        if free_space(self.capacity, write, read) < len {
            return Err(FifoError::Full);
        }

        let start = slot(write);
        let first = len.min(self.capacity - start);
        let base = self.storage.as_ptr();
        // SAFETY:
        // `start + first <= capacity` and `len - first < capacity`,
        // so both copies stay within the buffer.
        // The target slots are free. The consumer does not touch free slots
        // and we are the only producer.
        // `bytes` cannot overlap the buffer, because we hold its unique borrow.
        unsafe {
            copy_nonoverlapping(bytes.as_ptr(), base.add(start), first);
            copy_nonoverlapping(bytes.as_ptr().add(first), base, len - first);
        }

        // Publish the bytes. This also publishes the full condition, if any.
        self.write
            .store(advance(write, len, self.capacity), Ordering::Release);
        Ok(())
    }

    /// Consumer side of [ByteFifo::get].
    ///
    /// # Safety
    ///
    /// The caller must be the only consumer of this FIFO for the duration of the call.
    pub(crate) unsafe fn consume(&self, dst: &mut [u8]) -> FifoResult<usize> {
        if dst.is_empty() {
            return Ok(0);
        }

        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        let used = self.capacity - free_space(self.capacity, write, read);
        if used == 0 {
            return Err(FifoError::Empty);
        }

        let len = dst.len().min(used);
        let start = slot(read);
        let first = len.min(self.capacity - start);
        let base = self.storage.as_ptr();
        // SAFETY:
        // Both copies stay within the buffer, see `produce`.
        // The source slots are occupied and have been published by the producer.
        // The producer does not touch occupied slots and we are the only consumer.
        unsafe {
            copy_nonoverlapping(base.add(start), dst.as_mut_ptr(), first);
            copy_nonoverlapping(base, dst.as_mut_ptr().add(first), len - first);
        }

        // Hand the slots back to the producer.
        // A non-zero read always clears the full condition.
        self.read
            .store(advance(read, len, self.capacity), Ordering::Release);
        Ok(len)
    }
}


// vim: ts=4 sw=4 expandtab
