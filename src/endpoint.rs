// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2025 - 2026 Michael Büsch <m@bues.ch>

//! Producer and consumer handles of a split [ByteFifo].

use crate::{ByteFifo, FifoResult};

/// Producer side of a [ByteFifo].
///
/// The possession of this handle guarantees
/// that nobody else can put bytes into the FIFO.
///
/// Obtained from [ByteFifo::split].
/// Typically moved into an interrupt handler that receives bytes.
/// If several contexts must produce, share the handle through a
/// [LockedCell](crate::LockedCell).
pub struct Producer<'f, 'buf> {
    fifo: &'f ByteFifo<'buf>,
}

/// Consumer side of a [ByteFifo].
///
/// The possession of this handle guarantees
/// that nobody else can get bytes from the FIFO.
///
/// Obtained from [ByteFifo::split].
pub struct Consumer<'f, 'buf> {
    fifo: &'f ByteFifo<'buf>,
}

impl<'f, 'buf> Producer<'f, 'buf> {
    /// # Safety
    ///
    /// There must be no other producer of `fifo` while the handle exists.
    #[inline(always)]
    pub(crate) unsafe fn new(fifo: &'f ByteFifo<'buf>) -> Self {
        Self { fifo }
    }

    /// Put all of `bytes` into the FIFO, or nothing.
    ///
    /// See [ByteFifo::put].
    #[inline]
    pub fn put(&mut self, bytes: &[u8]) -> FifoResult<()> {
        // SAFETY: We are the only producer. See `new`.
        unsafe { self.fifo.produce(bytes) }
    }

    /// Put a single byte into the FIFO.
    #[inline]
    pub fn put_byte(&mut self, byte: u8) -> FifoResult<()> {
        self.put(core::slice::from_ref(&byte))
    }

    /// Number of free bytes.
    ///
    /// The consumer may free more bytes at any time,
    /// so this is a lower bound.
    #[inline]
    pub fn free_space(&self) -> usize {
        self.fifo.free_space()
    }

    /// Total number of bytes the FIFO can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.fifo.capacity()
    }
}

impl<'f, 'buf> Consumer<'f, 'buf> {
    /// # Safety
    ///
    /// There must be no other consumer of `fifo` while the handle exists.
    #[inline(always)]
    pub(crate) unsafe fn new(fifo: &'f ByteFifo<'buf>) -> Self {
        Self { fifo }
    }

    /// Get up to `dst.len()` bytes from the FIFO.
    ///
    /// See [ByteFifo::get].
    #[inline]
    pub fn get(&mut self, dst: &mut [u8]) -> FifoResult<usize> {
        // SAFETY: We are the only consumer. See `new`.
        unsafe { self.fifo.consume(dst) }
    }

    /// Get a single byte from the FIFO.
    #[inline]
    pub fn get_byte(&mut self) -> FifoResult<u8> {
        let mut byte = 0;
        self.get(core::slice::from_mut(&mut byte))?;
        Ok(byte)
    }

    /// Number of stored, unread bytes.
    ///
    /// The producer may add more bytes at any time,
    /// so this is a lower bound.
    #[inline]
    pub fn len(&self) -> usize {
        self.fifo.len()
    }

    /// Returns `true` if no bytes are stored right now.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fifo.is_empty()
    }

    /// Total number of bytes the FIFO can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.fifo.capacity()
    }
}


// vim: ts=4 sw=4 expandtab
