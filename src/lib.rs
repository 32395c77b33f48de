// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2025 - 2026 Michael Büsch <m@bues.ch>

#![cfg_attr(not(test), no_std)]

//! # irq-bfifo: Interrupt-safe bounded byte FIFO and exclusive lock
//!
//! This crate provides two small synchronization building blocks for
//! microcontrollers without an operating system:
//!
//! - [ByteFifo]: a bounded ring buffer of bytes on top of a buffer owned by the caller.
//!   One producer and one consumer can use it concurrently without any lock,
//!   e.g. a UART receive interrupt and the `main()` loop.
//! - [ExclusiveLock]: a single byte test-and-set spin lock.
//!   It serializes access whenever there is more than one producer
//!   or more than one consumer, or any other shared resource.
//!
//! Nothing in this crate allocates, blocks on a scheduler or uses hidden static state.
//! All objects are owned by the caller and passed around by reference.
//!
//! ## Example
//!
//! ```
//! use irq_bfifo::{ByteFifo, FifoError};
//!
//! let mut storage = [0_u8; 8];
//! let mut fifo = ByteFifo::new(&mut storage).unwrap();
//!
//! // Writes are all-or-nothing.
//! fifo.put(&[1, 2, 3]).unwrap();
//! assert_eq!(fifo.put(&[4, 5, 6, 7, 8, 9]), Err(FifoError::Full));
//!
//! // Reads return what is there, up to the length of the destination.
//! let mut buf = [0_u8; 10];
//! assert_eq!(fifo.get(&mut buf), Ok(3));
//! assert_eq!(&buf[..3], &[1, 2, 3]);
//! assert_eq!(fifo.get(&mut buf), Err(FifoError::Empty));
//! ```
//!
//! ## Producer and consumer in different contexts
//!
//! ```
//! use irq_bfifo::{ByteFifo, FifoError};
//!
//! let mut storage = [0_u8; 16];
//! let mut fifo = ByteFifo::new(&mut storage).unwrap();
//! let (mut tx, mut rx) = fifo.split();
//!
//! std::thread::scope(|s| {
//!     // Stands in for an interrupt handler.
//!     s.spawn(move || {
//!         for byte in 0..100_u8 {
//!             while tx.put_byte(byte) == Err(FifoError::Full) {
//!                 std::hint::spin_loop();
//!             }
//!         }
//!     });
//!
//!     // The main loop.
//!     let mut expected = 0_u8;
//!     while expected < 100 {
//!         if let Ok(byte) = rx.get_byte() {
//!             assert_eq!(byte, expected);
//!             expected += 1;
//!         }
//!     }
//! });
//! ```
//!
//! ## Several producers
//!
//! ```
//! use irq_bfifo::{ByteFifo, LockedCell};
//!
//! let mut storage = [0_u8; 4];
//! let mut fifo = ByteFifo::new(&mut storage).unwrap();
//! let (tx, mut rx) = fifo.split();
//! let tx = LockedCell::new(tx);
//!
//! tx.with(|tx| tx.put(&[1, 2])).unwrap();
//! tx.with(|tx| tx.put(&[3, 4])).unwrap();
//!
//! let mut buf = [0_u8; 4];
//! assert_eq!(rx.get(&mut buf), Ok(4));
//! assert_eq!(buf, [1, 2, 3, 4]);
//! ```
//!
//! ## Features
//!
//! - `critical-section`: [CsByte] lock bytes for cores without byte compare-and-swap.
//! - `defmt`: `defmt::Format` for [FifoError] and trace events on FIFO (re)initialization.

pub mod cell;
pub mod endpoint;
pub mod error;
pub mod fifo;
pub mod lock;

#[cfg(feature = "critical-section")]
pub use crate::lock::CsByte;
pub use crate::{
    cell::LockedCell,
    endpoint::{Consumer, Producer},
    error::{FifoError, FifoResult},
    fifo::ByteFifo,
    lock::{ExclusiveLock, LOCKED, LockByte, LockGuard, UNLOCKED},
};

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_example_scenario() {
        let mut storage = [0_u8; 8];
        let mut fifo = ByteFifo::new(&mut storage).unwrap();
        let (mut tx, mut rx) = fifo.split();

        tx.put(&[1, 2, 3]).unwrap();
        assert_eq!(tx.put(&[4, 5, 6, 7, 8, 9]), Err(FifoError::Full));
        assert_eq!(tx.free_space(), 5);

        let mut buf = [0_u8; 10];
        assert_eq!(rx.get(&mut buf), Ok(3));
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(rx.get(&mut buf), Err(FifoError::Empty));
    }

    #[test]
    fn test_lock_protects_fifo() {
        let mut storage = [0_u8; 4];
        let mut fifo = ByteFifo::new(&mut storage).unwrap();
        let lock = ExclusiveLock::new();

        assert!(lock.try_lock());
        fifo.put(&[1, 2]).unwrap();
        lock.unlock();

        let g = lock.acquire();
        assert_eq!(fifo.get_byte(), Ok(1));
        drop(g);

        assert!(lock.try_lock());
        assert_eq!(fifo.get_byte(), Ok(2));
        lock.unlock();
    }
}

// vim: ts=4 sw=4 expandtab
