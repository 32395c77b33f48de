// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2025 - 2026 Michael Büsch <m@bues.ch>

//! FIFO error kinds.

/// Result type of all fallible FIFO operations.
pub type FifoResult<T> = Result<T, FifoError>;

/// Errors returned by [ByteFifo](crate::ByteFifo) operations.
///
/// The FIFO never retries and never logs. All errors go straight
/// back to the immediate caller.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoError {
    /// The backing buffer has a length of zero.
    #[error("invalid argument: the FIFO buffer must not be empty")]
    InvalidArgument,
    /// The item is longer than the FIFO capacity and can never fit.
    #[error("item length exceeds the FIFO capacity")]
    OutOfRange,
    /// Not enough free space for the item right now.
    #[error("not enough free space in the FIFO")]
    Full,
    /// No bytes available.
    #[error("the FIFO is empty")]
    Empty,
}

impl FifoError {
    /// Returns `true` if the same call may succeed later
    /// after the other side made progress.
    ///
    /// [FifoError::Full] and [FifoError::Empty] are backpressure.
    /// The other kinds are caller programming errors.
    #[inline]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Full | Self::Empty)
    }
}


// vim: ts=4 sw=4 expandtab
