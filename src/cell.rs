// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2025 - 2026 Michael Büsch <m@bues.ch>

//! Lock protected cell.

#[cfg(feature = "critical-section")]
use crate::lock::CsByte;
use crate::lock::{ExclusiveLock, LockByte};
use core::{cell::UnsafeCell, sync::atomic::AtomicU8};

/// A cell that can only be accessed while holding its [ExclusiveLock].
///
/// This is the way to share one side of a [ByteFifo](crate::ByteFifo)
/// between several producers or several consumers.
///
/// The lock is not reentrant.
/// Calling [LockedCell::with] from within the closure
/// of the same cell spins forever.
pub struct LockedCell<T, B = AtomicU8> {
    lock: ExclusiveLock<B>,
    inner: UnsafeCell<T>,
}

#[cfg(target_has_atomic = "8")]
impl<T> LockedCell<T, AtomicU8> {
    /// Create a new unlocked `LockedCell`.
    #[inline(always)]
    pub const fn new(inner: T) -> Self {
        Self::from_lock(ExclusiveLock::new(), inner)
    }
}

#[cfg(feature = "critical-section")]
impl<T> LockedCell<T, CsByte> {
    /// Create a new unlocked `LockedCell` that locks with critical sections.
    #[inline(always)]
    pub const fn new_cs(inner: T) -> Self {
        Self::from_lock(ExclusiveLock::new_cs(), inner)
    }
}

impl<T, B> LockedCell<T, B> {
    /// Create a new `LockedCell` protected by `lock`.
    ///
    /// The lock should be unlocked.
    #[inline(always)]
    pub const fn from_lock(lock: ExclusiveLock<B>, inner: T) -> Self {
        Self {
            lock,
            inner: UnsafeCell::new(inner),
        }
    }

    /// Get a mutable reference to the inner data.
    ///
    /// No locking is needed, because `&mut self` guarantees exclusive access.
    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Consume the cell and return the inner data.
    #[inline(always)]
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T, B: LockByte> LockedCell<T, B> {
    /// Spin until the lock is acquired, then run `f` on the inner data.
    ///
    /// The lock is released after `f` returns or unwinds.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let _guard = self.lock.acquire();
        // SAFETY:
        // We hold the lock until `_guard` is dropped.
        // The lock is private to this cell, so nobody else can release it.
        // Therefore, this is the only reference to the inner data.
        f(unsafe { &mut *self.inner.get() })
    }

    /// Try to acquire the lock once and run `f` on the inner data.
    ///
    /// Returns `None` without calling `f` if the lock is held.
    #[inline]
    pub fn try_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let _guard = self.lock.try_acquire()?;
        // SAFETY: See `with`.
        Some(f(unsafe { &mut *self.inner.get() }))
    }

    /// Returns `true` if somebody is inside [Self::with] right now.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }
}

// SAFETY: Access to `T` is serialized by the lock.
// `T` is moved between contexts, therefore it must be Send.
unsafe impl<T: Send, B: LockByte + Sync> Sync for LockedCell<T, B> {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_locked_cell() {
        let cell = LockedCell::new(41_u32);
        assert!(!cell.is_locked());

        let v = cell.with(|v| {
            *v += 1;
            *v
        });
        assert_eq!(v, 42);
        assert!(!cell.is_locked());

        let inner = cell.with(|_| cell.try_with(|v| *v));
        assert_eq!(inner, None);

        assert_eq!(cell.try_with(|v| *v), Some(42));
    }

    #[test]
    fn test_get_mut() {
        let mut cell = LockedCell::new([1_u8, 2, 3]);
        cell.get_mut()[1] = 5;
        assert_eq!(cell.into_inner(), [1, 5, 3]);
    }

    #[cfg(feature = "critical-section")]
    #[test]
    fn test_cs_cell() {
        let cell = LockedCell::new_cs(0_u16);
        cell.with(|v| *v = 7);
        assert_eq!(cell.with(|_| cell.try_with(|v| *v)), None);
        assert_eq!(cell.try_with(|v| *v), Some(7));
    }
}

// vim: ts=4 sw=4 expandtab
