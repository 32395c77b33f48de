// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2025 - 2026 Michael Büsch <m@bues.ch>

//! Exclusive test-and-set lock.
//!
//! The lock is a single byte that is either [UNLOCKED] or [LOCKED].
//! It records no owner. Any party may unlock it, whoever locked it.
//! Use [ExclusiveLock::acquire] to get a [LockGuard] if you want
//! the lock to be tied to the holder.

#[cfg(feature = "critical-section")]
use core::cell::Cell;
use core::{
    hint::spin_loop,
    sync::atomic::{AtomicU8, Ordering},
};
#[cfg(feature = "critical-section")]
use core::sync::atomic::{Ordering::SeqCst, fence};

/// Lock byte value of a free lock.
pub const UNLOCKED: u8 = 0;

/// Lock byte value of a held lock.
pub const LOCKED: u8 = 1;

/// A byte with exclusive read-modify-write access.
///
/// This is the only capability the lock needs from the platform.
/// It maps to a load-exclusive/store-exclusive pair
/// or to a compare-and-swap instruction.
///
/// # Safety
///
/// [LockByte::compare_and_swap] must be atomic with respect to every other access
/// to the same byte, from any execution context.
/// A successful swap must be ordered before all memory accesses that follow it (acquire).
///
/// [LockByte::release] must order all preceding memory accesses before the store (release).
pub unsafe trait LockByte {
    /// Exclusively load the byte and, if it equals `current`, store `new`.
    ///
    /// Returns `Ok(current)` if `new` has been stored.
    /// Returns `Err(observed)` if the loaded value was not `current`
    /// or if another agent wrote the byte between the load and the store.
    fn compare_and_swap(&self, current: u8, new: u8) -> Result<u8, u8>;

    /// Load the byte without any ordering guarantees.
    fn peek(&self) -> u8;

    /// Store `value` after all preceding memory accesses.
    fn release(&self, value: u8);
}

#[cfg(target_has_atomic = "8")]
// SAFETY:
// `compare_exchange` is a single atomic read-modify-write.
// On LL/SC machines it compiles to a load-exclusive/store-exclusive loop
// that only retries spurious reservation losses, never a changed value.
// Success uses Acquire and `release` uses a Release store.
unsafe impl LockByte for AtomicU8 {
    #[inline(always)]
    fn compare_and_swap(&self, current: u8, new: u8) -> Result<u8, u8> {
        self.compare_exchange(current, new, Ordering::Acquire, Ordering::Relaxed)
    }

    #[inline(always)]
    fn peek(&self) -> u8 {
        self.load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn release(&self, value: u8) {
        self.store(value, Ordering::Release);
    }
}

/// Lock byte for cores without byte compare-and-swap (Cortex-M0, AVR).
///
/// Every access runs inside a `critical_section::with` block.
#[cfg(feature = "critical-section")]
pub struct CsByte(critical_section::Mutex<Cell<u8>>);

#[cfg(feature = "critical-section")]
impl CsByte {
    /// Create a new lock byte with the given initial value.
    #[inline(always)]
    pub const fn new(value: u8) -> Self {
        Self(critical_section::Mutex::new(Cell::new(value)))
    }
}

#[cfg(feature = "critical-section")]
// SAFETY:
// The critical section excludes every other context for the duration
// of the load and the conditional store, so the swap is atomic.
// The fences keep the protected accesses from moving across the
// lock transitions.
unsafe impl LockByte for CsByte {
    #[inline(always)]
    fn compare_and_swap(&self, current: u8, new: u8) -> Result<u8, u8> {
        let ret = critical_section::with(|cs| {
            let byte = self.0.borrow(cs);
            let observed = byte.get();
            if observed != current {
                return Err(observed);
            }
            byte.set(new);
            Ok(observed)
        });
        if ret.is_ok() {
            fence(SeqCst);
        }
        ret
    }

    #[inline(always)]
    fn peek(&self) -> u8 {
        critical_section::with(|cs| self.0.borrow(cs).get())
    }

    #[inline(always)]
    fn release(&self, value: u8) {
        fence(SeqCst);
        critical_section::with(|cs| self.0.borrow(cs).set(value));
    }
}

/// Exclusive lock over a single [LockByte].
///
/// The lock protects nothing by itself.
/// It is up to the caller to only touch the shared resource while holding it.
/// See [LockedCell](crate::LockedCell) for a lock that owns its data.
pub struct ExclusiveLock<B = AtomicU8> {
    byte: B,
}

#[cfg(target_has_atomic = "8")]
impl ExclusiveLock<AtomicU8> {
    /// Create a new unlocked lock.
    #[inline(always)]
    pub const fn new() -> Self {
        Self::from_byte(AtomicU8::new(UNLOCKED))
    }
}

#[cfg(target_has_atomic = "8")]
impl Default for ExclusiveLock<AtomicU8> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "critical-section")]
impl ExclusiveLock<CsByte> {
    /// Create a new unlocked lock that uses critical sections
    /// instead of atomic instructions.
    #[inline(always)]
    pub const fn new_cs() -> Self {
        Self::from_byte(CsByte::new(UNLOCKED))
    }
}

impl<B> ExclusiveLock<B> {
    /// Build a lock on top of an existing lock byte.
    ///
    /// The byte should hold [UNLOCKED].
    #[inline(always)]
    pub const fn from_byte(byte: B) -> Self {
        Self { byte }
    }
}

impl<B: LockByte> ExclusiveLock<B> {
    /// Try to acquire the lock once. Never blocks.
    ///
    /// Returns `true` if the lock has been acquired.
    /// Returns `false` if it is held by someone else
    /// or if the exclusive store lost a race against another agent.
    ///
    /// After a successful acquisition all following accesses
    /// of the caller are ordered after the acquisition.
    #[inline]
    #[must_use]
    pub fn try_lock(&self) -> bool {
        self.byte.compare_and_swap(UNLOCKED, LOCKED).is_ok()
    }

    /// Busy-wait until the lock is acquired.
    ///
    /// There is no backoff and no timeout.
    /// Never spin in a context that the lock holder cannot preempt,
    /// e.g. in an interrupt handler waiting for a lock held by `main()`.
    #[inline]
    pub fn spin_lock(&self) {
        while !self.try_lock() {
            spin_loop();
        }
    }

    /// Spin for at most `attempts` calls to [Self::try_lock].
    ///
    /// Returns `true` if the lock has been acquired.
    #[inline]
    #[must_use]
    pub fn try_lock_for(&self, attempts: usize) -> bool {
        for _ in 0..attempts {
            if self.try_lock() {
                return true;
            }
            spin_loop();
        }
        false
    }

    /// Release the lock.
    ///
    /// All preceding writes of the caller become visible before the release.
    /// This does not check who holds the lock, or whether it is held at all.
    #[inline]
    pub fn unlock(&self) {
        self.byte.release(UNLOCKED);
    }

    /// Returns `true` if the lock is currently held by anyone.
    ///
    /// The answer may be outdated as soon as it is returned.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.byte.peek() != UNLOCKED
    }

    /// Try to acquire the lock once and return a guard that releases it.
    #[inline]
    pub fn try_acquire(&self) -> Option<LockGuard<'_, B>> {
        self.try_lock().then(|| LockGuard { lock: self })
    }

    /// Spin until the lock is acquired and return a guard that releases it.
    #[inline]
    pub fn acquire(&self) -> LockGuard<'_, B> {
        self.spin_lock();
        LockGuard { lock: self }
    }
}

/// Proof of holding an [ExclusiveLock].
///
/// The lock is released when the guard is dropped.
/// Calling [ExclusiveLock::unlock] directly while a guard is alive
/// bypasses the guard. The guard then releases the lock again on drop.
#[must_use = "the lock is released immediately if the guard is not used"]
pub struct LockGuard<'a, B: LockByte> {
    lock: &'a ExclusiveLock<B>,
}

impl<B: LockByte> LockGuard<'_, B> {
    /// Release the lock now.
    #[inline]
    pub fn release(self) {
        drop(self);
    }
}

impl<B: LockByte> Drop for LockGuard<'_, B> {
    #[inline]
    fn drop(&mut self) {
        self.lock.unlock();
    }
}


// vim: ts=4 sw=4 expandtab
