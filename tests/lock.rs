// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (C) 2025 - 2026 Michael Büsch <m@bues.ch>

use irq_bfifo::{ExclusiveLock, LockedCell};
use std::{
    panic,
    sync::{
        Barrier,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

const THREADS: usize = 8;
const ITERS: usize = 5_000;

#[test]
fn contended_spin_lock_is_exclusive() {
    let lock = ExclusiveLock::new();
    let in_cs = AtomicUsize::new(0);
    let counter = AtomicUsize::new(0);
    let start = Barrier::new(THREADS);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                start.wait();
                for _ in 0..ITERS {
                    lock.spin_lock();
                    let prev = in_cs.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(prev, 0, "mutual exclusion violated");
                    // Non-atomic read-modify-write, only correct under the lock.
                    let v = counter.load(Ordering::Relaxed);
                    counter.store(v + 1, Ordering::Relaxed);
                    in_cs.fetch_sub(1, Ordering::SeqCst);
                    lock.unlock();
                }
            });
        }
    });

    assert_eq!(counter.load(Ordering::SeqCst), THREADS * ITERS);
    assert!(!lock.is_locked());
}

#[test]
fn try_lock_has_a_single_winner() {
    for _ in 0..200 {
        let lock = ExclusiveLock::new();
        let winners = AtomicUsize::new(0);
        let start = Barrier::new(THREADS);

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    start.wait();
                    if lock.try_lock() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert!(lock.is_locked());
        lock.unlock();
        assert!(lock.try_lock());
    }
}

#[test]
fn locked_cell_increments_are_exact() {
    let cell = LockedCell::new(0_usize);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ITERS {
                    cell.with(|v| *v += 1);
                    thread::yield_now();
                }
            });
        }
    });

    assert_eq!(cell.into_inner(), THREADS * ITERS);
}

#[test]
fn lock_is_released_on_panic() {
    let cell = LockedCell::new(0_u32);

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        cell.with(|v| {
            *v = 123;
            panic!("boom");
        });
    }));
    assert!(res.is_err(), "expected panic");

    assert!(!cell.is_locked());
    assert_eq!(cell.with(|v| *v), 123);
}

#[cfg(feature = "critical-section")]
#[test]
fn critical_section_lock_is_exclusive() {
    let cell = LockedCell::new_cs(0_usize);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..1_000 {
                    cell.with(|v| *v += 1);
                }
            });
        }
    });

    assert_eq!(cell.into_inner(), 4_000);
}

// vim: ts=4 sw=4 expandtab
