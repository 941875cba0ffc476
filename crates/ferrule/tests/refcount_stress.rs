//! Integration test: shared-handle reference counting under concurrency.
//!
//! Many threads clone, hand off, take, and release handles aliasing one
//! buffer. The count must equal the number of live handles once the
//! threads settle, and the elements must be dropped exactly once, after
//! the last handle goes.

use std::thread;

use crossbeam_channel::bounded;
use ferrule::prelude::*;
use ferrule_test_utils::fixtures::{churn, fan_out, tracked_shared};
use ferrule_test_utils::{Probe, StressConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[test]
fn concurrent_copies_are_all_counted() {
    for threads in [1, 2, 4, 8] {
        let config = StressConfig::new()
            .with_threads(threads)
            .with_copies_per_thread(250)
            .with_buffer_len(32);
        let source: SharedHandle<u64> = SharedHandle::with_len(config.buffer_len);

        let mut copies = fan_out(&source, &config);
        assert_eq!(source.use_count(), config.total_copies() + 1);

        // Free the copies from as many threads as cloned them.
        let chunk = copies.len().div_ceil(threads);
        thread::scope(|s| {
            while !copies.is_empty() {
                let batch: Vec<_> = copies.drain(..chunk.min(copies.len())).collect();
                s.spawn(move || drop(batch));
            }
        });
        assert_eq!(source.use_count(), 1);
    }
}

#[test]
fn symmetric_destruction_drops_each_element_once() {
    let probe = Probe::new();
    let source = tracked_shared(&probe, 5);

    let config = StressConfig::new()
        .with_threads(8)
        .with_copies_per_thread(1);
    let copies = fan_out(&source, &config);
    assert_eq!(copies.len(), 8);
    assert_eq!(source.use_count(), 9);

    // Release the copies concurrently; the original keeps the buffer alive.
    thread::scope(|s| {
        for c in copies {
            s.spawn(move || drop(c));
        }
    });
    assert_eq!(probe.drops(), 0);

    drop(source);
    assert_eq!(probe.drops(), 5);
    assert_eq!(probe.clones(), 0);
}

#[test]
fn last_release_may_happen_on_any_thread() {
    let probe = Probe::new();
    let source = tracked_shared(&probe, 5);
    let copies: Vec<_> = (0..8).map(|_| source.clone()).collect();

    // All nine handles, including the original, race to be released.
    thread::scope(|s| {
        s.spawn(move || drop(source));
        for c in copies {
            s.spawn(move || drop(c));
        }
    });
    assert_eq!(probe.drops(), 5);
}

#[test]
fn handles_survive_channel_hand_off() {
    let probe = Probe::new();
    let source = tracked_shared(&probe, 3);
    let (tx, rx) = bounded::<SharedHandle<_>>(16);

    thread::scope(|s| {
        // Producers clone and send.
        for _ in 0..4 {
            let tx = tx.clone();
            let source = &source;
            s.spawn(move || {
                for _ in 0..100 {
                    tx.send(source.clone()).unwrap();
                }
            });
        }
        drop(tx);

        // Consumers take the handle apart and release it.
        for _ in 0..4 {
            let rx = rx.clone();
            s.spawn(move || {
                for mut handle in rx.iter() {
                    assert_eq!(handle.len(), 3);
                    let moved = handle.take();
                    assert!(!handle.is_valid());
                    assert!(moved.use_count() >= 2);
                }
            });
        }
    });

    assert_eq!(source.use_count(), 1);
    assert_eq!(probe.drops(), 0);
    drop(source);
    assert_eq!(probe.drops(), 3);
}

#[test]
fn seeded_churn_balances_counts_and_drops() {
    let probe = Probe::new();
    let source = tracked_shared(&probe, 16);
    let config = StressConfig::new()
        .with_threads(8)
        .with_copies_per_thread(2_000)
        .with_seed(0xC0FFEE);

    let report = churn(&source, &config);
    assert_eq!(report.total(), config.total_copies());
    assert!(report.clones > 0 && report.releases > 0);
    assert!(report.takes > 0 && report.reassigns > 0);

    assert_eq!(source.use_count(), 1);
    assert_eq!(probe.live(), 16);
    drop(source);
    assert_eq!(probe.live(), 0);
}

#[test]
fn reassignment_across_buffers_under_contention() {
    // Each thread repeatedly points its handle at one of two shared
    // buffers. Neither buffer may be released while the originals live.
    let probe = Probe::new();
    let a = tracked_shared(&probe, 4);
    let b = tracked_shared(&probe, 4);

    thread::scope(|s| {
        for worker in 0..8u64 {
            let (a, b) = (&a, &b);
            s.spawn(move || {
                let mut rng = ChaCha8Rng::seed_from_u64(worker);
                let mut mine = a.clone();
                for _ in 0..1_000 {
                    let target = if rng.random_bool(0.5) { a } else { b };
                    mine.clone_from(target);
                    assert!(mine.ptr_eq(target));
                }
            });
        }
    });

    assert_eq!(a.use_count(), 1);
    assert_eq!(b.use_count(), 1);
    assert_eq!(probe.drops(), 0);
    drop((a, b));
    assert_eq!(probe.drops(), 8);
}
