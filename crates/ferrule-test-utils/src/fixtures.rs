//! Reusable multi-threaded drivers and buffer builders.
//!
//! - [`fan_out`] clones one [`SharedHandle`] from many threads at once and
//!   hands every copy back over a channel.
//! - [`churn`] runs a seeded random mix of clone, release, take, and
//!   reassign operations against handles aliasing one buffer.
//! - [`tracked_shared`] / [`tracked_exclusive`] build buffers of
//!   [`Tracked`] elements reporting to a [`Probe`].

use std::thread;

use ferrule_alloc::{allocate_with, RawBuffer};
use ferrule_core::BufferHandle;
use ferrule_handle::{ExclusiveHandle, SharedHandle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::StressConfig;
use crate::{Probe, Tracked};

/// A raw buffer of `len` tracked elements with values `0..len`.
pub fn tracked_buffer(probe: &Probe, len: usize) -> RawBuffer<Tracked> {
    allocate_with(len, |i| probe.tracked(i as u64))
}

/// A shared buffer of `len` tracked elements with values `0..len`.
pub fn tracked_shared(probe: &Probe, len: usize) -> SharedHandle<Tracked> {
    SharedHandle::from_raw_buffer(tracked_buffer(probe, len))
}

/// An exclusive buffer of `len` tracked elements with values `0..len`.
pub fn tracked_exclusive(probe: &Probe, len: usize) -> ExclusiveHandle<Tracked> {
    ExclusiveHandle::from_raw_buffer(tracked_buffer(probe, len))
}

/// Clone `source` `config.copies_per_thread` times on each of
/// `config.threads` threads concurrently.
///
/// Copies travel back to the caller over a channel; none are dropped
/// before this returns.
pub fn fan_out<T>(source: &SharedHandle<T>, config: &StressConfig) -> Vec<SharedHandle<T>>
where
    T: Send + Sync,
{
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::scope(|s| {
        for _ in 0..config.threads {
            let tx = tx.clone();
            s.spawn(move || {
                for _ in 0..config.copies_per_thread {
                    tx.send(source.clone())
                        .expect("receiver outlives every worker");
                }
            });
        }
    });
    drop(tx);
    rx.into_iter().collect()
}

/// Operation tallies from a [`churn`] run, summed over all workers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChurnReport {
    pub clones: usize,
    pub releases: usize,
    pub takes: usize,
    pub reassigns: usize,
}

impl ChurnReport {
    /// Total operations performed.
    pub fn total(&self) -> usize {
        self.clones + self.releases + self.takes + self.reassigns
    }

    fn merge(&mut self, other: &Self) {
        self.clones += other.clones;
        self.releases += other.releases;
        self.takes += other.takes;
        self.reassigns += other.reassigns;
    }
}

/// Run `config.copies_per_thread` random operations on each of
/// `config.threads` workers.
///
/// Each worker holds a private pool of handles, some aliasing `source`
/// and some aliasing a private deep copy of it, and mixes:
///
/// - clone a pooled handle,
/// - release (drop) a pooled handle,
/// - `take` a pooled handle and put the moved handle back,
/// - `clone_from` one pooled handle into another.
///
/// Every handle created by a worker is released before it exits, so once
/// this returns `source.use_count()` is back where it started.
pub fn churn<T>(source: &SharedHandle<T>, config: &StressConfig) -> ChurnReport
where
    T: Clone + Send + Sync,
{
    let mut report = ChurnReport::default();
    thread::scope(|s| {
        let workers: Vec<_> = (0..config.threads)
            .map(|worker| {
                s.spawn(move || {
                    let mut rng = ChaCha8Rng::seed_from_u64(config.seed ^ worker as u64);
                    churn_worker(source, config.copies_per_thread, &mut rng)
                })
            })
            .collect();
        for w in workers {
            report.merge(&w.join().expect("churn worker panicked"));
        }
    });
    report
}

fn churn_worker<T: Clone>(
    source: &SharedHandle<T>,
    ops: usize,
    rng: &mut ChaCha8Rng,
) -> ChurnReport {
    let mut report = ChurnReport::default();
    let private = SharedHandle::from_handle(source);
    let mut pool = vec![source.clone(), private.clone()];
    drop(private);

    for _ in 0..ops {
        if pool.is_empty() {
            pool.push(source.clone());
            report.clones += 1;
            continue;
        }
        let i = rng.random_range(0..pool.len());
        match rng.random_range(0..4) {
            0 => {
                let copy = pool[i].clone();
                pool.push(copy);
                report.clones += 1;
            }
            1 => {
                drop(pool.swap_remove(i));
                report.releases += 1;
            }
            2 => {
                let moved = pool[i].take();
                debug_assert!(!pool[i].is_valid());
                pool[i] = moved;
                report.takes += 1;
            }
            _ => {
                let j = rng.random_range(0..pool.len());
                let other = pool[j].clone();
                pool[i].clone_from(&other);
                report.reassigns += 1;
            }
        }
    }
    report
}
