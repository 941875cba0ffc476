//! Test utilities and instrumented element types for Ferrule development.
//!
//! Provides a [`Probe`] / [`Tracked`] pair for observing how many times
//! elements are constructed, cloned, and dropped, generic assertions
//! written only against [`BufferHandle`], and (in [`fixtures`]) the
//! multi-threaded fan-out and churn drivers used by the stress tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ferrule_core::BufferHandle;

pub use config::StressConfig;

#[derive(Debug, Default)]
struct ProbeCounts {
    created: AtomicUsize,
    clones: AtomicUsize,
    drops: AtomicUsize,
}

/// Shared counters observed by every [`Tracked`] element it creates.
///
/// Cloning a `Probe` shares the same counters, so a probe can be handed
/// to worker threads and inspected from the test afterwards.
#[derive(Clone, Debug, Default)]
pub struct Probe {
    counts: Arc<ProbeCounts>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an element reporting to this probe.
    pub fn tracked(&self, value: u64) -> Tracked {
        self.counts.created.fetch_add(1, Ordering::Relaxed);
        Tracked {
            value,
            copied: false,
            probe: Some(self.clone()),
        }
    }

    /// Elements created through [`Probe::tracked`].
    pub fn created(&self) -> usize {
        self.counts.created.load(Ordering::Acquire)
    }

    /// Clones made of tracked elements.
    pub fn clones(&self) -> usize {
        self.counts.clones.load(Ordering::Acquire)
    }

    /// Tracked elements dropped so far.
    pub fn drops(&self) -> usize {
        self.counts.drops.load(Ordering::Acquire)
    }

    /// Tracked elements currently alive.
    pub fn live(&self) -> usize {
        self.created() + self.clones() - self.drops()
    }
}

/// An element that reports clones and drops to its [`Probe`].
///
/// A clone is flagged with [`was_copied`](Tracked::was_copied); the
/// original is not. Moving an element (including moving the buffer it
/// lives in) changes neither the flag nor the counters.
///
/// `Tracked::default()` has no probe and is the moved-from state left
/// behind by `ferrule_alloc::move_elements`.
#[derive(Debug, Default)]
pub struct Tracked {
    pub value: u64,
    copied: bool,
    probe: Option<Probe>,
}

impl Tracked {
    /// Whether this element was produced by `clone`.
    pub fn was_copied(&self) -> bool {
        self.copied
    }

    /// Whether this element reports to a probe (false once moved from).
    pub fn is_tracked(&self) -> bool {
        self.probe.is_some()
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        if let Some(probe) = &self.probe {
            probe.counts.clones.fetch_add(1, Ordering::Relaxed);
        }
        Self {
            value: self.value,
            copied: true,
            probe: self.probe.clone(),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        if let Some(probe) = &self.probe {
            probe.counts.drops.fetch_add(1, Ordering::Release);
        }
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// Assert that `handle` is unallocated, checking every accessor.
pub fn assert_unallocated<H: BufferHandle>(handle: &H) {
    assert!(!handle.is_valid(), "handle should be unallocated");
    assert_eq!(handle.len(), 0);
    assert_eq!(handle.size_bytes(), 0);
    assert!(handle.as_ptr().is_null());
    assert!(handle.first().is_err());
}

/// Assert that two handles, of any kinds, hold equal elements.
pub fn assert_same_contents<A, B>(a: &A, b: &B)
where
    A: BufferHandle,
    B: BufferHandle<Elem = A::Elem>,
    A::Elem: PartialEq + std::fmt::Debug,
{
    assert_eq!(a.len(), b.len());
    assert_eq!(a.as_slice(), b.as_slice());
}
