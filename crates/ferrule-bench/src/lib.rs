//! Benchmark profiles for the Ferrule buffer library.
//!
//! Provides pre-built [`StressConfig`] profiles shared by the benchmarks:
//!
//! - [`reference_profile`]: 4 threads × 1K copies of a 1K-element buffer
//! - [`contended_profile`]: one worker per available core, 10K copies each
//! - [`BUFFER_SIZES`]: element counts swept by the single-threaded benches

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ferrule_test_utils::StressConfig;

/// Element counts swept by the allocation and copy benchmarks.
///
/// Spans the single-element case, a cache-resident buffer, and one that
/// spills out of L2.
pub const BUFFER_SIZES: [usize; 4] = [1, 64, 4_096, 262_144];

/// Build the reference profile: 4 threads, 1K copies each, 1K elements.
pub fn reference_profile(seed: u64) -> StressConfig {
    StressConfig::new()
        .with_threads(4)
        .with_copies_per_thread(1_000)
        .with_buffer_len(1_024)
        .with_seed(seed)
}

/// Build a contention profile: one worker per available core.
///
/// Falls back to [`StressConfig::DEFAULT_THREADS`] when the core count
/// cannot be queried.
pub fn contended_profile(seed: u64) -> StressConfig {
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(StressConfig::DEFAULT_THREADS);
    StressConfig::new()
        .with_threads(threads)
        .with_copies_per_thread(10_000)
        .with_buffer_len(64)
        .with_seed(seed)
}
