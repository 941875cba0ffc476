//! Stress-run configuration.

/// Shape of a concurrent fan-out or churn run.
///
/// Shared by the stress tests and the benchmarks so both exercise the
/// same workloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StressConfig {
    /// Worker threads launched.
    pub threads: usize,
    /// Handle copies (or churn operations) performed by each worker.
    pub copies_per_thread: usize,
    /// Element count of the buffer under test.
    pub buffer_len: usize,
    /// Base seed for per-worker RNGs. Worker `i` uses `seed ^ i`.
    pub seed: u64,
}

impl StressConfig {
    /// Default worker count.
    pub const DEFAULT_THREADS: usize = 8;

    /// Default copies per worker.
    pub const DEFAULT_COPIES_PER_THREAD: usize = 1_000;

    /// Default buffer length.
    pub const DEFAULT_BUFFER_LEN: usize = 64;

    /// Default RNG seed.
    pub const DEFAULT_SEED: u64 = 0x5EED;

    pub fn new() -> Self {
        Self {
            threads: Self::DEFAULT_THREADS,
            copies_per_thread: Self::DEFAULT_COPIES_PER_THREAD,
            buffer_len: Self::DEFAULT_BUFFER_LEN,
            seed: Self::DEFAULT_SEED,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_copies_per_thread(mut self, copies: usize) -> Self {
        self.copies_per_thread = copies;
        self
    }

    pub fn with_buffer_len(mut self, len: usize) -> Self {
        self.buffer_len = len;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Copies produced across all workers.
    pub fn total_copies(&self) -> usize {
        self.threads * self.copies_per_thread
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self::new()
    }
}
