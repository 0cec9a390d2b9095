//! Engine tuning knobs.
//!
//! A configuration is fixed when the [`Context`](crate::Context) is built
//! and shared by every polynomial created under it.

/// Which GCD algorithm the dispatcher starts with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum GcdStrategy {
    /// Pick by input shape: dense for small dense inputs, Zippel for wide
    /// sparse support, Brown otherwise.
    #[default]
    Auto,
    /// Dense recursive pseudo-remainder GCD.
    Dense,
    /// Brown's modular evaluation/interpolation.
    Brown,
    /// Zippel's sparse interpolation.
    Zippel,
}

/// Configuration for the GCD dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GcdConfig {
    /// Starting strategy.
    pub strategy: GcdStrategy,
    /// Bad reductions tolerated per strategy before falling back.
    pub max_retries: usize,
    /// Use the dense strategy when the dense array size is at most
    /// `dense_ratio` times the larger term count.
    pub dense_ratio: usize,
    /// Hard cap on the dense array size.
    pub dense_limit: usize,
    /// Evaluation points computed per parallel batch.
    pub batch_size: usize,
    /// Seed for random evaluation points.
    pub seed: u64,
}

impl Default for GcdConfig {
    fn default() -> Self {
        Self {
            strategy: GcdStrategy::Auto,
            max_retries: 16,
            dense_ratio: 4,
            dense_limit: 1 << 16,
            batch_size: 4,
            seed: 0x7e55_e7a0,
        }
    }
}

/// Configuration shared by all operations under one context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker threads: `1` runs everything sequentially, `0` uses the
    /// global rayon pool, `n > 1` builds a dedicated pool of `n` threads.
    pub threads: usize,
    /// Minimum `len(A) * len(B)` before multiplication is split across
    /// workers. Also used for division probes and degree passes.
    pub parallel_threshold: usize,
    /// GCD dispatcher settings.
    pub gcd: GcdConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            parallel_threshold: 1 << 16,
            gcd: GcdConfig::default(),
        }
    }
}

impl EngineConfig {
    /// A configuration that never spawns work on other threads.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            threads: 1,
            ..Self::default()
        }
    }

    /// Sets the worker thread count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the parallel threshold.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Sets the GCD configuration.
    #[must_use]
    pub fn with_gcd(mut self, gcd: GcdConfig) -> Self {
        self.gcd = gcd;
        self
    }

    /// Returns true if operations may run on more than one thread.
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.threads != 1
    }
}

impl GcdConfig {
    /// Sets the starting strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: GcdStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
