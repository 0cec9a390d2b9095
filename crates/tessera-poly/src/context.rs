//! Polynomial contexts.
//!
//! A context fixes the variable count, the monomial ordering, the
//! coefficient ring and the engine configuration. Polynomials hold an
//! `Arc` to their context; two polynomials can be combined only if their
//! contexts agree on the first three.

use std::fmt;
use std::sync::Arc;

use rayon::ThreadPool;
use tessera_rings::Ring;
use tracing::warn;

use crate::config::EngineConfig;
use crate::monomial::{ExpLayout, FIELD_WIDTHS};
use crate::ordering::MonomialOrder;

/// Shared description of a polynomial ring `R[x0, ..., x(n-1)]`.
pub struct Context<R: Ring> {
    nvars: usize,
    order: MonomialOrder,
    ring: R,
    layouts: [ExpLayout; 4],
    config: EngineConfig,
    pool: Option<Arc<ThreadPool>>,
}

impl<R: Ring> Context<R> {
    /// Creates a context with the default configuration.
    #[must_use]
    pub fn new(nvars: usize, order: MonomialOrder, ring: R) -> Arc<Self> {
        Self::with_config(nvars, order, ring, EngineConfig::default())
    }

    /// Creates a context with an explicit configuration.
    #[must_use]
    pub fn with_config(nvars: usize, order: MonomialOrder, ring: R, config: EngineConfig) -> Arc<Self> {
        let layouts = FIELD_WIDTHS.map(|bits| ExpLayout::new(nvars, order, bits));
        let pool = if config.threads > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(config.threads).build() {
                Ok(pool) => Some(Arc::new(pool)),
                Err(err) => {
                    warn!(%err, "falling back to the global thread pool");
                    None
                }
            }
        } else {
            None
        };
        Arc::new(Self {
            nvars,
            order,
            ring,
            layouts,
            config,
            pool,
        })
    }

    /// Number of variables.
    #[must_use]
    pub fn nvars(&self) -> usize {
        self.nvars
    }

    /// Monomial ordering.
    #[must_use]
    pub fn order(&self) -> MonomialOrder {
        self.order
    }

    /// Coefficient ring.
    #[must_use]
    pub fn ring(&self) -> &R {
        &self.ring
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The cached layout for a field width.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not one of [`FIELD_WIDTHS`].
    #[must_use]
    pub fn layout(&self, bits: u32) -> &ExpLayout {
        let idx = FIELD_WIDTHS
            .iter()
            .position(|&b| b == bits)
            .unwrap_or_else(|| panic!("unsupported field width {bits}"));
        &self.layouts[idx]
    }

    /// Returns true if polynomials of both contexts may be combined.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.nvars == other.nvars && self.order == other.order && self.ring == other.ring
    }

    /// The same ring and configuration with a different ordering.
    ///
    /// The new context shares this one's thread pool.
    #[must_use]
    pub fn with_order(&self, order: MonomialOrder) -> Arc<Self> {
        self.derive(order, self.ring.clone())
    }

    /// The same variables, ordering and thread pool over a different ring.
    #[must_use]
    pub fn with_ring<S: Ring>(&self, ring: S) -> Arc<Context<S>> {
        self.derive(self.order, ring)
    }

    fn derive<S: Ring>(&self, order: MonomialOrder, ring: S) -> Arc<Context<S>> {
        Arc::new(Context {
            nvars: self.nvars,
            order,
            ring,
            layouts: FIELD_WIDTHS.map(|bits| ExpLayout::new(self.nvars, order, bits)),
            config: self.config.clone(),
            pool: self.pool.clone(),
        })
    }

    /// Returns true if a job of `work` units should be split across threads.
    #[must_use]
    pub fn should_parallelize(&self, work: usize) -> bool {
        self.config.is_parallel() && work >= self.config.parallel_threshold
    }

    /// Runs `op` inside this context's thread pool.
    pub fn install<T, F>(&self, op: F) -> T
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl<R: Ring> fmt::Debug for Context<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("nvars", &self.nvars)
            .field("order", &self.order)
            .field("ring", &self.ring)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
