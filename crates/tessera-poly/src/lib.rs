//! # tessera-poly
//!
//! Sparse multivariate polynomial arithmetic for the Tessera engine.
//!
//! This crate provides:
//! - Sparse multivariate polynomials with bit-packed monomials
//! - Lex, graded lex and graded reverse lex orderings
//! - Heap-based multiplication and division, with threaded variants
//! - Multivariate GCD over `Z`, `Z/nZ` and prime fields
//! - Evaluation, substitution and exponent transforms
//! - Dense univariate polynomials used inside the GCD algorithms
//!
//! ## Algorithm Selection
//!
//! Multiplication and division go parallel once `len(A) * len(B)` (or the
//! dividend length) reaches [`EngineConfig::parallel_threshold`]. The GCD
//! dispatcher picks a strategy from the input shape:
//! - Small dense inputs: recursive pseudo-remainder sequence
//! - Three or more variables with sparse support: Zippel
//! - Otherwise: Brown
//!
//! Over `Z` the Brown and Zippel strategies run on prime-field images that
//! are combined by Chinese remaindering.
//!
//! ## Example
//!
//! ```rust
//! use tessera_poly::{Context, MonomialOrder, SparsePoly};
//! use tessera_rings::FiniteField;
//!
//! let ctx = Context::new(2, MonomialOrder::DegRevLex, FiniteField::new(101));
//! let x = SparsePoly::var(&ctx, 0).unwrap();
//! let y = SparsePoly::var(&ctx, 1).unwrap();
//! let g = x.add(&y).unwrap();
//! let a = g.mul(&x).unwrap();
//! let b = g.mul(&y.pow(2).unwrap()).unwrap();
//! assert_eq!(a.gcd(&b).unwrap(), g);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod algorithms;
pub mod config;
pub mod context;
pub mod dense;
pub mod error;
pub mod monomial;
pub mod ordering;
pub mod sparse;

#[cfg(test)]
mod proptests;

pub use algorithms::gcd::GcdRing;
pub use config::{EngineConfig, GcdConfig, GcdStrategy};
pub use context::Context;
pub use dense::DensePoly;
pub use error::{PolyError, Result};
pub use monomial::ExpLayout;
pub use ordering::MonomialOrder;
pub use sparse::SparsePoly;
