//! # Tessera
//!
//! A sparse multivariate polynomial engine written in Rust.
//!
//! Tessera stores polynomials as sorted arrays of bit-packed monomials with
//! a parallel coefficient array, and builds heap-based multiplication,
//! division and multivariate GCD on top of that representation.
//!
//! ## Features
//!
//! - **Coefficient rings**: arbitrary precision integers, `Z/nZ` and prime fields
//! - **Monomial orders**: lex, graded lex and graded reverse lex
//! - **Heap arithmetic**: sequential and work-partitioned threaded kernels
//! - **GCD**: dense PRS, Brown's dense interpolation, Zippel's sparse interpolation
//! - **Transforms**: evaluation, substitution, inflation and deflation
//!
//! ## Quick Start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! let ctx = Context::new(2, MonomialOrder::Lex, Z);
//! let x = SparsePoly::var(&ctx, 0).unwrap();
//! let y = SparsePoly::var(&ctx, 1).unwrap();
//!
//! // (x + y)^2 and (x + y)(x - y)
//! let s = x.add(&y).unwrap();
//! let a = s.pow(2).unwrap();
//! let b = s.mul(&x.sub(&y).unwrap()).unwrap();
//! assert_eq!(a.gcd(&b).unwrap(), s);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use tessera_integers as integers;
pub use tessera_poly as poly;
pub use tessera_rings as rings;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tessera_integers::Integer;
    pub use tessera_poly::{
        Context, DensePoly, EngineConfig, GcdConfig, GcdStrategy, MonomialOrder, PolyError, SparsePoly,
    };
    pub use tessera_rings::{Field, FiniteField, Ring, Zn, Z};
}
