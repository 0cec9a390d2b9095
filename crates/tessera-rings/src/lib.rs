//! # tessera-rings
//!
//! Coefficient rings for the Tessera polynomial engine.
//!
//! This crate provides:
//! - The ring handle trait `Ring`, with `EuclideanDomain` and `Field` refinements
//! - Ring identity (`RingKind`) used to select algorithm preferences
//! - Concrete rings: the integers `Z`, word-size `Zn`, prime fields `FiniteField`
//!
//! ## Trait Hierarchy
//!
//! ```text
//! Ring
//!  ├── EuclideanDomain
//!  └── Field
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod finite_field;
pub mod integers;
pub mod modular;
pub mod traits;

#[cfg(test)]
mod proptests;

pub use finite_field::FiniteField;
pub use integers::Z;
pub use modular::Zn;
pub use traits::{EuclideanDomain, Field, Ring, RingKind};
