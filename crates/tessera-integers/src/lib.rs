//! # tessera-integers
//!
//! Integer arithmetic for the Tessera polynomial engine.
//!
//! This crate wraps `dashu` to provide:
//! - Arbitrary precision integers (`Integer`)
//! - Runtime word-size moduli (`Modulus`)
//! - Deterministic primality testing and descending prime sequences
//! - Chinese remaindering for modular reconstruction

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod integer;
pub mod modular;

#[cfg(test)]
mod proptests;

pub use integer::Integer;
pub use modular::{crt_step, is_prime, Modulus, PrimeSequence};
