//! Polynomial algorithms.
//!
//! This module contains the engine behind [`SparsePoly`](crate::SparsePoly):
//! - Linear merge and radix sort of packed term arrays
//! - Heap-based multiplication, sequential and threaded
//! - Heap-based exact division and division with remainder
//! - Multivariate GCD (dense PRS, Brown, Zippel, multi-prime over Z)
//! - Evaluation, substitution and exponent transforms

pub mod divide;
pub mod evaluate;
pub mod gcd;
pub mod heap;
pub mod heap_mul;
pub mod merge;
pub mod transform;
