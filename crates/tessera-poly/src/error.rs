//! Errors raised by polynomial operations.

use thiserror::Error;

/// Failures that abort a polynomial operation.
///
/// Inexact division is not an error: `divides` reports it as `Ok(None)`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PolyError {
    /// An exponent does not fit even in the widest packing.
    #[error("exponent overflow: result needs more than 63 bits per field")]
    ExponentOverflow,

    /// A leading coefficient that must be inverted is not a unit.
    #[error("leading coefficient is not invertible in the coefficient ring")]
    RingNotInvertible,

    /// Operands were built under incompatible contexts, or an exponent
    /// vector has the wrong length.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Division by the zero polynomial.
    #[error("division by zero polynomial")]
    DivisionByZero,

    /// An exponent transform does not apply to this polynomial.
    #[error("invalid exponent transform: {0}")]
    InvalidTransform(String),

    /// Every GCD strategy gave up.
    #[error("gcd infeasible: {0}")]
    Infeasible(String),
}

/// Result alias for polynomial operations.
pub type Result<T> = std::result::Result<T, PolyError>;
