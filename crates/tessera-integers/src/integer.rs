//! Arbitrary precision integers.
//!
//! A thin wrapper around `dashu::IBig` exposing the operations the
//! polynomial engine needs from its integer coefficients: exact division,
//! content gcds and reduction to word-size moduli.

use dashu::base::{Abs, BitTest, Gcd, Signed as DashuSigned};
use dashu::integer::IBig;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// An arbitrary precision integer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Integer(IBig);

impl Integer {
    /// Creates a new integer from an i64.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(IBig::from(value))
    }

    /// Creates an integer from a string in the given base.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid integer.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self, dashu::base::error::ParseError> {
        IBig::from_str_radix(s, radix).map(Self)
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    /// Returns true if this integer is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    /// Returns the number of bits needed to represent the magnitude.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.0.bit_len()
    }

    /// Computes the non-negative greatest common divisor.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        Self(IBig::from(self.0.clone().gcd(other.0.clone())))
    }

    /// Returns `self / other` if the division is exact.
    ///
    /// Returns `None` when `other` is zero or does not divide `self`.
    #[must_use]
    pub fn div_exact(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        let r = &self.0 % &other.0;
        if r.is_zero() {
            Some(Self(&self.0 / &other.0))
        } else {
            None
        }
    }

    /// Reduces into `[0, modulus)`.
    #[must_use]
    pub fn rem_u64(&self, modulus: u64) -> u64 {
        let m = IBig::from(modulus);
        let mut r = &self.0 % &m;
        if DashuSigned::is_negative(&r) {
            r = r + &m;
        }
        u64::try_from(r).unwrap_or(0)
    }

    /// Maps `self`, taken modulo `modulus`, into the symmetric range
    /// `(-modulus/2, modulus/2]`.
    #[must_use]
    pub fn symmetric_mod(&self, modulus: &Self) -> Self {
        let mut r = &self.0 % &modulus.0;
        if DashuSigned::is_negative(&r) {
            r = r + &modulus.0;
        }
        let twice: IBig = &r + &r;
        if twice > modulus.0 {
            r = r - &modulus.0;
        }
        Self(r)
    }

    /// Attempts to convert to an i64.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.clone().try_into().ok()
    }

    /// Computes self^exp.
    #[must_use]
    pub fn pow(&self, exp: u64) -> Self {
        let exp = usize::try_from(exp).unwrap_or(usize::MAX);
        Self(self.0.pow(exp))
    }
}

impl Zero for Integer {
    fn zero() -> Self {
        Self(IBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Integer {
    fn one() -> Self {
        Self(IBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == IBig::ONE
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Implements a binary operator for owned and borrowed operands.
macro_rules! binop {
    ($trait:ident, $method:ident) => {
        impl $trait for Integer {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self($trait::$method(self.0, rhs.0))
            }
        }

        impl $trait for &Integer {
            type Output = Integer;

            fn $method(self, rhs: Self) -> Integer {
                Integer($trait::$method(&self.0, &rhs.0))
            }
        }
    };
}

binop!(Add, add);
binop!(Sub, sub);
binop!(Mul, mul);
binop!(Div, div);
binop!(Rem, rem);

impl Neg for Integer {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Neg for &Integer {
    type Output = Integer;

    fn neg(self) -> Integer {
        Integer(-&self.0)
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self(IBig::from(value))
    }
}
