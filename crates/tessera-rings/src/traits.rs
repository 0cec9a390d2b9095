//! Algebraic structure traits.
//!
//! Rings are values rather than marker types: a ring handle such as
//! `Zn::new(12)` carries its modulus, and every element operation goes
//! through the handle. Polynomials store the handle once in their context
//! and the coefficient arrays hold bare elements.

use std::fmt::Debug;

/// Identity of a coefficient ring, used to pick algorithm preferences.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RingKind {
    /// The integers.
    Integer,
    /// Integers modulo a (possibly composite) word-size modulus.
    IntegerMod,
    /// A prime field.
    FiniteField,
}

/// A commutative ring with identity.
///
/// # Laws
///
/// - Addition is associative and commutative with identity `zero()`
/// - Multiplication is associative and commutative with identity `one()`
/// - Multiplication distributes over addition
/// - Every element has an additive inverse (`neg`)
///
/// Implementations must be reentrant: the same handle is shared by every
/// worker thread of a parallel operation.
pub trait Ring: Clone + PartialEq + Debug + Send + Sync {
    /// Ring elements.
    type Element: Clone + Eq + Debug + Send + Sync;

    /// Running sum of products with deferred reduction.
    type Accumulator: Send;

    /// Which family this ring belongs to.
    fn kind(&self) -> RingKind;

    /// The additive identity.
    fn zero(&self) -> Self::Element;

    /// The multiplicative identity.
    fn one(&self) -> Self::Element;

    /// Returns true if `a` is the additive identity.
    fn is_zero(&self, a: &Self::Element) -> bool;

    /// Returns true if `a` is the multiplicative identity.
    fn is_one(&self, a: &Self::Element) -> bool;

    /// Image of a machine integer.
    fn from_i64(&self, n: i64) -> Self::Element;

    /// `a + b`.
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    /// `a - b`.
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    /// `a * b`.
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    /// `-a`.
    fn neg(&self, a: &Self::Element) -> Self::Element;

    /// `a += b`.
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.add(a, b);
    }

    /// Computes `a^n` by repeated squaring.
    fn pow(&self, a: &Self::Element, n: u64) -> Self::Element {
        let mut result = self.one();
        let mut base = a.clone();
        let mut exp = n;

        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(&result, &base);
            }
            exp >>= 1;
            if exp > 0 {
                base = self.mul(&base, &base);
            }
        }

        result
    }

    /// Multiplicative inverse, or `None` if `a` is not a unit.
    fn inv(&self, a: &Self::Element) -> Option<Self::Element>;

    /// Returns true if `a` is a unit.
    fn is_unit(&self, a: &Self::Element) -> bool {
        self.inv(a).is_some()
    }

    /// A greatest common divisor, used for content removal.
    fn gcd(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    /// Some `q` with `q * b == a`, or `None` if `b` does not divide `a`.
    fn div_exact(&self, a: &Self::Element, b: &Self::Element) -> Option<Self::Element>;

    /// A unit `u` such that `u * a` is the canonical associate of `a`.
    ///
    /// Returns `one()` for zero.
    fn unit_normal(&self, a: &Self::Element) -> Self::Element;

    /// A fresh accumulator holding zero.
    fn accumulator(&self) -> Self::Accumulator;

    /// `acc += a * b`.
    fn accumulate(&self, acc: &mut Self::Accumulator, a: &Self::Element, b: &Self::Element);

    /// Reduces an accumulator to an element.
    fn finish(&self, acc: Self::Accumulator) -> Self::Element;
}

/// A Euclidean domain with division with remainder.
pub trait EuclideanDomain: Ring {
    /// Computes the quotient and remainder of division.
    ///
    /// Returns `None` if `b` is zero.
    fn div_rem(&self, a: &Self::Element, b: &Self::Element) -> Option<(Self::Element, Self::Element)>;
}

/// A finite field.
pub trait Field: Ring {
    /// Number of elements.
    fn order(&self) -> u64;

    /// The `k`-th element in a fixed enumeration of the field.
    ///
    /// Used to draw evaluation points.
    fn element(&self, k: u64) -> Self::Element;

    /// Divides by a non-zero element.
    ///
    /// # Panics
    ///
    /// Panics if `b` is zero.
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        self.mul(a, &self.inv(b).expect("division by zero"))
    }
}
