//! Prime fields Z/pZ.

use tessera_integers::{is_prime, Modulus};

use crate::modular::accumulate_wide;
use crate::traits::{EuclideanDomain, Field, Ring, RingKind};

/// The prime field Z/pZ for a runtime prime `p`.
///
/// Elements are reduced `u64` residues.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FiniteField {
    m: Modulus,
}

impl FiniteField {
    /// Creates the field of `p` elements.
    ///
    /// # Panics
    ///
    /// Panics if `p` is not prime.
    #[must_use]
    pub fn new(p: u64) -> Self {
        Self::try_new(p).expect("finite field order must be prime")
    }

    /// Creates the field of `p` elements, or `None` if `p` is not prime.
    #[must_use]
    pub fn try_new(p: u64) -> Option<Self> {
        is_prime(p).then(|| Self { m: Modulus::new(p) })
    }

    /// Returns the characteristic.
    #[must_use]
    pub const fn characteristic(&self) -> u64 {
        self.m.value()
    }

    /// Returns the underlying modulus.
    #[must_use]
    pub const fn modulus(&self) -> Modulus {
        self.m
    }

    /// Lifts a residue to the symmetric range `(-p/2, p/2]`.
    #[must_use]
    pub fn to_signed(&self, a: u64) -> i128 {
        self.m.to_signed(a)
    }
}

impl Ring for FiniteField {
    type Element = u64;
    type Accumulator = u128;

    fn kind(&self) -> RingKind {
        RingKind::FiniteField
    }

    fn zero(&self) -> u64 {
        0
    }

    fn one(&self) -> u64 {
        1
    }

    fn is_zero(&self, a: &u64) -> bool {
        *a == 0
    }

    fn is_one(&self, a: &u64) -> bool {
        *a == 1
    }

    fn from_i64(&self, n: i64) -> u64 {
        self.m.from_signed(n)
    }

    fn add(&self, a: &u64, b: &u64) -> u64 {
        self.m.add(*a, *b)
    }

    fn sub(&self, a: &u64, b: &u64) -> u64 {
        self.m.sub(*a, *b)
    }

    fn mul(&self, a: &u64, b: &u64) -> u64 {
        self.m.mul(*a, *b)
    }

    fn neg(&self, a: &u64) -> u64 {
        self.m.neg(*a)
    }

    fn pow(&self, a: &u64, n: u64) -> u64 {
        self.m.pow(*a, n)
    }

    fn inv(&self, a: &u64) -> Option<u64> {
        self.m.inv(*a)
    }

    fn gcd(&self, a: &u64, b: &u64) -> u64 {
        u64::from(*a != 0 || *b != 0)
    }

    fn div_exact(&self, a: &u64, b: &u64) -> Option<u64> {
        self.m.inv(*b).map(|inv| self.m.mul(*a, inv))
    }

    fn unit_normal(&self, a: &u64) -> u64 {
        self.m.inv(*a).unwrap_or(1)
    }

    fn accumulator(&self) -> u128 {
        0
    }

    fn accumulate(&self, acc: &mut u128, a: &u64, b: &u64) {
        accumulate_wide(self.m, acc, *a, *b);
    }

    fn finish(&self, acc: u128) -> u64 {
        self.m.reduce_wide(acc)
    }
}

impl EuclideanDomain for FiniteField {
    fn div_rem(&self, a: &u64, b: &u64) -> Option<(u64, u64)> {
        self.div_exact(a, b).map(|q| (q, 0))
    }
}

impl Field for FiniteField {
    fn order(&self) -> u64 {
        self.m.value()
    }

    fn element(&self, k: u64) -> u64 {
        self.m.reduce(k)
    }
}
