//! Integers modulo a word-size modulus, Z/nZ.

use tessera_integers::modular::gcd_u64;
use tessera_integers::Modulus;

use crate::traits::{Ring, RingKind};

/// Adds `a * b` into a `u128` accumulator, folding it back below the
/// modulus only when the running sum would wrap.
#[inline]
pub(crate) fn accumulate_wide(m: Modulus, acc: &mut u128, a: u64, b: u64) {
    let prod = u128::from(a) * u128::from(b);
    match acc.checked_add(prod) {
        Some(sum) => *acc = sum,
        None => *acc = u128::from(m.reduce_wide(*acc)) + prod,
    }
}

/// The ring Z/nZ for a runtime modulus `n >= 2`.
///
/// `n` need not be prime; operations that need an inverse report
/// non-units instead of failing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Zn {
    m: Modulus,
}

impl Zn {
    /// Creates Z/nZ.
    ///
    /// # Panics
    ///
    /// Panics if `n < 2`.
    #[must_use]
    pub fn new(n: u64) -> Self {
        Self { m: Modulus::new(n) }
    }

    /// Returns the modulus.
    #[must_use]
    pub const fn modulus(&self) -> u64 {
        self.m.value()
    }

    /// Reduces a word into the ring.
    #[must_use]
    pub const fn element(&self, a: u64) -> u64 {
        self.m.reduce(a)
    }
}

impl Ring for Zn {
    type Element = u64;
    type Accumulator = u128;

    fn kind(&self) -> RingKind {
        RingKind::IntegerMod
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
        if self.is_unit(a) || self.is_unit(b) {
            return 1;
        }
        self.m.reduce(gcd_u64(gcd_u64(*a, *b), self.m.value()))
    }

    fn div_exact(&self, a: &u64, b: &u64) -> Option<u64> {
        // Solve b*x = a: solvable iff d = gcd(b, n) divides a, then
        // x = (a/d) * (b/d)^-1 mod n/d.
        let n = self.m.value();
        let d = gcd_u64(*b, n);
        if d == 0 || a % d != 0 {
            return None;
        }
        if d == 1 {
            return self.m.inv(*b).map(|inv| self.m.mul(*a, inv));
        }
        let reduced = n / d;
        if reduced == 1 {
            return Some(0);
        }
        let rm = Modulus::new(reduced);
        let inv = rm.inv(rm.reduce(b / d))?;
        Some(rm.mul(rm.reduce(a / d), inv))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let r = Zn::new(12);
        assert_eq!(r.add(&7, &9), 4);
        assert_eq!(r.sub(&3, &5), 10);
        assert_eq!(r.mul(&5, &7), 11);
        assert_eq!(r.from_i64(-1), 11);
    }

    #[test]
    fn test_non_units() {
        let r = Zn::new(12);
        assert!(r.inv(&4).is_none());
        assert_eq!(r.inv(&5), Some(5));
        assert_eq!(r.unit_normal(&4), 1);
    }

    #[test]
    fn test_div_exact_with_zero_divisors() {
        let r = Zn::new(12);
        // 4 * x = 8 (mod 12) has x = 2
        let x = r.div_exact(&8, &4).unwrap();
        assert_eq!(r.mul(&x, &4), 8);
        // 4 * x = 6 (mod 12) has no solution
        assert!(r.div_exact(&6, &4).is_none());
    }

    #[test]
    fn test_accumulator_defers_reduction() {
        let big = u64::MAX - 58;
        let r = Zn::new(big);
        let a = big - 1;
        let mut acc = r.accumulator();
        for _ in 0..5 {
            r.accumulate(&mut acc, &a, &a);
        }
        // (-1)^2 * 5 = 5
        assert_eq!(r.finish(acc), 5);
    }
}
