//! The ring of integers Z.

use num_traits::{One, Zero};
use tessera_integers::Integer;

use crate::traits::{EuclideanDomain, Ring, RingKind};

/// The ring of integers, with `tessera_integers::Integer` elements.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Z;

impl Ring for Z {
    type Element = Integer;
    type Accumulator = Integer;

    fn kind(&self) -> RingKind {
        RingKind::Integer
    }

    fn zero(&self) -> Integer {
        Integer::zero()
    }

    fn one(&self) -> Integer {
        Integer::one()
    }

    fn is_zero(&self, a: &Integer) -> bool {
        a.is_zero()
    }

    fn is_one(&self, a: &Integer) -> bool {
        a.is_one()
    }

    fn from_i64(&self, n: i64) -> Integer {
        Integer::new(n)
    }

    fn add(&self, a: &Integer, b: &Integer) -> Integer {
        a + b
    }

    fn sub(&self, a: &Integer, b: &Integer) -> Integer {
        a - b
    }

    fn mul(&self, a: &Integer, b: &Integer) -> Integer {
        a * b
    }

    fn neg(&self, a: &Integer) -> Integer {
        -a
    }

    fn pow(&self, a: &Integer, n: u64) -> Integer {
        a.pow(n)
    }

    fn inv(&self, a: &Integer) -> Option<Integer> {
        if a.abs().is_one() {
            Some(a.clone())
        } else {
            None
        }
    }

    fn gcd(&self, a: &Integer, b: &Integer) -> Integer {
        a.gcd(b)
    }

    fn div_exact(&self, a: &Integer, b: &Integer) -> Option<Integer> {
        a.div_exact(b)
    }

    fn unit_normal(&self, a: &Integer) -> Integer {
        if a.is_negative() {
            Integer::new(-1)
        } else {
            Integer::one()
        }
    }

    fn accumulator(&self) -> Integer {
        Integer::zero()
    }

    fn accumulate(&self, acc: &mut Integer, a: &Integer, b: &Integer) {
        *acc = &*acc + &(a * b);
    }

    fn finish(&self, acc: Integer) -> Integer {
        acc
    }
}

impl EuclideanDomain for Z {
    fn div_rem(&self, a: &Integer, b: &Integer) -> Option<(Integer, Integer)> {
        if b.is_zero() {
            return None;
        }
        let q = a.clone() / b.clone();
        let r = a.clone() % b.clone();
        Some((q, r))
    }
}
