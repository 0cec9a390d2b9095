//! Property-based tests for the coefficient rings.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{Field, FiniteField, Ring, Zn, Z};

    fn small_int() -> impl Strategy<Value = i64> {
        -10_000i64..10_000i64
    }

    fn prime() -> impl Strategy<Value = u64> {
        prop_oneof![Just(2u64), Just(101), Just(65_537), Just(1_000_003), Just(4_611_686_018_427_387_847)]
    }

    /// Accumulates `a_i * b_i` with deferred reduction and compares with
    /// the reduced running sum.
    fn dot_matches<R: Ring>(ring: &R, a: &[R::Element], b: &[R::Element]) -> bool {
        let mut acc = ring.accumulator();
        let mut expected = ring.zero();
        for (x, y) in a.iter().zip(b) {
            ring.accumulate(&mut acc, x, y);
            expected = ring.add(&expected, &ring.mul(x, y));
        }
        ring.finish(acc) == expected
    }

    proptest! {
        #[test]
        fn field_distributive(p in prime(), a in small_int(), b in small_int(), c in small_int()) {
            let f = FiniteField::new(p);
            let (a, b, c) = (f.from_i64(a), f.from_i64(b), f.from_i64(c));
            prop_assert_eq!(f.mul(&a, &f.add(&b, &c)), f.add(&f.mul(&a, &b), &f.mul(&a, &c)));
        }

        #[test]
        fn field_inverse(p in prime(), a in small_int()) {
            let f = FiniteField::new(p);
            let a = f.from_i64(a);
            prop_assume!(!f.is_zero(&a));
            let inv = f.inv(&a).unwrap();
            prop_assert!(f.is_one(&f.mul(&a, &inv)));
            prop_assert_eq!(f.div(&a, &a), 1);
        }

        #[test]
        fn field_fermat(p in prime(), a in 1u64..1_000_000u64) {
            let f = FiniteField::new(p);
            let a = f.element(a);
            prop_assume!(a != 0);
            prop_assert_eq!(f.pow(&a, p - 1), 1);
        }

        #[test]
        fn zn_div_exact_solves(n in 2u64..500u64, a in 0u64..500u64, b in 0u64..500u64) {
            let r = Zn::new(n);
            let (a, b) = (r.element(a), r.element(b));
            if let Some(x) = r.div_exact(&a, &b) {
                prop_assert_eq!(r.mul(&b, &x), a);
            }
            // b * a is always divisible by b
            let prod = r.mul(&b, &a);
            let q = r.div_exact(&prod, &b);
            prop_assert!(q.is_some());
            prop_assert_eq!(r.mul(&b, &q.unwrap()), prod);
        }

        #[test]
        fn zn_gcd_divides(n in 2u64..500u64, a in 0u64..500u64, b in 0u64..500u64) {
            let r = Zn::new(n);
            let (a, b) = (r.element(a), r.element(b));
            let g = r.gcd(&a, &b);
            prop_assert!(g < n);
            prop_assert!(r.div_exact(&a, &g).is_some());
            prop_assert!(r.div_exact(&b, &g).is_some());
        }

        #[test]
        fn integer_unit_normal(a in small_int()) {
            let a = Z.from_i64(a);
            let normal = Z.mul(&a, &Z.unit_normal(&a));
            prop_assert!(!normal.is_negative());
            prop_assert_eq!(normal, a.abs());
        }

        #[test]
        fn accumulators_match_reduced_sums(
            p in prime(),
            xs in proptest::collection::vec(any::<u64>(), 0..40),
            ys in proptest::collection::vec(any::<u64>(), 0..40),
        ) {
            let f = FiniteField::new(p);
            let a: Vec<u64> = xs.iter().map(|&x| f.element(x)).collect();
            let b: Vec<u64> = ys.iter().map(|&y| f.element(y)).collect();
            prop_assert!(dot_matches(&f, &a, &b));

            let zn = Zn::new(p.max(4) - 1);
            let a: Vec<u64> = xs.iter().map(|&x| zn.element(x)).collect();
            let b: Vec<u64> = ys.iter().map(|&y| zn.element(y)).collect();
            prop_assert!(dot_matches(&zn, &a, &b));

            let a: Vec<_> = xs.iter().map(|&x| Z.from_i64(x as i64)).collect();
            let b: Vec<_> = ys.iter().map(|&y| Z.from_i64(y as i64)).collect();
            prop_assert!(dot_matches(&Z, &a, &b));
        }
    }
}
