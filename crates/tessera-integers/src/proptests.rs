//! Property-based tests for integer and modular arithmetic.

#[cfg(test)]
mod tests {
    use num_traits::Zero;
    use proptest::prelude::*;

    use crate::{crt_step, Integer, Modulus, PrimeSequence};

    fn small_int() -> impl Strategy<Value = i64> {
        -1000i64..1000i64
    }

    fn non_zero_int() -> impl Strategy<Value = i64> {
        prop_oneof![(-1000i64..=-1i64), (1i64..=1000i64)]
    }

    proptest! {
        #[test]
        fn integer_distributive(a in small_int(), b in small_int(), c in small_int()) {
            let a = Integer::new(a);
            let b = Integer::new(b);
            let c = Integer::new(c);
            prop_assert_eq!(
                a.clone() * (b.clone() + c.clone()),
                a.clone() * b + a * c
            );
        }

        #[test]
        fn gcd_divides_both(a in non_zero_int(), b in non_zero_int()) {
            let a = Integer::new(a);
            let b = Integer::new(b);
            let g = a.gcd(&b);

            prop_assert!((a.clone() % g.clone()).is_zero());
            prop_assert!((b.clone() % g.clone()).is_zero());
            prop_assert!(a.div_exact(&g).is_some());
        }

        #[test]
        fn div_exact_inverts_mul(a in small_int(), b in non_zero_int()) {
            let a = Integer::new(a);
            let b = Integer::new(b);
            prop_assert_eq!((&a * &b).div_exact(&b), Some(a));
        }

        #[test]
        fn rem_u64_matches_signed_reduction(a in small_int(), m in 2u64..500u64) {
            let expected = Modulus::new(m).from_signed(a);
            prop_assert_eq!(Integer::new(a).rem_u64(m), expected);
        }

        #[test]
        fn modular_inverse(a in 1u64..1000u64) {
            let m = Modulus::new(998_244_353);
            let inv = m.inv(a).expect("inverse should exist for non-zero mod prime");
            prop_assert_eq!(m.mul(a, inv), 1);
        }

        #[test]
        fn modular_fermat_little_theorem(a in 1u64..1000u64) {
            let p = 998_244_353;
            prop_assert_eq!(Modulus::new(p).pow(a, p - 1), 1);
        }

        #[test]
        fn crt_recovers_signed_value(x in -1_000_000_000i64..1_000_000_000i64) {
            let mut residue = Integer::zero();
            let mut modulus = Integer::new(1);
            for p in PrimeSequence::below(1 << 20).take(3) {
                let r = Integer::new(x).rem_u64(p);
                residue = crt_step(&residue, &modulus, r, p);
                modulus = &modulus * &Integer::from(p);
            }
            prop_assert_eq!(residue.symmetric_mod(&modulus), Integer::new(x));
        }
    }
}
