//! Property-based tests for sparse polynomial arithmetic.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use tessera_integers::Integer;
    use tessera_rings::{Field, FiniteField, Ring, Zn, Z};

    use crate::algorithms::divide::{divides_heap, divides_threaded};
    use crate::config::EngineConfig;
    use crate::context::Context;
    use crate::ordering::MonomialOrder;
    use crate::sparse::SparsePoly;

    type Terms = Vec<(Vec<u64>, i64)>;

    // Strategy for picking a monomial ordering
    fn order() -> impl Strategy<Value = MonomialOrder> {
        prop_oneof![
            Just(MonomialOrder::Lex),
            Just(MonomialOrder::DegLex),
            Just(MonomialOrder::DegRevLex),
        ]
    }

    // Strategy for generating small term lists in `nvars` variables
    fn terms(nvars: usize, max_exp: u64, max_terms: usize) -> impl Strategy<Value = Terms> {
        proptest::collection::vec(
            (proptest::collection::vec(0..=max_exp, nvars), -20i64..20),
            0..=max_terms,
        )
    }

    // Strategy for generating term lists with at least one nonzero term
    fn nonzero_terms(nvars: usize, max_exp: u64, max_terms: usize) -> impl Strategy<Value = Terms> {
        proptest::collection::vec(
            (proptest::collection::vec(0..=max_exp, nvars), (1i64..20).prop_union(-20i64..0)),
            1..=max_terms,
        )
        .prop_filter("distinct exponents", |t| {
            let mut seen: Vec<&Vec<u64>> = t.iter().map(|(e, _)| e).collect();
            seen.sort();
            seen.dedup();
            seen.len() == t.len()
        })
    }

    fn zpoly(ctx: &Arc<Context<Z>>, terms: &Terms) -> SparsePoly<Z> {
        SparsePoly::from_pairs(ctx, terms.iter().map(|(e, c)| (e.clone(), Integer::new(*c)))).unwrap()
    }

    fn fpoly(ctx: &Arc<Context<FiniteField>>, terms: &Terms) -> SparsePoly<FiniteField> {
        let field = *ctx.ring();
        SparsePoly::from_pairs(ctx, terms.iter().map(|(e, c)| (e.clone(), field.from_i64(*c)))).unwrap()
    }

    /// Polynomial over Z/12 whose coefficients are all units.
    fn unit_poly(ctx: &Arc<Context<Zn>>, terms: &Terms) -> SparsePoly<Zn> {
        const UNITS: [i64; 4] = [1, 5, 7, 11];
        let ring = *ctx.ring();
        let pairs = terms
            .iter()
            .map(|(e, c)| (e.clone(), ring.from_i64(UNITS[c.rem_euclid(4) as usize])));
        SparsePoly::from_pairs(ctx, pairs).unwrap()
    }

    fn zn_poly(ctx: &Arc<Context<Zn>>, terms: &Terms) -> SparsePoly<Zn> {
        let ring = *ctx.ring();
        SparsePoly::from_pairs(ctx, terms.iter().map(|(e, c)| (e.clone(), ring.from_i64(*c)))).unwrap()
    }

    fn zctx(order: MonomialOrder, nvars: usize) -> Arc<Context<Z>> {
        Context::with_config(nvars, order, Z, EngineConfig::sequential())
    }

    proptest! {
        // Ring axioms

        #[test]
        fn add_associative(o in order(), f in terms(3, 6, 8), g in terms(3, 6, 8), h in terms(3, 6, 8)) {
            let ctx = zctx(o, 3);
            let (f, g, h) = (zpoly(&ctx, &f), zpoly(&ctx, &g), zpoly(&ctx, &h));
            prop_assert_eq!(
                f.add(&g.add(&h).unwrap()).unwrap(),
                f.add(&g).unwrap().add(&h).unwrap()
            );
        }

        #[test]
        fn mul_associative(o in order(), f in terms(3, 4, 5), g in terms(3, 4, 5), h in terms(3, 4, 5)) {
            let ctx = zctx(o, 3);
            let (f, g, h) = (zpoly(&ctx, &f), zpoly(&ctx, &g), zpoly(&ctx, &h));
            prop_assert_eq!(
                f.mul(&g.mul(&h).unwrap()).unwrap(),
                f.mul(&g).unwrap().mul(&h).unwrap()
            );
        }

        #[test]
        fn mul_commutative(o in order(), f in terms(3, 200, 8), g in terms(3, 200, 8)) {
            let ctx = zctx(o, 3);
            let (f, g) = (zpoly(&ctx, &f), zpoly(&ctx, &g));
            prop_assert_eq!(f.mul(&g).unwrap(), g.mul(&f).unwrap());
        }

        #[test]
        fn mul_distributes(o in order(), f in terms(2, 5, 6), g in terms(2, 5, 6), h in terms(2, 5, 6)) {
            let ctx = Context::with_config(2, o, FiniteField::new(101), EngineConfig::sequential());
            let (f, g, h) = (fpoly(&ctx, &f), fpoly(&ctx, &g), fpoly(&ctx, &h));
            let left = f.mul(&g.add(&h).unwrap()).unwrap();
            let right = f.mul(&g).unwrap().add(&f.mul(&h).unwrap()).unwrap();
            prop_assert_eq!(left, right);
        }

        // Division

        #[test]
        fn divides_round_trip(o in order(), f in terms(3, 5, 6), g in nonzero_terms(3, 5, 5)) {
            let ctx = zctx(o, 3);
            let (f, g) = (zpoly(&ctx, &f), zpoly(&ctx, &g));
            let product = f.mul(&g).unwrap();
            prop_assert_eq!(product.divides(&g).unwrap(), Some(f));
        }

        #[test]
        fn threaded_division_agrees_over_integers(o in order(), f in terms(3, 5, 6), g in nonzero_terms(3, 5, 4)) {
            let ctx = Context::new(3, o, Z);
            let (f, g) = (zpoly(&ctx, &f), zpoly(&ctx, &g));
            prop_assume!(!f.is_zero());
            let p = f.mul(&g).unwrap();
            prop_assert_eq!(divides_threaded(&p, &g).unwrap(), divides_heap(&p, &g).unwrap());
            let shifted = p.add(&SparsePoly::one(&ctx)).unwrap();
            prop_assert_eq!(divides_threaded(&shifted, &g).unwrap(), divides_heap(&shifted, &g).unwrap());
        }

        #[test]
        fn threaded_division_agrees_with_zero_divisors(o in order(), f in terms(3, 5, 6), g in nonzero_terms(3, 5, 4)) {
            let ctx = Context::new(3, o, Zn::new(12));
            let (f, g) = (zn_poly(&ctx, &f), unit_poly(&ctx, &g));
            prop_assume!(!f.is_zero());
            let p = f.mul(&g).unwrap();
            let exact = divides_heap(&p, &g).unwrap();
            prop_assert_eq!(divides_threaded(&p, &g).unwrap(), exact.clone());
            prop_assert!(exact.is_some());
            let shifted = p.add(&SparsePoly::one(&ctx)).unwrap();
            prop_assert_eq!(divides_threaded(&shifted, &g).unwrap(), divides_heap(&shifted, &g).unwrap());
        }

        #[test]
        fn div_rem_reconstructs(o in order(), a in terms(2, 6, 8), b in nonzero_terms(2, 3, 3)) {
            let ctx = Context::with_config(2, o, FiniteField::new(101), EngineConfig::sequential());
            let (a, b) = (fpoly(&ctx, &a), fpoly(&ctx, &b));
            prop_assume!(!b.is_zero());
            let (q, r) = a.div_rem(&b).unwrap();
            prop_assert_eq!(q.mul(&b).unwrap().add(&r).unwrap(), a);
        }

        // GCD

        #[test]
        fn gcd_divides_with_coprime_cofactors(
            f in nonzero_terms(2, 3, 3),
            g in nonzero_terms(2, 3, 3),
            c in nonzero_terms(2, 2, 3),
        ) {
            let ctx = zctx(MonomialOrder::DegRevLex, 2);
            let c = zpoly(&ctx, &c);
            let a = zpoly(&ctx, &f).mul(&c).unwrap();
            let b = zpoly(&ctx, &g).mul(&c).unwrap();
            let h = a.gcd(&b).unwrap();
            let ca = a.divides(&h).unwrap();
            let cb = b.divides(&h).unwrap();
            prop_assert!(ca.is_some() && cb.is_some());
            let (ca, cb) = (ca.unwrap(), cb.unwrap());
            prop_assert!(ca.gcd(&cb).unwrap().is_one());
            prop_assert!(h.divides(&c).unwrap().is_some());
        }

        #[test]
        fn gcd_finite_field_is_monic(f in nonzero_terms(3, 3, 3), c in nonzero_terms(3, 2, 3)) {
            let ctx = Context::with_config(3, MonomialOrder::Lex, FiniteField::new(10_007), EngineConfig::sequential());
            let c = fpoly(&ctx, &c);
            let f = fpoly(&ctx, &f);
            prop_assume!(!c.is_zero() && !f.is_zero());
            let h = f.mul(&c).unwrap().gcd(&c).unwrap();
            prop_assert_eq!(h, c.make_monic().unwrap());
        }

        // Exponent transforms

        #[test]
        fn inflate_deflate_round_trip(
            o in order(),
            f in terms(3, 8, 6),
            shift in proptest::collection::vec(0u64..4, 3),
            stride in proptest::collection::vec(1u64..4, 3),
        ) {
            let ctx = zctx(o, 3);
            let f = zpoly(&ctx, &f);
            let inflated = f.inflate(&shift, &stride).unwrap();
            prop_assert_eq!(inflated.deflate(&shift, &stride).unwrap(), f.clone());

            let (s, k) = f.deflation();
            let deflated = f.deflate(&s, &k).unwrap();
            prop_assert_eq!(deflated.inflate(&s, &k).unwrap(), f);
        }

        // Degrees

        #[test]
        fn total_degree_additive(o in order(), f in nonzero_terms(3, 9, 5), g in nonzero_terms(3, 9, 5)) {
            let ctx = zctx(o, 3);
            let (f, g) = (zpoly(&ctx, &f), zpoly(&ctx, &g));
            let (df, dg) = (f.total_degree().unwrap(), g.total_degree().unwrap());
            prop_assert_eq!(f.mul(&g).unwrap().total_degree(), Some(df + dg));
            if let Some(ds) = f.add(&g).unwrap().total_degree() {
                prop_assert!(ds <= df.max(dg));
            }
        }
    }

    /// Dense polynomial with every exponent up to `degs` and random
    /// coefficients.
    fn random_dense(ctx: &Arc<Context<FiniteField>>, degs: [u64; 3], rng: &mut ChaCha8Rng) -> SparsePoly<FiniteField> {
        let p = ctx.ring().order();
        let mut pairs = Vec::new();
        for i in 0..=degs[0] {
            for j in 0..=degs[1] {
                for k in 0..=degs[2] {
                    pairs.push((vec![i, j, k], rng.gen_range(0..p)));
                }
            }
        }
        SparsePoly::from_pairs(ctx, pairs).unwrap()
    }

    /// Expands every product, sorts and combines.
    fn reference_product(a: &SparsePoly<FiniteField>, b: &SparsePoly<FiniteField>) -> SparsePoly<FiniteField> {
        let field = *a.ring();
        let mut acc: BTreeMap<Vec<u64>, u64> = BTreeMap::new();
        for (ea, ca) in a.terms() {
            for (eb, cb) in b.terms() {
                let e: Vec<u64> = ea.iter().zip(&eb).map(|(x, y)| x + y).collect();
                let slot = acc.entry(e).or_insert(0);
                *slot = field.add(slot, &field.mul(ca, cb));
            }
        }
        SparsePoly::from_pairs(a.context(), acc).unwrap()
    }

    #[test]
    fn dense_product_matches_reference() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let field = FiniteField::new(1_000_003);
        for order in [MonomialOrder::Lex, MonomialOrder::DegRevLex] {
            let sequential = Context::with_config(3, order, field, EngineConfig::sequential());
            let threaded = Context::with_config(
                3,
                order,
                field,
                EngineConfig::default().with_threads(4).with_parallel_threshold(1),
            );
            let degs_a = [50, rng.gen_range(1..=3), rng.gen_range(1..=3)];
            let degs_b = [rng.gen_range(1..=3), 50, rng.gen_range(1..=3)];
            let a = random_dense(&sequential, degs_a, &mut rng);
            let b = random_dense(&sequential, degs_b, &mut rng);
            let expected = reference_product(&a, &b);
            assert_eq!(a.mul(&b).unwrap(), expected);

            let (ta, tb) = (a.to_context(&threaded).unwrap(), b.to_context(&threaded).unwrap());
            let product = ta.mul(&tb).unwrap();
            assert_eq!(product.to_context(&sequential).unwrap(), expected);
        }
    }
}
