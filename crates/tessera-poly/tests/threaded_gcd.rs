use std::sync::Arc;

use tessera_integers::Integer;
use tessera_poly::{Context, EngineConfig, GcdConfig, GcdStrategy, MonomialOrder, PolyError, SparsePoly};
use tessera_rings::{FiniteField, Ring, Z};

/// Run with: RUST_LOG=tessera_poly=trace cargo test -p tessera-poly --test threaded_gcd -- --nocapture
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn threaded(strategy: GcdStrategy) -> EngineConfig {
    EngineConfig::default()
        .with_threads(4)
        .with_parallel_threshold(16)
        .with_gcd(GcdConfig::default().with_strategy(strategy).with_seed(7))
}

fn poly<R: Ring>(ctx: &Arc<Context<R>>, terms: &[(&[u64], i64)]) -> SparsePoly<R> {
    let ring = ctx.ring().clone();
    SparsePoly::from_pairs(ctx, terms.iter().map(|(e, c)| (e.to_vec(), ring.from_i64(*c)))).unwrap()
}

#[test]
fn integer_gcd_with_thread_pool() {
    init_tracing();
    for strategy in [GcdStrategy::Auto, GcdStrategy::Dense, GcdStrategy::Brown, GcdStrategy::Zippel] {
        let ctx = Context::with_config(4, MonomialOrder::DegRevLex, Z, threaded(strategy));
        // g = 3x^4 + y^2*z*t - 5z^3 + 11, cofactors share nothing
        let g = poly(&ctx, &[(&[4, 0, 0, 0], 3), (&[0, 2, 1, 1], 1), (&[0, 0, 3, 0], -5), (&[0, 0, 0, 0], 11)]);
        let f1 = poly(&ctx, &[(&[1, 1, 0, 0], 2), (&[0, 0, 0, 2], -1), (&[0, 0, 0, 0], 4)]);
        let f2 = poly(&ctx, &[(&[0, 0, 2, 1], 7), (&[2, 0, 0, 0], 1), (&[0, 1, 0, 0], -3)]);
        let a = g.mul(&f1).unwrap();
        let b = g.mul(&f2).unwrap();

        let h = a.gcd(&b).unwrap();
        assert_eq!(h, g, "strategy {strategy:?}");
        assert!(a.divides(&h).unwrap().is_some());
        assert!(b.divides(&h).unwrap().is_some());
    }
}

#[test]
fn scaled_integer_gcd_keeps_content() {
    init_tracing();
    let ctx = Context::with_config(2, MonomialOrder::Lex, Z, threaded(GcdStrategy::Auto));
    let g = poly(&ctx, &[(&[2, 1], 1), (&[0, 0], -1)]);
    let a = g.mul(&poly(&ctx, &[(&[1, 0], 6), (&[0, 0], 4)])).unwrap();
    let b = g.mul(&poly(&ctx, &[(&[0, 1], -10)])).unwrap();
    let expected = g.scale(&Integer::new(2));
    assert_eq!(a.gcd(&b).unwrap(), expected);
    assert_eq!(b.neg().gcd(&a).unwrap(), expected);
}

#[test]
fn prime_field_gcd_with_thread_pool() {
    init_tracing();
    let field = FiniteField::new(1_000_003);
    for strategy in [GcdStrategy::Brown, GcdStrategy::Zippel] {
        let ctx = Context::with_config(3, MonomialOrder::Lex, field, threaded(strategy));
        let g = poly(&ctx, &[(&[2, 0, 0], 1), (&[0, 3, 1], 5), (&[0, 0, 0], -2)]);
        let a = g.mul(&poly(&ctx, &[(&[1, 0, 1], 1), (&[0, 2, 0], 1)])).unwrap();
        let b = g.mul(&poly(&ctx, &[(&[0, 0, 2], 1), (&[1, 0, 0], 3)])).unwrap();
        assert_eq!(a.gcd(&b).unwrap(), g, "strategy {strategy:?}");
    }
}

#[test]
fn gcd_rejects_mismatched_contexts() {
    let a = SparsePoly::var(&Context::new(2, MonomialOrder::Lex, Z), 0).unwrap();
    let b = SparsePoly::var(&Context::new(3, MonomialOrder::Lex, Z), 0).unwrap();
    assert!(matches!(a.gcd(&b), Err(PolyError::DimensionMismatch(_))));
}
