//! Benchmarks for sparse multiplication and division.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tessera_integers::Integer;
use tessera_poly::{Context, EngineConfig, MonomialOrder, SparsePoly};
use tessera_rings::{FiniteField, Ring, Z};

/// `(1 + x + y + z + t)^n`, the classic sparse product benchmark input.
fn fateman<R: Ring>(ctx: &Arc<Context<R>>, n: u64) -> SparsePoly<R> {
    let one = ctx.ring().one();
    let pairs = (0..=4).map(|i| {
        let mut e = vec![0u64; 4];
        if i > 0 {
            e[i - 1] = 1;
        }
        (e, one.clone())
    });
    SparsePoly::from_pairs(ctx, pairs).unwrap().pow(n).unwrap()
}

fn contexts<R: Ring>(ring: &R) -> [(&'static str, Arc<Context<R>>); 2] {
    [
        (
            "sequential",
            Context::with_config(4, MonomialOrder::DegRevLex, ring.clone(), EngineConfig::sequential()),
        ),
        ("threaded", Context::new(4, MonomialOrder::DegRevLex, ring.clone())),
    ]
}

fn bench_fateman_mul(c: &mut Criterion) {
    let mut group = c.benchmark_group("fateman_mul");
    group.sample_size(10);

    for n in [5, 10, 15] {
        for (name, ctx) in contexts(&Z) {
            let f = fateman(&ctx, n);
            let g = f.add(&SparsePoly::one(&ctx)).unwrap();
            group.bench_with_input(BenchmarkId::new(format!("Z/{name}"), n), &n, |b, _| {
                b.iter(|| black_box(f.mul(&g).unwrap()));
            });
        }
        for (name, ctx) in contexts(&FiniteField::new(1_000_003)) {
            let f = fateman(&ctx, n);
            let g = f.add(&SparsePoly::one(&ctx)).unwrap();
            group.bench_with_input(BenchmarkId::new(format!("Fp/{name}"), n), &n, |b, _| {
                b.iter(|| black_box(f.mul(&g).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_exact_division(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact_division");
    group.sample_size(10);

    for n in [5, 10] {
        for (name, ctx) in contexts(&Z) {
            let f = fateman(&ctx, n);
            let g = f.add(&SparsePoly::constant(&ctx, Integer::new(2))).unwrap();
            let p = f.mul(&g).unwrap();
            group.bench_with_input(BenchmarkId::new(name, n), &n, |b, _| {
                b.iter(|| black_box(p.divides(&g).unwrap()));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_fateman_mul, bench_exact_division);
criterion_main!(benches);
