//! Multi-prime GCD over the integers.
//!
//! Both operands are reduced modulo word-size primes, the gcd of each
//! image is computed over the prime field, scaled by the gcd of the
//! integer leading coefficients, and the images are combined by the
//! Chinese remainder theorem. A lifted candidate is trial-divided once two
//! consecutive lifts agree.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_integers::{crt_step, Integer, PrimeSequence};
use tessera_rings::{FiniteField, Z};
use tracing::trace;

use super::{map_batch, GcdFailure, GcdResult};
use crate::context::Context;
use crate::error::Result;
use crate::monomial::Exponents;
use crate::sparse::SparsePoly;

/// Monic gcd over a prime field, seeded for its random points.
pub(super) type ImageGcd =
    fn(&SparsePoly<FiniteField>, &SparsePoly<FiniteField>, u64) -> GcdResult<SparsePoly<FiniteField>>;

fn reduce(a: &SparsePoly<Z>, b: &SparsePoly<Z>, p: u64, seed: u64, image: ImageGcd) -> GcdResult<SparsePoly<FiniteField>> {
    let field = FiniteField::try_new(p).ok_or(GcdFailure::BadReduction)?;
    let ctx = a.context().with_ring(field);
    let ap = a.map_coefficients(&ctx, |c| c.rem_u64(p));
    let bp = b.map_coefficients(&ctx, |c| c.rem_u64(p));
    image(&ap, &bp, seed)
}

/// Residues of the scaled gcd modulo the product of the primes used.
struct Residues {
    coeffs: BTreeMap<Exponents, Integer>,
    modulus: Integer,
}

impl Residues {
    fn new() -> Self {
        Self {
            coeffs: BTreeMap::new(),
            modulus: Integer::new(1),
        }
    }

    fn reset(&mut self) {
        self.coeffs.clear();
        self.modulus = Integer::new(1);
    }

    fn add_image(&mut self, image: &SparsePoly<FiniteField>, p: u64) {
        let mut values: BTreeMap<Exponents, u64> = image.terms().map(|(e, &c)| (e, c)).collect();
        for (key, r) in &mut self.coeffs {
            let v = values.remove(key).unwrap_or(0);
            *r = crt_step(r, &self.modulus, v, p);
        }
        let zero = Integer::new(0);
        for (key, v) in values {
            self.coeffs.insert(key, crt_step(&zero, &self.modulus, v, p));
        }
        self.modulus = &self.modulus * &Integer::from(p);
    }

    /// Symmetric lift, made primitive with a positive leading coefficient.
    fn lift(&self, ctx: &Arc<Context<Z>>) -> Result<SparsePoly<Z>> {
        let pairs = self
            .coeffs
            .iter()
            .map(|(e, r)| (e.to_vec(), r.symmetric_mod(&self.modulus)));
        Ok(SparsePoly::from_pairs(ctx, pairs)?.primitive_part()?.unit_normalize())
    }
}

/// GCD of two primitive integer polynomials from prime-field images.
pub(super) fn gcd(a: &SparsePoly<Z>, b: &SparsePoly<Z>, image: ImageGcd) -> GcdResult<SparsePoly<Z>> {
    let ctx = a.context();
    let config = &ctx.config().gcd;
    let (Some(lc_a), Some(lc_b)) = (a.leading_coeff(), b.leading_coeff()) else {
        return Ok(SparsePoly::one(ctx));
    };
    let gamma = lc_a.gcd(lc_b);
    let mut primes = PrimeSequence::new().filter(|&p| lc_a.rem_u64(p) != 0 && lc_b.rem_u64(p) != 0);
    let mut seeds = ChaCha8Rng::seed_from_u64(config.seed);

    let mut residues = Residues::new();
    let mut lead: Option<Exponents> = None;
    let mut previous: Option<SparsePoly<Z>> = None;
    let mut failures = 0usize;
    let fail = |failures: &mut usize| {
        *failures += 1;
        if *failures > config.max_retries {
            Err(GcdFailure::BadReduction)
        } else {
            Ok(())
        }
    };

    loop {
        let batch: Vec<(u64, u64)> = primes
            .by_ref()
            .take(config.batch_size.max(1))
            .map(|p| (p, seeds.gen()))
            .collect();
        if batch.is_empty() {
            return Err(GcdFailure::BadReduction);
        }
        let images = map_batch(ctx, batch, |(p, seed)| (p, reduce(a, b, p, seed, image)));

        for (p, result) in images {
            let g = match result {
                Ok(g) => g,
                Err(GcdFailure::BadReduction) => {
                    fail(&mut failures)?;
                    continue;
                }
                Err(other) => return Err(other),
            };
            if g.is_constant() {
                return Ok(SparsePoly::one(ctx));
            }

            let scaled = g.scale(&gamma.rem_u64(p));
            let lm = scaled.exponents(0);
            match lead.as_ref().map(|l| lm.cmp(l)) {
                Some(Ordering::Greater) => {
                    trace!(p, "unlucky prime");
                    fail(&mut failures)?;
                    continue;
                }
                Some(Ordering::Less) => {
                    trace!(p, "earlier primes were unlucky");
                    residues.reset();
                    previous = None;
                }
                _ => {}
            }
            lead = Some(lm);

            residues.add_image(&scaled, p);
            let candidate = residues.lift(ctx)?;
            if previous.as_ref() == Some(&candidate) {
                if a.divides(&candidate)?.is_some() && b.divides(&candidate)?.is_some() {
                    trace!(bits = residues.modulus.bit_len(), "lift verified");
                    return Ok(candidate);
                }
                fail(&mut failures)?;
            }
            previous = Some(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::gcd::brown;
    use crate::ordering::MonomialOrder;

    fn zpoly(ctx: &Arc<Context<Z>>, terms: &[(&[u64], i64)]) -> SparsePoly<Z> {
        SparsePoly::from_pairs(ctx, terms.iter().map(|(e, c)| (e.to_vec(), Integer::new(*c)))).unwrap()
    }

    #[test]
    fn test_residues_lift_negative() {
        let ctx = Context::new(1, MonomialOrder::Lex, Z);
        // 3x - 5 reduced mod 101 and mod 103
        let mut residues = Residues::new();
        for p in [101u64, 103] {
            let fctx = ctx.with_ring(FiniteField::new(p));
            let image = SparsePoly::from_pairs(&fctx, [(vec![1], 3), (vec![0], p - 5)]).unwrap();
            residues.add_image(&image, p);
        }
        assert_eq!(residues.lift(&ctx).unwrap(), zpoly(&ctx, &[(&[1], 3), (&[0], -5)]));
    }

    #[test]
    fn test_modular_bivariate() {
        let ctx = Context::new(2, MonomialOrder::Lex, Z);
        // (2x^2*y + 3y + 1)(6x^2 - y) and (2x^2*y + 3y + 1)(4x + 9)
        let g = zpoly(&ctx, &[(&[2, 1], 2), (&[0, 1], 3), (&[0, 0], 1)]);
        let a = g.mul(&zpoly(&ctx, &[(&[2, 0], 6), (&[0, 1], -1)])).unwrap();
        let b = g.mul(&zpoly(&ctx, &[(&[1, 0], 4), (&[0, 0], 9)])).unwrap();
        assert_eq!(gcd(&a, &b, brown::gcd).unwrap(), g);
    }

    #[test]
    fn test_modular_coprime() {
        let ctx = Context::new(2, MonomialOrder::Lex, Z);
        let a = zpoly(&ctx, &[(&[1, 0], 3), (&[0, 1], 1)]);
        let b = zpoly(&ctx, &[(&[1, 1], 1), (&[0, 0], 7)]);
        assert!(gcd(&a, &b, brown::gcd).unwrap().is_one());
    }
}
