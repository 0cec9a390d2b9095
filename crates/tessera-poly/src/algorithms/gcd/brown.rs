//! Brown's dense modular GCD over prime fields.
//!
//! The last active variable `x_k` is eliminated by evaluation: the gcd is
//! computed recursively at random points `x_k = α`, scaled by the gcd of
//! the leading coefficients, and Newton-interpolated until a candidate
//! divides both operands.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use smallvec::smallvec;
use tessera_rings::{FiniteField, Ring};
use tracing::trace;

use super::{active_vars, draw_points, map_batch, GcdFailure, GcdResult};
use crate::context::Context;
use crate::dense::DensePoly;
use crate::error::Result;
use crate::monomial::Exponents;
use crate::sparse::SparsePoly;

pub(super) type Poly = SparsePoly<FiniteField>;
pub(super) type Univariate = DensePoly<FiniteField>;

/// Coefficients of `poly` in `F[x_var]`, keyed by the other exponents in
/// decreasing lexicographic order.
pub(super) fn split_var(poly: &Poly, var: usize) -> Vec<(Exponents, Univariate)> {
    let field = *poly.ring();
    let mut groups: BTreeMap<Exponents, Vec<u64>> = BTreeMap::new();
    for (mut exps, &c) in poly.terms() {
        let e = usize::try_from(std::mem::take(&mut exps[var])).unwrap_or(usize::MAX);
        let coeffs = groups.entry(exps).or_default();
        if coeffs.len() <= e {
            coeffs.resize(e + 1, 0);
        }
        coeffs[e] = c;
    }
    groups
        .into_iter()
        .rev()
        .map(|(key, coeffs)| (key, DensePoly::new(field, coeffs)))
        .collect()
}

/// Inverse of [`split_var`].
pub(super) fn join_var(ctx: &Arc<Context<FiniteField>>, var: usize, groups: &[(Exponents, Univariate)]) -> Result<Poly> {
    let mut pairs = Vec::new();
    for (key, coeffs) in groups {
        for (e, &c) in (0u64..).zip(coeffs.coeffs()) {
            if c != 0 {
                let mut exps = key.to_vec();
                exps[var] = e;
                pairs.push((exps, c));
            }
        }
    }
    SparsePoly::from_pairs(ctx, pairs)
}

fn content(groups: &[(Exponents, Univariate)], field: FiniteField) -> Univariate {
    groups.iter().fold(DensePoly::zero(field), |g, (_, c)| g.gcd(c))
}

fn degree(groups: &[(Exponents, Univariate)]) -> usize {
    groups.iter().map(|(_, c)| c.degree()).max().unwrap_or(0)
}

/// Operands made primitive in `x_var`, with the data the interpolation
/// loop needs.
pub(super) struct Split {
    pub(super) var: usize,
    pub(super) a: Poly,
    pub(super) b: Poly,
    /// gcd of the contents of `a` and `b` in `F[x_var]`.
    content: Univariate,
    /// gcd of the leading coefficients in `F[x_var]`.
    gamma: Univariate,
    lc_a: Univariate,
    lc_b: Univariate,
    /// Degree bound of the scaled gcd in `x_var`.
    bound: usize,
}

impl Split {
    pub(super) fn new(a: &Poly, b: &Poly, var: usize) -> GcdResult<Self> {
        let field = *a.ring();
        let ctx = a.context();
        let primitive = |p: &Poly| -> GcdResult<(Univariate, Vec<(Exponents, Univariate)>)> {
            let groups = split_var(p, var);
            let cont = content(&groups, field);
            let groups = groups
                .into_iter()
                .map(|(k, c)| c.div_exact(&cont).map(|q| (k, q)))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| GcdFailure::Infeasible("content does not divide".into()))?;
            Ok((cont, groups))
        };
        let (cont_a, groups_a) = primitive(a)?;
        let (cont_b, groups_b) = primitive(b)?;
        let (Some((_, lc_a)), Some((_, lc_b))) = (groups_a.first(), groups_b.first()) else {
            return Err(GcdFailure::Infeasible("zero operand".into()));
        };
        let (lc_a, lc_b) = (lc_a.clone(), lc_b.clone());
        let gamma = lc_a.gcd(&lc_b);
        let bound = degree(&groups_a).min(degree(&groups_b)) + gamma.degree();
        Ok(Self {
            var,
            a: join_var(ctx, var, &groups_a)?,
            b: join_var(ctx, var, &groups_b)?,
            content: cont_a.gcd(&cont_b),
            gamma,
            lc_a,
            lc_b,
            bound,
        })
    }

    fn field(&self) -> FiniteField {
        *self.a.ring()
    }

    /// True if neither leading coefficient vanishes at `alpha`.
    pub(super) fn admits(&self, alpha: u64) -> bool {
        self.lc_a.eval(&alpha) != 0 && self.lc_b.eval(&alpha) != 0
    }

    /// The gcd when the primitive parts are coprime.
    pub(super) fn content_only(&self) -> GcdResult<Poly> {
        let zeros: Exponents = smallvec![0; self.a.nvars()];
        Ok(join_var(self.a.context(), self.var, &[(zeros, self.content.clone())])?.make_monic()?)
    }

    /// Primitive part of the interpolant, times the content, if it divides
    /// both operands.
    fn check(&self, interp: &Interpolant) -> GcdResult<Option<Poly>> {
        let groups: Vec<(Exponents, Univariate)> = interp.terms.iter().rev().map(|(k, c)| (k.clone(), c.clone())).collect();
        let cont = content(&groups, self.field());
        if cont.is_zero() {
            return Ok(None);
        }
        let Some(groups) = groups
            .into_iter()
            .map(|(k, c)| c.div_exact(&cont).map(|q| (k, q)))
            .collect::<Option<Vec<_>>>()
        else {
            return Ok(None);
        };
        let candidate = join_var(self.a.context(), self.var, &groups)?;
        if self.a.divides(&candidate)?.is_none() || self.b.divides(&candidate)?.is_none() {
            return Ok(None);
        }
        Ok(Some(candidate.mul(&self.content_only()?)?.make_monic()?))
    }
}

/// Newton interpolant in `x_var`, one dense polynomial per monomial of the
/// other variables.
pub(super) struct Interpolant {
    field: FiniteField,
    terms: BTreeMap<Exponents, Univariate>,
    modulus: Univariate,
}

impl Interpolant {
    pub(super) fn new(field: FiniteField) -> Self {
        Self {
            field,
            terms: BTreeMap::new(),
            modulus: DensePoly::one(field),
        }
    }

    pub(super) fn reset(&mut self) {
        self.terms.clear();
        self.modulus = DensePoly::one(self.field);
    }

    /// Number of points interpolated so far.
    pub(super) fn points(&self) -> usize {
        self.modulus.degree()
    }

    pub(super) fn lead(&self) -> Option<&Exponents> {
        self.terms.keys().next_back()
    }

    /// Adds the image at `x_var = alpha`. Returns false if the image agrees
    /// with the current interpolant.
    pub(super) fn update(&mut self, alpha: u64, image: &Poly) -> bool {
        let f = self.field;
        // Points are distinct, so M(alpha) is invertible.
        let Some(inv) = f.inv(&self.modulus.eval(&alpha)) else {
            return false;
        };
        let mut values: BTreeMap<Exponents, u64> = image.terms().map(|(e, &c)| (e, c)).collect();
        let mut deltas = Vec::new();
        for (key, h) in &self.terms {
            let g = values.remove(key).unwrap_or(0);
            let delta = f.mul(&f.sub(&g, &h.eval(&alpha)), &inv);
            if delta != 0 {
                deltas.push((key.clone(), delta));
            }
        }
        deltas.extend(values.into_iter().map(|(key, g)| (key, f.mul(&g, &inv))));

        let changed = !deltas.is_empty();
        for (key, delta) in deltas {
            let step = self.modulus.scale(&delta);
            let entry = self.terms.entry(key).or_insert_with(|| DensePoly::zero(f));
            *entry = entry.add(&step);
        }
        self.terms.retain(|_, p| !p.is_zero());
        self.modulus = self.modulus.mul(&DensePoly::linear_root(f, &alpha));
        changed
    }
}

/// Interpolates images until a candidate divides both operands.
///
/// `seeded` images are consumed before any new point is drawn. `image`
/// computes the monic gcd at `x_var = α` from a child seed.
pub(super) fn interpolate<F>(split: &Split, seed: u64, seeded: Vec<(u64, Poly)>, image: F) -> GcdResult<Poly>
where
    F: Fn(u64, u64) -> GcdResult<Poly> + Send + Sync,
{
    let ctx = split.a.context();
    let config = &ctx.config().gcd;
    let field = split.field();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut used: FxHashSet<u64> = seeded.iter().map(|(alpha, _)| *alpha).collect();
    let mut interp = Interpolant::new(field);
    let mut failures = 0usize;
    let mut pending: Vec<(u64, GcdResult<Poly>)> = seeded.into_iter().map(|(alpha, g)| (alpha, Ok(g))).collect();

    loop {
        if pending.is_empty() {
            let points = draw_points(&field, &mut rng, &mut used, config.batch_size.max(1), |alpha| {
                split.admits(alpha)
            });
            if points.is_empty() {
                return Err(GcdFailure::BadReduction);
            }
            pending = map_batch(ctx, points, |(alpha, child)| (alpha, image(alpha, child)));
        }

        for (alpha, result) in std::mem::take(&mut pending) {
            let g = match result {
                Ok(g) => g,
                Err(GcdFailure::BadReduction) => {
                    failures += 1;
                    if failures > config.max_retries {
                        return Err(GcdFailure::BadReduction);
                    }
                    continue;
                }
                Err(other) => return Err(other),
            };
            if g.is_constant() {
                return split.content_only();
            }

            let scaled = g.scale(&split.gamma.eval(&alpha));
            let lead = scaled.exponents(0);
            match interp.lead().map(|l| lead.cmp(l)) {
                Some(Ordering::Greater) => {
                    trace!(alpha, "unlucky evaluation point");
                    failures += 1;
                    if failures > config.max_retries {
                        return Err(GcdFailure::BadReduction);
                    }
                    continue;
                }
                Some(Ordering::Less) => {
                    trace!(alpha, "earlier points were unlucky");
                    interp.reset();
                }
                _ => {}
            }

            let changed = interp.update(alpha, &scaled);
            if !changed || interp.points() > split.bound {
                if let Some(found) = split.check(&interp)? {
                    trace!(points = interp.points(), "interpolation finished");
                    return Ok(found);
                }
                if interp.points() > split.bound {
                    failures += 1;
                    if failures > config.max_retries {
                        return Err(GcdFailure::BadReduction);
                    }
                    interp.reset();
                }
            }
        }
    }
}

fn univariate(a: &Poly, b: &Poly, var: usize) -> GcdResult<Poly> {
    let field = *a.ring();
    let dense = |p: &Poly| {
        split_var(p, var)
            .into_iter()
            .next()
            .map_or_else(|| DensePoly::zero(field), |(_, c)| c)
    };
    let zeros: Exponents = smallvec![0; a.nvars()];
    Ok(join_var(a.context(), var, &[(zeros, dense(a).gcd(&dense(b)))])?)
}

/// Monic gcd of `a` and `b`.
pub(super) fn gcd(a: &Poly, b: &Poly, seed: u64) -> GcdResult<Poly> {
    if a.is_zero() || b.is_zero() {
        let g = if a.is_zero() { b } else { a };
        return Ok(g.make_monic()?);
    }
    if a.is_constant() || b.is_constant() {
        return Ok(SparsePoly::one(a.context()));
    }
    let active = active_vars(a, b);
    let Some(&var) = active.last() else {
        return Ok(SparsePoly::one(a.context()));
    };
    if active.len() == 1 {
        return univariate(a, b, var);
    }

    let split = Split::new(a, b, var)?;
    interpolate(&split, seed, Vec::new(), |alpha, child| {
        let ea = split.a.evaluate_one(var, &alpha)?;
        let eb = split.b.evaluate_one(var, &alpha)?;
        gcd(&ea, &eb, child)
    })
}
