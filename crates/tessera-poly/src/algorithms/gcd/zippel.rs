//! Zippel's sparse interpolation over prime fields.
//!
//! One dense image (from Brown) fixes the support of the gcd. Later images
//! reuse that support: the middle variables are evaluated at powers of a
//! random point, and the unknown coefficients of each `x_main` degree come
//! out of a transposed Vandermonde system. The images are then combined in
//! `x_k` by the same interpolation loop as Brown's.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use tessera_rings::{Field, FiniteField, Ring};
use tracing::trace;

use super::brown::{self, interpolate, Poly, Split, Univariate};
use super::{active_vars, draw_points, linsolve, GcdFailure, GcdResult};
use crate::dense::DensePoly;
use crate::monomial::Exponents;
use crate::sparse::SparsePoly;

/// Value of the monomial `exps` at `point`, skipping `main`.
fn monomial_value(field: FiniteField, point: &[u64], exps: &[u64], main: usize) -> u64 {
    exps.iter()
        .zip(point)
        .enumerate()
        .filter(|&(v, (&e, _))| v != main && e > 0)
        .fold(1, |acc, (_, (&e, x))| field.mul(&acc, &field.pow(x, e)))
}

/// Evaluates a polynomial at `β, β^2, ...` in every variable but `x_main`.
struct Powers {
    field: FiniteField,
    degree: usize,
    /// `(degree in x_main, monomial value at β)`
    terms: Vec<(usize, u64)>,
    current: Vec<u64>,
}

impl Powers {
    fn new(poly: &Poly, main: usize, beta: &[u64]) -> Self {
        let field = *poly.ring();
        let mut terms = Vec::with_capacity(poly.term_count());
        let mut current = Vec::with_capacity(poly.term_count());
        for (exps, &c) in poly.terms() {
            let d = usize::try_from(exps[main]).unwrap_or(usize::MAX);
            terms.push((d, monomial_value(field, beta, &exps, main)));
            current.push(c);
        }
        let degree = terms.iter().map(|&(d, _)| d).max().unwrap_or(0);
        Self {
            field,
            degree,
            terms,
            current,
        }
    }

    /// The next power of the point.
    fn next_image(&mut self) -> Univariate {
        let f = self.field;
        let mut coeffs = vec![0; self.degree + 1];
        for (&(d, v), cur) in self.terms.iter().zip(&mut self.current) {
            *cur = f.mul(cur, &v);
            coeffs[d] = f.add(&coeffs[d], cur);
        }
        DensePoly::new(f, coeffs)
    }
}

/// Support of a gcd image, grouped by degree in `x_main`.
struct Skeleton {
    main: usize,
    /// `(degree in x_main, monomials without x_main)`, highest degree first.
    groups: Vec<(usize, Vec<Exponents>)>,
    /// The single monomial of the leading group.
    lead: Exponents,
    /// Equations per system, one more than the largest group.
    rows: usize,
}

impl Skeleton {
    fn new(image: &Poly, main: usize) -> GcdResult<Self> {
        let mut groups: BTreeMap<usize, Vec<Exponents>> = BTreeMap::new();
        for (mut exps, _) in image.terms() {
            let d = usize::try_from(std::mem::take(&mut exps[main])).unwrap_or(usize::MAX);
            groups.entry(d).or_default().push(exps);
        }
        let groups: Vec<(usize, Vec<Exponents>)> = groups.into_iter().rev().collect();
        let lead = match groups.first() {
            Some((_, monomials)) if monomials.len() == 1 => monomials[0].clone(),
            _ => {
                return Err(GcdFailure::Infeasible(
                    "leading coefficient in the main variable is not a monomial".into(),
                ))
            }
        };
        let rows = groups.iter().map(|(_, m)| m.len()).max().unwrap_or(0) + 1;
        Ok(Self {
            main,
            groups,
            lead,
            rows,
        })
    }

    fn degree(&self) -> usize {
        self.groups.first().map_or(0, |(d, _)| *d)
    }

    /// Monic gcd image at `x_var = alpha` with this support.
    fn image(&self, split: &Split, alpha: u64, seed: u64) -> GcdResult<Poly> {
        let field = *split.a.ring();
        let ea = split.a.evaluate_one(split.var, &alpha)?;
        let eb = split.b.evaluate_one(split.var, &alpha)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let beta: Vec<u64> = (0..ea.nvars())
            .map(|_| field.element(rng.gen_range(1..field.order())))
            .collect();

        let mut pa = Powers::new(&ea, self.main, &beta);
        let mut pb = Powers::new(&eb, self.main, &beta);
        let (da, db) = (pa.degree, pb.degree);
        let lead = monomial_value(field, &beta, &self.lead, self.main);
        let mut scale = 1;
        let mut images = Vec::with_capacity(self.rows);
        for _ in 0..self.rows {
            let (ua, ub) = (pa.next_image(), pb.next_image());
            if ua.degree() != da || ub.degree() != db {
                return Err(GcdFailure::BadReduction);
            }
            let g = ua.gcd(&ub);
            if g.degree() != self.degree() {
                return Err(GcdFailure::BadReduction);
            }
            scale = field.mul(&scale, &lead);
            images.push(g.scale(&scale));
        }

        // Degrees outside the support must vanish.
        let mut support = vec![false; self.degree() + 1];
        for (d, _) in &self.groups {
            support[*d] = true;
        }
        let stray = (0..=self.degree()).any(|d| !support[d] && images.iter().any(|g| g.coeff(d) != 0));
        if stray {
            return Err(GcdFailure::BadReduction);
        }

        let mut pairs = Vec::new();
        for (d, monomials) in &self.groups {
            let nodes: Vec<u64> = monomials
                .iter()
                .map(|m| monomial_value(field, &beta, m, self.main))
                .collect();
            let mut row = nodes.clone();
            let mut matrix = Vec::with_capacity(self.rows);
            let mut rhs = Vec::with_capacity(self.rows);
            for g in &images {
                matrix.push(row.clone());
                rhs.push(g.coeff(*d));
                for (r, v) in row.iter_mut().zip(&nodes) {
                    *r = field.mul(r, v);
                }
            }
            let coeffs = linsolve::solve(&field, &matrix, &rhs).ok_or(GcdFailure::BadReduction)?;
            for (m, c) in monomials.iter().zip(coeffs) {
                let mut exps = m.to_vec();
                exps[self.main] = *d as u64;
                pairs.push((exps, c));
            }
        }
        Ok(SparsePoly::from_pairs(ea.context(), pairs)?)
    }
}

/// Monic gcd of `a` and `b`; falls back to Brown below three variables.
pub(super) fn gcd(a: &Poly, b: &Poly, seed: u64) -> GcdResult<Poly> {
    let active = active_vars(a, b);
    if active.len() <= 2 || a.is_constant() || b.is_constant() {
        return brown::gcd(a, b, seed);
    }
    let (main, var) = (active[0], active[active.len() - 1]);
    let split = Split::new(a, b, var)?;
    let field = *a.ring();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut used = FxHashSet::default();
    let Some(&(alpha, child)) = draw_points(&field, &mut rng, &mut used, 1, |x| split.admits(x)).first() else {
        return Err(GcdFailure::BadReduction);
    };
    let first = brown::gcd(
        &split.a.evaluate_one(var, &alpha)?,
        &split.b.evaluate_one(var, &alpha)?,
        child,
    )?;
    if first.is_constant() {
        return split.content_only();
    }
    let skeleton = Skeleton::new(&first, main)?;
    trace!(terms = first.term_count(), rows = skeleton.rows, "sparse skeleton");

    interpolate(&split, rng.gen(), vec![(alpha, first)], |alpha, child| {
        skeleton.image(&split, alpha, child)
    })
}
