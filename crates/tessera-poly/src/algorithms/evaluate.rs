//! Evaluation and substitution.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tessera_rings::Ring;

use super::merge;
use crate::error::{PolyError, Result};
use crate::monomial::Exponents;
use crate::sparse::SparsePoly;

/// Memoized powers of one ring element.
struct PowerCache<'r, R: Ring> {
    ring: &'r R,
    base: R::Element,
    powers: FxHashMap<u64, R::Element>,
}

impl<'r, R: Ring> PowerCache<'r, R> {
    fn new(ring: &'r R, base: R::Element) -> Self {
        Self {
            ring,
            base,
            powers: FxHashMap::default(),
        }
    }

    fn get(&mut self, e: u64) -> &R::Element {
        let (ring, base) = (self.ring, &self.base);
        self.powers.entry(e).or_insert_with(|| ring.pow(base, e))
    }
}

fn check_var<R: Ring>(poly: &SparsePoly<R>, var: usize) -> Result<()> {
    if var < poly.nvars() {
        Ok(())
    } else {
        Err(PolyError::DimensionMismatch(format!(
            "variable x{var} in a ring of {} variables",
            poly.nvars()
        )))
    }
}

/// Sets `x_var = value`, keeping the variable with exponent zero.
///
/// # Errors
///
/// Returns [`PolyError::DimensionMismatch`] if `var` is out of range.
pub fn evaluate_one<R: Ring>(poly: &SparsePoly<R>, var: usize, value: &R::Element) -> Result<SparsePoly<R>> {
    check_var(poly, var)?;
    let layout = poly.layout();
    let ring = poly.ring();
    let words = layout.words();
    let mut cache = PowerCache::new(ring, value.clone());

    let mut exps = Vec::with_capacity(poly.packed_exps().len());
    let mut coeffs = Vec::with_capacity(poly.term_count());
    for (packed, c) in poly.packed_exps().chunks_exact(words).zip(poly.coefficients()) {
        let e = layout.exponent(packed, var);
        let y = if e == 0 { c.clone() } else { ring.mul(c, cache.get(e)) };
        if ring.is_zero(&y) {
            continue;
        }
        let mut unpacked = layout.unpack(packed);
        unpacked[var] = 0;
        let start = exps.len();
        exps.resize(start + words, 0);
        layout.pack_into(&unpacked, &mut exps[start..])?;
        coeffs.push(y);
    }

    merge::radix_sort(layout, &mut exps, &mut coeffs);
    merge::combine_like_terms(layout, ring, &mut exps, &mut coeffs);
    Ok(SparsePoly::from_parts(Arc::clone(poly.context()), poly.bits(), exps, coeffs).fit_bits())
}

/// Evaluates at a point with one value per variable.
///
/// # Errors
///
/// Returns [`PolyError::DimensionMismatch`] if `point` has the wrong
/// length.
pub fn evaluate_all<R: Ring>(poly: &SparsePoly<R>, point: &[R::Element]) -> Result<R::Element> {
    if point.len() != poly.nvars() {
        return Err(PolyError::DimensionMismatch(format!(
            "point of length {} for {} variables",
            point.len(),
            poly.nvars()
        )));
    }
    let layout = poly.layout();
    let ring = poly.ring();
    let mut caches: Vec<PowerCache<'_, R>> = point.iter().map(|v| PowerCache::new(ring, v.clone())).collect();

    let mut acc = ring.accumulator();
    for (packed, c) in poly.packed_exps().chunks_exact(layout.words()).zip(poly.coefficients()) {
        let mut m = ring.one();
        for (var, cache) in caches.iter_mut().enumerate() {
            let e = layout.exponent(packed, var);
            if e > 0 {
                m = ring.mul(&m, cache.get(e));
            }
        }
        ring.accumulate(&mut acc, c, &m);
    }
    Ok(ring.finish(acc))
}

/// Replaces `x_var` by the polynomial `value`.
///
/// Terms are grouped by their exponent in `x_var`; the groups are combined
/// in increasing exponent order so each power of `value` is one
/// multiplication away from the previous one.
///
/// # Errors
///
/// Returns [`PolyError::DimensionMismatch`] for a bad variable or
/// incompatible contexts, and [`PolyError::ExponentOverflow`] if the result
/// does not fit.
pub fn substitute<R: Ring>(poly: &SparsePoly<R>, var: usize, value: &SparsePoly<R>) -> Result<SparsePoly<R>> {
    check_var(poly, var)?;
    poly.check_compatible(value)?;
    let ctx = poly.context();

    let mut groups: BTreeMap<u64, (Vec<Exponents>, Vec<R::Element>)> = BTreeMap::new();
    for (mut exps, c) in poly.terms() {
        let e = std::mem::take(&mut exps[var]);
        let group = groups.entry(e).or_default();
        group.0.push(exps);
        group.1.push(c.clone());
    }

    let mut result = SparsePoly::new(ctx);
    let mut power = SparsePoly::one(ctx);
    let mut at = 0u64;
    for (e, (exps, coeffs)) in groups {
        if e > at {
            power = power.mul(&value.pow(e - at)?)?;
            at = e;
        }
        let part = SparsePoly::from_terms(ctx, &exps, coeffs)?;
        result = result.add(&part.mul(&power)?)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::ordering::MonomialOrder;
    use tessera_integers::Integer;
    use tessera_rings::{FiniteField, Z};

    fn zpoly(ctx: &Arc<Context<Z>>, terms: &[(&[u64], i64)]) -> SparsePoly<Z> {
        SparsePoly::from_pairs(ctx, terms.iter().map(|(e, c)| (e.to_vec(), Integer::new(*c)))).unwrap()
    }

    #[test]
    fn test_evaluate_one() {
        for order in [MonomialOrder::Lex, MonomialOrder::DegRevLex] {
            let ctx = Context::new(2, order, Z);
            // x^2*y + 3*y - x*y^2 at x = 2 gives 7y - 2y^2
            let p = zpoly(&ctx, &[(&[2, 1], 1), (&[0, 1], 3), (&[1, 2], -1)]);
            let at = p.evaluate_one(0, &Integer::new(2)).unwrap();
            assert_eq!(at, zpoly(&ctx, &[(&[0, 1], 7), (&[0, 2], -2)]));
            assert!(p.evaluate_one(2, &Integer::new(0)).is_err());
        }
    }

    #[test]
    fn test_evaluate_one_cancels() {
        let ctx = Context::new(2, MonomialOrder::DegLex, FiniteField::new(5));
        // x*y + 4*y vanishes at x = 1
        let p = SparsePoly::from_pairs(&ctx, [(vec![1, 1], 1), (vec![0, 1], 4)]).unwrap();
        assert!(p.evaluate_one(0, &1).unwrap().is_zero());
    }

    #[test]
    fn test_evaluate_all() {
        let ctx = Context::new(3, MonomialOrder::Lex, Z);
        let p = zpoly(&ctx, &[(&[2, 0, 1], 1), (&[0, 3, 0], -2), (&[0, 0, 0], 5)]);
        let v = p.evaluate_all(&[Integer::new(3), Integer::new(-1), Integer::new(2)]).unwrap();
        // 9*2 + 2 + 5
        assert_eq!(v, Integer::new(25));
        assert!(p.evaluate_all(&[Integer::new(1)]).is_err());
    }

    #[test]
    fn test_substitute() {
        let ctx = Context::new(2, MonomialOrder::DegRevLex, Z);
        // x^2 + x*y with x -> y + 1 gives 2y^2 + 3y + 1
        let p = zpoly(&ctx, &[(&[2, 0], 1), (&[1, 1], 1)]);
        let value = zpoly(&ctx, &[(&[0, 1], 1), (&[0, 0], 1)]);
        let s = p.substitute(0, &value).unwrap();
        assert_eq!(s, zpoly(&ctx, &[(&[0, 2], 2), (&[0, 1], 3), (&[0, 0], 1)]));

        let other = Context::new(3, MonomialOrder::DegRevLex, Z);
        assert!(p.substitute(0, &SparsePoly::one(&other)).is_err());
    }
}
