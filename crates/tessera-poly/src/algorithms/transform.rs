//! Exponent transforms and reordering.

use std::sync::Arc;

use smallvec::smallvec;
use tessera_integers::modular::gcd_u64;
use tessera_rings::Ring;

use crate::context::Context;
use crate::error::{PolyError, Result};
use crate::monomial::Exponents;
use crate::sparse::SparsePoly;

fn check_len(what: &str, len: usize, nvars: usize) -> Result<()> {
    if len == nvars {
        Ok(())
    } else {
        Err(PolyError::DimensionMismatch(format!("{what} of length {len} for {nvars} variables")))
    }
}

fn rebuild<R: Ring>(poly: &SparsePoly<R>, map: impl Fn(&mut Exponents) -> Result<()>) -> Result<SparsePoly<R>> {
    let mut exps = Vec::with_capacity(poly.term_count());
    let mut coeffs = Vec::with_capacity(poly.term_count());
    for (mut e, c) in poly.terms() {
        map(&mut e)?;
        exps.push(e);
        coeffs.push(c.clone());
    }
    SparsePoly::from_terms(poly.context(), &exps, coeffs)
}

/// Maps every exponent `e_i` to `shift_i + stride_i * e_i`.
///
/// # Errors
///
/// Returns [`PolyError::DimensionMismatch`] for wrong-length vectors and
/// [`PolyError::ExponentOverflow`] if an exponent does not fit.
pub fn inflate<R: Ring>(poly: &SparsePoly<R>, shift: &[u64], stride: &[u64]) -> Result<SparsePoly<R>> {
    check_len("shift", shift.len(), poly.nvars())?;
    check_len("stride", stride.len(), poly.nvars())?;
    rebuild(poly, |e| {
        for ((x, &s), &k) in e.iter_mut().zip(shift).zip(stride) {
            *x = x
                .checked_mul(k)
                .and_then(|y| y.checked_add(s))
                .ok_or(PolyError::ExponentOverflow)?;
        }
        Ok(())
    })
}

/// Maps every exponent `e_i` to `(e_i - shift_i) / stride_i`, or to 0
/// where `stride_i` is 0.
///
/// # Errors
///
/// Returns [`PolyError::DimensionMismatch`] for wrong-length vectors and
/// [`PolyError::InvalidTransform`] if an exponent is not
/// `shift_i + k * stride_i` for some `k`.
pub fn deflate<R: Ring>(poly: &SparsePoly<R>, shift: &[u64], stride: &[u64]) -> Result<SparsePoly<R>> {
    check_len("shift", shift.len(), poly.nvars())?;
    check_len("stride", stride.len(), poly.nvars())?;
    rebuild(poly, |e| {
        for (var, ((x, &s), &k)) in e.iter_mut().zip(shift).zip(stride).enumerate() {
            let value = *x;
            *x = match (value.checked_sub(s), k) {
                (Some(0), 0) => 0,
                (Some(d), k) if k > 0 && d % k == 0 => d / k,
                _ => {
                    return Err(PolyError::InvalidTransform(format!(
                        "exponent {value} of x{var} is not {s} + k*{k}"
                    )))
                }
            };
        }
        Ok(())
    })
}

/// The largest `(shift, stride)` for which [`deflate`] applies.
///
/// `shift` is the monomial gcd; `stride_i` is the gcd of the differences
/// `e_i - shift_i`, zero when `x_i` has a single exponent.
#[must_use]
pub fn deflation<R: Ring>(poly: &SparsePoly<R>) -> (Exponents, Exponents) {
    let shift = poly.monomial_content();
    let mut stride: Exponents = smallvec![0; poly.nvars()];
    for (e, _) in poly.terms() {
        for ((g, &x), &s) in stride.iter_mut().zip(&e).zip(&shift) {
            *g = gcd_u64(*g, x - s);
        }
    }
    (shift, stride)
}

/// Re-expresses `poly` under another context with the same variables and
/// ring.
///
/// # Errors
///
/// Returns [`PolyError::DimensionMismatch`] if the variable counts or the
/// rings differ.
pub fn to_context<R: Ring>(poly: &SparsePoly<R>, ctx: &Arc<Context<R>>) -> Result<SparsePoly<R>> {
    if ctx.nvars() != poly.nvars() || ctx.ring() != poly.ring() {
        return Err(PolyError::DimensionMismatch(format!(
            "cannot move {:?} polynomial into {ctx:?}",
            poly.context()
        )));
    }
    if Arc::ptr_eq(ctx, poly.context()) {
        return Ok(poly.clone());
    }
    let (exps, coeffs): (Vec<Exponents>, Vec<R::Element>) = poly.terms().map(|(e, c)| (e, c.clone())).unzip();
    SparsePoly::from_terms(ctx, &exps, coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::MonomialOrder;
    use tessera_integers::Integer;
    use tessera_rings::Z;

    fn zpoly(ctx: &Arc<Context<Z>>, terms: &[(&[u64], i64)]) -> SparsePoly<Z> {
        SparsePoly::from_pairs(ctx, terms.iter().map(|(e, c)| (e.to_vec(), Integer::new(*c)))).unwrap()
    }

    #[test]
    fn test_inflate_deflate() {
        let ctx = Context::new(2, MonomialOrder::DegLex, Z);
        let p = zpoly(&ctx, &[(&[2, 1], 3), (&[0, 1], -1), (&[1, 0], 2)]);
        let inflated = p.inflate(&[1, 0], &[3, 2]).unwrap();
        assert_eq!(inflated, zpoly(&ctx, &[(&[7, 2], 3), (&[1, 2], -1), (&[4, 0], 2)]));

        let (shift, stride) = inflated.deflation();
        assert_eq!(shift.as_slice(), &[1, 0]);
        assert_eq!(stride.as_slice(), &[3, 2]);
        assert_eq!(inflated.deflate(&shift, &stride).unwrap(), p);
    }

    #[test]
    fn test_deflate_rejects_mismatch() {
        let ctx = Context::new(2, MonomialOrder::Lex, Z);
        let p = zpoly(&ctx, &[(&[4, 1], 1), (&[1, 1], 1)]);
        assert!(matches!(p.deflate(&[0, 0], &[2, 1]), Err(PolyError::InvalidTransform(_))));
        assert!(matches!(p.deflate(&[2, 0], &[1, 1]), Err(PolyError::InvalidTransform(_))));
        assert!(matches!(p.deflate(&[0], &[1]), Err(PolyError::DimensionMismatch(_))));

        // a variable with one exponent deflates with stride zero
        let (shift, stride) = p.deflation();
        assert_eq!(shift.as_slice(), &[1, 1]);
        assert_eq!(stride.as_slice(), &[3, 0]);
        assert_eq!(p.deflate(&shift, &stride).unwrap(), zpoly(&ctx, &[(&[1, 0], 1), (&[0, 0], 1)]));
    }

    #[test]
    fn test_inflate_overflow() {
        let ctx = Context::new(1, MonomialOrder::Lex, Z);
        let p = zpoly(&ctx, &[(&[1 << 40], 1)]);
        assert_eq!(p.inflate(&[0], &[1 << 30]), Err(PolyError::ExponentOverflow));
    }

    #[test]
    fn test_to_context() {
        let lex = Context::new(3, MonomialOrder::Lex, Z);
        let p = zpoly(&lex, &[(&[1, 0, 0], 1), (&[0, 2, 0], 1), (&[0, 0, 3], 1)]);
        let revlex = lex.with_order(MonomialOrder::DegRevLex);
        let q = p.to_context(&revlex).unwrap();
        assert_eq!(q.exponents(0).as_slice(), &[0, 0, 3]);
        assert_eq!(q.to_context(&lex).unwrap(), p);

        let wide = Context::new(4, MonomialOrder::Lex, Z);
        assert!(p.to_context(&wide).is_err());
    }
}
