//! Heap-based division.
//!
//! The quotient is built one term at a time. The current remainder term
//! is the larger of the next dividend term and the top of a heap holding
//! the pending products `-q_k * b_j`; the heap is keyed by exponent and
//! chains equal exponents, one node per quotient term.
//!
//! Over the integers and over prime fields every quotient exponent of an
//! exact division is bounded field-wise by the dividend's maxima, so the
//! working width is fixed up front from `max(A) + max(B)`. Over rings with
//! zero divisors that bound does not hold; the division is retried at the
//! next width whenever a product sets a guard bit.
//!
//! The threaded entry point instead starts from the width implied by a
//! sample of the dividend: each sampled exponent minus the divisor's leading
//! exponent is a candidate quotient exponent, and the candidates times the
//! divisor must fit.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use smallvec::smallvec;
use tessera_rings::{Ring, RingKind};
use tracing::{debug, trace};

use super::heap::{ChainHeap, ChainNode};
use crate::error::{PolyError, Result};
use crate::monomial::{bits_for_sum, Exponents, Packed, FIELD_WIDTHS};
use crate::sparse::SparsePoly;

/// Terms of the dividend sampled by the monomial-content probe.
const PROBE_SAMPLES: usize = 8;

/// Random points tried by the evaluation probe.
const PROBE_POINTS: usize = 2;

/// Picks up to `count` term exponents, in decreasing order.
///
/// Positions follow the smoothstep curve `3t^2 - 2t^3`, which crowds the
/// samples toward both ends of the term list.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn select_exps<R: Ring>(poly: &SparsePoly<R>, count: usize) -> Vec<Packed> {
    let n = poly.term_count();
    if n == 0 || count == 0 {
        return Vec::new();
    }
    if count == 1 || n == 1 {
        return vec![Packed::from_slice(poly.packed(0))];
    }

    let last = (n - 1) as f64;
    let mut picks: Vec<usize> = (0..count)
        .map(|k| {
            let t = k as f64 / (count - 1) as f64;
            let s = t * t * (3.0 - 2.0 * t);
            let idx = (s * last).round() as usize;
            idx.min(n - 1)
        })
        .collect();
    picks.dedup();
    picks.into_iter().map(|i| Packed::from_slice(poly.packed(i))).collect()
}

enum Outcome<E> {
    Done {
        quotient: (Vec<u64>, Vec<E>),
        remainder: (Vec<u64>, Vec<E>),
    },
    NotExact,
    Overflow,
}

fn next_width(bits: u32) -> Option<u32> {
    FIELD_WIDTHS.iter().copied().find(|&b| b > bits)
}

fn is_domain<R: Ring>(ring: &R) -> bool {
    matches!(ring.kind(), RingKind::Integer | RingKind::FiniteField)
}

/// Width that holds every product of an exact division over a domain.
fn operand_width<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>) -> u32 {
    bits_for_sum(&a.max_fields(), &b.max_fields())
        .unwrap_or(64)
        .max(a.bits())
        .max(b.bits())
}

/// Width to start a threaded division at, from sampled quotient exponents.
///
/// `a` and `b` must share a width. Returns `None` when the leading
/// exponent of `a` is not divisible by the leading exponent of `b`, in
/// which case no quotient exists.
fn sampled_width<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>) -> Option<u32> {
    let layout = a.layout();
    let lead_b: Exponents = (0..layout.field_count()).map(|f| layout.field(b.packed(0), f)).collect();
    let mut range: Exponents = smallvec![0; lead_b.len()];
    // the first sample is the leading term of `a`
    for (k, e) in select_exps(a, PROBE_SAMPLES).iter().enumerate() {
        for (field, (r, &lb)) in range.iter_mut().zip(&lead_b).enumerate() {
            match layout.field(e, field).checked_sub(lb) {
                Some(d) => *r = (*r).max(d),
                None if k == 0 => return None,
                None => {}
            }
        }
    }

    let current = a.bits().max(b.bits());
    let width = match bits_for_sum(&range, &b.max_fields()) {
        Ok(needed) if needed <= current => current,
        Ok(needed) => needed,
        Err(_) => FIELD_WIDTHS[FIELD_WIDTHS.len() - 1],
    };
    if width > current {
        trace!(from = current, to = width, "sampled quotient exponents need a wider packing");
    }
    Some(width)
}

/// Runs the division from width `bits`, widening on overflow.
fn divide_widening<R: Ring>(
    a: &SparsePoly<R>,
    b: &SparsePoly<R>,
    exact: bool,
    mut bits: u32,
) -> Result<Option<(SparsePoly<R>, SparsePoly<R>)>> {
    let ctx = a.context();
    loop {
        let da = a.at_bits(bits)?;
        let db = b.at_bits(bits)?;
        match heap_divide(&da, &db, exact) {
            Outcome::Done { quotient, remainder } => {
                let q = SparsePoly::from_parts(Arc::clone(ctx), bits, quotient.0, quotient.1);
                let r = SparsePoly::from_parts(Arc::clone(ctx), bits, remainder.0, remainder.1);
                return Ok(Some((q, r)));
            }
            Outcome::NotExact => return Ok(None),
            Outcome::Overflow => {
                let Some(wider) = next_width(bits) else {
                    return Err(PolyError::ExponentOverflow);
                };
                trace!(from = bits, to = wider, "division overflowed, widening");
                bits = wider;
            }
        }
    }
}

/// Exact division by the heap method.
///
/// Both operands must share a compatible context and `b` must be non-zero
/// with a leading coefficient that is a unit, or any non-zero integer.
///
/// # Errors
///
/// Returns [`PolyError::ExponentOverflow`] if the working exponents need
/// more than the widest packing.
pub fn divides_heap<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>) -> Result<Option<SparsePoly<R>>> {
    Ok(divide_widening(a, b, true, operand_width(a, b))?.map(|(q, _)| q))
}

/// Division with remainder by the heap method.
///
/// # Errors
///
/// Returns [`PolyError::ExponentOverflow`] if the working exponents need
/// more than the widest packing.
pub fn div_rem_heap<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>) -> Result<(SparsePoly<R>, SparsePoly<R>)> {
    match divide_widening(a, b, false, operand_width(a, b))? {
        Some(qr) => Ok(qr),
        // only exact division stops early
        None => Err(PolyError::ExponentOverflow),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::too_many_lines)]
fn heap_divide<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>, exact: bool) -> Outcome<R::Element> {
    let layout = a.layout();
    let ring = a.ring();
    let words = layout.words();
    let (ac, bc) = (a.coefficients(), b.coefficients());
    let (na, nb) = (a.term_count(), b.term_count());

    let one = ring.one();
    let neg_b: Vec<R::Element> = bc.iter().map(|c| ring.neg(c)).collect();
    let lm_b = b.packed(0);
    let lc_b = &bc[0];
    let lc_inv = ring.inv(lc_b);
    let bound: Option<Exponents> = (exact && is_domain(ring)).then(|| a.max_fields());

    let mut q_exps: Vec<u64> = Vec::new();
    let mut q_coeffs: Vec<R::Element> = Vec::new();
    let mut r_exps: Vec<u64> = Vec::new();
    let mut r_coeffs: Vec<R::Element> = Vec::new();

    let mut nodes: Vec<ChainNode> = Vec::new();
    let mut heap = ChainHeap::new(layout, na.min(64));
    let mut rows: Vec<u32> = Vec::new();
    let mut q_exp: Packed = smallvec![0; words];
    let mut i = 0usize;

    loop {
        let next_a = (i < na).then(|| a.packed(i));
        let exp: Packed = match (next_a, heap.peek()) {
            (None, None) => break,
            (Some(ea), None) => Packed::from_slice(ea),
            (None, Some(top)) => Packed::from_slice(top),
            (Some(ea), Some(top)) => {
                if layout.compare(ea, top).is_ge() {
                    Packed::from_slice(ea)
                } else {
                    Packed::from_slice(top)
                }
            }
        };

        let mut acc = ring.accumulator();
        if next_a.is_some_and(|ea| ea == exp.as_slice()) {
            ring.accumulate(&mut acc, &ac[i], &one);
            i += 1;
        }

        rows.clear();
        heap.drain_matching(&exp, &nodes, &mut rows);
        for &k in &rows {
            let j = nodes[k as usize].j as usize;
            ring.accumulate(&mut acc, &q_coeffs[k as usize], &neg_b[j]);
        }
        for &k in &rows {
            let j = nodes[k as usize].j as usize + 1;
            if j < nb {
                nodes[k as usize].j = j as u32;
                let mut prod: Packed = smallvec![0; words];
                let qk = &q_exps[k as usize * words..(k as usize + 1) * words];
                layout.add(qk, b.packed(j), &mut prod);
                if layout.overflowed(&prod) {
                    return Outcome::Overflow;
                }
                heap.push(prod, k, &mut nodes);
            }
        }

        let c = ring.finish(acc);
        if ring.is_zero(&c) {
            continue;
        }

        let divisible = layout.divides(&exp, lm_b, &mut q_exp);
        let coeff = if divisible {
            match &lc_inv {
                Some(inv) => Some(ring.mul(&c, inv)),
                None => ring.div_exact(&c, lc_b),
            }
        } else {
            None
        };

        let Some(coeff) = coeff else {
            if exact {
                return Outcome::NotExact;
            }
            r_exps.extend_from_slice(&exp);
            r_coeffs.push(c);
            continue;
        };

        if let Some(bound) = &bound {
            if (0..layout.field_count()).any(|f| layout.field(&q_exp, f) > bound[f]) {
                return Outcome::NotExact;
            }
        }

        let k = q_coeffs.len() as u32;
        q_exps.extend_from_slice(&q_exp);
        q_coeffs.push(coeff);
        nodes.push(ChainNode { j: 1, next: None });
        if nb > 1 {
            let mut prod: Packed = smallvec![0; words];
            layout.add(&q_exp, b.packed(1), &mut prod);
            if layout.overflowed(&prod) {
                return Outcome::Overflow;
            }
            heap.push(prod, k, &mut nodes);
        }
    }

    Outcome::Done {
        quotient: (q_exps, q_coeffs),
        remainder: (r_exps, r_coeffs),
    }
}

/// A cheap necessary condition for `b | a`.
#[derive(Clone, Copy, Debug)]
enum Probe {
    TrailingMonomial,
    Degrees,
    MonomialContent,
    IntegerCoefficients,
    Evaluation(u64),
}

fn run_probe<R: Ring>(probe: Probe, a: &SparsePoly<R>, b: &SparsePoly<R>) -> bool {
    let layout = a.layout();
    let mut out: Packed = smallvec![0; layout.words()];
    let last = |p: &SparsePoly<R>| p.term_count() - 1;
    match probe {
        Probe::TrailingMonomial => layout.divides(a.packed(last(a)), b.packed(last(b)), &mut out),
        Probe::Degrees => match (a.degrees(), b.degrees()) {
            (Some(da), Some(db)) => {
                da.iter().zip(&db).all(|(x, y)| x >= y) && a.total_degree() >= b.total_degree()
            }
            _ => true,
        },
        Probe::MonomialContent => {
            let content = b.monomial_content();
            select_exps(a, PROBE_SAMPLES)
                .iter()
                .all(|e| layout.unpack(e).iter().zip(&content).all(|(x, m)| x >= m))
        }
        Probe::IntegerCoefficients => {
            let ring = a.ring();
            let (ac, bc) = (a.coefficients(), b.coefficients());
            ring.div_exact(&ac[0], &bc[0]).is_some()
                && ring.div_exact(&ac[last(a)], &bc[last(b)]).is_some()
        }
        Probe::Evaluation(seed) => {
            let ring = a.ring();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let point: Vec<R::Element> = (0..a.nvars()).map(|_| ring.from_i64(rng.gen_range(-8..=8))).collect();
            let (Ok(va), Ok(vb)) = (a.evaluate_all(&point), b.evaluate_all(&point)) else {
                return true;
            };
            if ring.is_zero(&vb) {
                ring.is_zero(&va)
            } else {
                ring.div_exact(&va, &vb).is_some()
            }
        }
    }
}

/// Exact division preceded by early-rejection probes run in parallel.
///
/// The probes only test necessary conditions, so a pair they pass still
/// goes through the full division.
///
/// # Errors
///
/// As for [`divides_heap`].
pub fn divides_threaded<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>) -> Result<Option<SparsePoly<R>>> {
    if a.is_zero() {
        return Ok(Some(SparsePoly::new(a.context())));
    }
    let bits = a.bits().max(b.bits());
    let da = a.at_bits(bits)?;
    let db = b.at_bits(bits)?;

    let ring = a.ring();
    let Some(width) = sampled_width(&da, &db) else {
        debug!(terms_a = a.term_count(), terms_b = b.term_count(), "leading exponents rule out division");
        return Ok(None);
    };

    let mut probes = vec![Probe::MonomialContent];
    if is_domain(ring) {
        probes.extend([Probe::TrailingMonomial, Probe::Degrees]);
    }
    if ring.kind() == RingKind::Integer {
        probes.push(Probe::IntegerCoefficients);
    }
    let seed = a.context().config().gcd.seed;
    probes.extend((0..PROBE_POINTS as u64).map(|k| Probe::Evaluation(seed.wrapping_add(k))));

    let rejected = probes.par_iter().find_any(|&&p| !run_probe(p, &da, &db));
    if let Some(probe) = rejected {
        debug!(?probe, terms_a = a.term_count(), terms_b = b.term_count(), "division rejected by probe");
        return Ok(None);
    }
    Ok(divide_widening(&da, &db, true, width)?.map(|(q, _)| q))
}
