//! Heap-based sparse multiplication.
//!
//! The product of `A` (n terms) and `B` (m terms) is produced in
//! decreasing order by merging the n rows `A_i * B` through a max-heap.
//! Row `i + 1` enters the heap only once row `i` has left its first
//! column, so the heap never holds more than n entries; the shorter
//! operand drives the rows.

use std::sync::Arc;

use rayon::prelude::*;
use smallvec::smallvec;
use tessera_rings::Ring;
use tracing::debug;

use super::divide::select_exps;
use super::heap::{ChainHeap, ChainNode};
use crate::monomial::{ExpLayout, Packed};
use crate::sparse::SparsePoly;

/// Samples per operand used to place the split points.
const SPLIT_SAMPLES: usize = 16;

#[inline]
fn product<R: Ring>(layout: &ExpLayout, a: &SparsePoly<R>, i: usize, b: &SparsePoly<R>, j: usize) -> Packed {
    let mut out: Packed = smallvec![0; layout.words()];
    layout.add(a.packed(i), b.packed(j), &mut out);
    out
}

fn ordered<'p, R: Ring>(a: &'p SparsePoly<R>, b: &'p SparsePoly<R>) -> (&'p SparsePoly<R>, &'p SparsePoly<R>) {
    if a.term_count() <= b.term_count() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Multiplies two polynomials packed at a common width wide enough for
/// the product.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn mul_heap<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>) -> SparsePoly<R> {
    let (a, b) = ordered(a, b);
    let (n, m) = (a.term_count(), b.term_count());
    let ctx = Arc::clone(a.context());
    if n == 0 {
        return SparsePoly::new(&ctx);
    }

    let layout = a.layout();
    let ring = a.ring();
    let (ac, bc) = (a.coefficients(), b.coefficients());

    let mut nodes = vec![ChainNode::default(); n];
    let mut heap = ChainHeap::new(layout, n);
    let mut exps = Vec::with_capacity((n + m) * layout.words());
    let mut coeffs = Vec::with_capacity(n + m);
    let mut rows: Vec<u32> = Vec::with_capacity(n);

    heap.push(product(layout, a, 0, b, 0), 0, &mut nodes);

    while let Some((exp, head)) = heap.pop() {
        rows.clear();
        heap.drain_equal(&exp, head, &nodes, &mut rows);

        let mut acc = ring.accumulator();
        for &r in &rows {
            let node = nodes[r as usize];
            ring.accumulate(&mut acc, &ac[r as usize], &bc[node.j as usize]);
        }
        let c = ring.finish(acc);
        if !ring.is_zero(&c) {
            exps.extend_from_slice(&exp);
            coeffs.push(c);
        }

        for &r in &rows {
            let i = r as usize;
            let j = nodes[i].j as usize;
            if j == 0 && i + 1 < n {
                nodes[i + 1].j = 0;
                heap.push(product(layout, a, i + 1, b, 0), r + 1, &mut nodes);
            }
            if j + 1 < m {
                nodes[i].j = (j + 1) as u32;
                heap.push(product(layout, a, i, b, j + 1), r, &mut nodes);
            }
        }
    }

    SparsePoly::from_parts(ctx, a.bits(), exps, coeffs)
}

/// First column `j` in `[0, m)` with `A_i * B_j <= bound`, or `m`.
fn first_at_most<R: Ring>(layout: &ExpLayout, a: &SparsePoly<R>, i: usize, b: &SparsePoly<R>, bound: &[u64]) -> usize {
    let (mut lo, mut hi) = (0, b.term_count());
    let mut buf: Packed = smallvec![0; layout.words()];
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        layout.add(a.packed(i), b.packed(mid), &mut buf);
        if layout.compare(&buf, bound).is_gt() {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Heap merge restricted to products `e` with `lower < e <= upper`.
///
/// A missing bound is unbounded on that side.
#[allow(clippy::cast_possible_truncation)]
fn mul_slice<R: Ring>(
    a: &SparsePoly<R>,
    b: &SparsePoly<R>,
    upper: Option<&[u64]>,
    lower: Option<&[u64]>,
) -> (Vec<u64>, Vec<R::Element>) {
    let layout = a.layout();
    let ring = a.ring();
    let (ac, bc) = (a.coefficients(), b.coefficients());
    let (n, m) = (a.term_count(), b.term_count());

    let mut nodes = vec![ChainNode::default(); n];
    let mut ends = vec![0u32; n];
    let mut heap = ChainHeap::new(layout, n);
    for i in 0..n {
        let start = upper.map_or(0, |u| first_at_most(layout, a, i, b, u));
        let end = lower.map_or(m, |l| first_at_most(layout, a, i, b, l));
        if start < end {
            nodes[i].j = start as u32;
            ends[i] = end as u32;
            heap.push(product(layout, a, i, b, start), i as u32, &mut nodes);
        }
    }

    let mut exps = Vec::new();
    let mut coeffs = Vec::new();
    let mut rows: Vec<u32> = Vec::with_capacity(n);
    while let Some((exp, head)) = heap.pop() {
        rows.clear();
        heap.drain_equal(&exp, head, &nodes, &mut rows);

        let mut acc = ring.accumulator();
        for &r in &rows {
            ring.accumulate(&mut acc, &ac[r as usize], &bc[nodes[r as usize].j as usize]);
        }
        let c = ring.finish(acc);
        if !ring.is_zero(&c) {
            exps.extend_from_slice(&exp);
            coeffs.push(c);
        }

        for &r in &rows {
            let i = r as usize;
            let j = nodes[i].j + 1;
            if j < ends[i] {
                nodes[i].j = j;
                heap.push(product(layout, a, i, b, j as usize), r, &mut nodes);
            }
        }
    }
    (exps, coeffs)
}

/// Picks up to `parts - 1` split exponents, in decreasing order, from
/// products of sampled terms.
fn split_points<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>, parts: usize) -> Vec<Packed> {
    let layout = a.layout();
    let sa = select_exps(a, SPLIT_SAMPLES);
    let sb = select_exps(b, SPLIT_SAMPLES);

    let mut products: Vec<Packed> = Vec::with_capacity(sa.len() * sb.len());
    for x in &sa {
        for y in &sb {
            let mut out: Packed = smallvec![0; layout.words()];
            layout.add(x, y, &mut out);
            products.push(out);
        }
    }
    products.sort_unstable_by(|x, y| layout.compare(y, x));
    products.dedup();

    let mut splits: Vec<Packed> = (1..parts)
        .map(|k| products[k * products.len() / parts].clone())
        .collect();
    splits.dedup();
    splits
}

/// Multiplies on the current rayon pool by splitting the output range.
///
/// Each worker merges only the products that fall in its slice of the
/// exponent range; slices are disjoint and ordered, so the outputs are
/// concatenated.
#[must_use]
pub fn mul_heap_threaded<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>) -> SparsePoly<R> {
    let (a, b) = ordered(a, b);
    let parts = rayon::current_num_threads().max(1);
    if parts == 1 || a.term_count() < 2 {
        return mul_heap(a, b);
    }

    let splits = split_points(a, b, parts);
    debug!(parts, splits = splits.len(), terms_a = a.term_count(), terms_b = b.term_count(), "threaded multiplication");

    let chunks: Vec<(Vec<u64>, Vec<R::Element>)> = (0..=splits.len())
        .into_par_iter()
        .map(|k| {
            let upper = k.checked_sub(1).map(|p| splits[p].as_slice());
            let lower = splits.get(k).map(Packed::as_slice);
            mul_slice(a, b, upper, lower)
        })
        .collect();

    let total: usize = chunks.iter().map(|(_, c)| c.len()).sum();
    let mut exps = Vec::with_capacity(total * a.words());
    let mut coeffs = Vec::with_capacity(total);
    for (e, c) in chunks {
        exps.extend(e);
        coeffs.extend(c);
    }
    SparsePoly::from_parts(Arc::clone(a.context()), a.bits(), exps, coeffs)
}
