//! Merging, sorting and combining term arrays.
//!
//! Terms are passed as parallel slices: packed exponents with a stride of
//! `layout.words()` and one coefficient per term.

use std::cmp::Ordering;

use smallvec::smallvec;
use tessera_rings::Ring;

use crate::monomial::{ExpLayout, Packed};

/// A borrowed term array: packed exponents and coefficients.
pub type Terms<'a, E> = (&'a [u64], &'a [E]);

/// Merges two sorted term arrays, adding coefficients of equal monomials
/// and dropping zeros. With `negate`, computes `a - b`.
#[must_use]
pub fn merge<R: Ring>(
    layout: &ExpLayout,
    ring: &R,
    a: Terms<'_, R::Element>,
    b: Terms<'_, R::Element>,
    negate: bool,
) -> (Vec<u64>, Vec<R::Element>) {
    let words = layout.words();
    let (a_exps, a_coeffs) = a;
    let (b_exps, b_coeffs) = b;
    let mut exps = Vec::with_capacity(a_exps.len() + b_exps.len());
    let mut coeffs = Vec::with_capacity(a_coeffs.len() + b_coeffs.len());

    let take_b = |c: &R::Element| if negate { ring.neg(c) } else { c.clone() };

    let (mut i, mut j) = (0, 0);
    while i < a_coeffs.len() && j < b_coeffs.len() {
        let ea = &a_exps[i * words..(i + 1) * words];
        let eb = &b_exps[j * words..(j + 1) * words];
        match layout.compare(ea, eb) {
            Ordering::Greater => {
                exps.extend_from_slice(ea);
                coeffs.push(a_coeffs[i].clone());
                i += 1;
            }
            Ordering::Less => {
                exps.extend_from_slice(eb);
                coeffs.push(take_b(&b_coeffs[j]));
                j += 1;
            }
            Ordering::Equal => {
                let c = if negate {
                    ring.sub(&a_coeffs[i], &b_coeffs[j])
                } else {
                    ring.add(&a_coeffs[i], &b_coeffs[j])
                };
                if !ring.is_zero(&c) {
                    exps.extend_from_slice(ea);
                    coeffs.push(c);
                }
                i += 1;
                j += 1;
            }
        }
    }

    exps.extend_from_slice(&a_exps[i * words..]);
    coeffs.extend_from_slice(&a_coeffs[i..]);
    exps.extend_from_slice(&b_exps[j * words..]);
    coeffs.extend(b_coeffs[j..].iter().map(take_b));
    (exps, coeffs)
}

/// Sorts terms into decreasing order.
///
/// MSB-first radix sort on the masked exponent words. Only bits that vary
/// within a partition are visited, so the depth is bounded by the number
/// of distinct bit positions actually in use.
pub fn radix_sort<E>(layout: &ExpLayout, exps: &mut [u64], coeffs: &mut [E]) {
    let words = layout.words();
    debug_assert_eq!(exps.len(), coeffs.len() * words);
    sort_range(layout, exps, coeffs, 0, coeffs.len(), 0);
}

fn sort_range<E>(layout: &ExpLayout, exps: &mut [u64], coeffs: &mut [E], lo: usize, hi: usize, from_bit: usize) {
    if hi - lo <= 1 {
        return;
    }
    let words = layout.words();
    let mask = layout.cmp_mask();

    let mut any: Packed = smallvec![0; words];
    let mut all: Packed = smallvec![u64::MAX; words];
    for t in lo..hi {
        for w in 0..words {
            let v = exps[t * words + w] ^ mask[w];
            any[w] |= v;
            all[w] &= v;
        }
    }

    let Some(pos) = (from_bit..words * 64).find(|&p| {
        let (w, bit) = (p / 64, 63 - p % 64);
        ((any[w] ^ all[w]) >> bit) & 1 == 1
    }) else {
        return;
    };

    let (w, bit) = (pos / 64, 63 - pos % 64);
    let is_set = |exps: &[u64], t: usize| ((exps[t * words + w] ^ mask[w]) >> bit) & 1 == 1;

    // Terms with the bit set sort first.
    let (mut i, mut j) = (lo, hi);
    loop {
        while i < j && is_set(exps, i) {
            i += 1;
        }
        while i < j && !is_set(exps, j - 1) {
            j -= 1;
        }
        if i >= j {
            break;
        }
        swap_terms(exps, coeffs, words, i, j - 1);
        i += 1;
        j -= 1;
    }

    sort_range(layout, exps, coeffs, lo, i, pos + 1);
    sort_range(layout, exps, coeffs, i, hi, pos + 1);
}

#[inline]
fn swap_terms<E>(exps: &mut [u64], coeffs: &mut [E], words: usize, a: usize, b: usize) {
    for w in 0..words {
        exps.swap(a * words + w, b * words + w);
    }
    coeffs.swap(a, b);
}

/// Merges adjacent equal monomials of a sorted term array and drops zero
/// coefficients. The arrays are truncated in place.
pub fn combine_like_terms<R: Ring>(layout: &ExpLayout, ring: &R, exps: &mut Vec<u64>, coeffs: &mut Vec<R::Element>) {
    let words = layout.words();
    let mut out = 0usize;
    for t in 0..coeffs.len() {
        if out > 0 && exps[(out - 1) * words..out * words] == exps[t * words..(t + 1) * words] {
            let c = coeffs[t].clone();
            ring.add_assign(&mut coeffs[out - 1], &c);
            continue;
        }
        if out > 0 && ring.is_zero(&coeffs[out - 1]) {
            out -= 1;
        }
        exps.copy_within(t * words..(t + 1) * words, out * words);
        coeffs.swap(out, t);
        out += 1;
    }
    if out > 0 && ring.is_zero(&coeffs[out - 1]) {
        out -= 1;
    }
    exps.truncate(out * words);
    coeffs.truncate(out);
}
