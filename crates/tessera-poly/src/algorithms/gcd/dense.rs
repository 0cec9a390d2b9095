//! Dense recursive GCD by primitive pseudo-remainder sequences.
//!
//! A polynomial in `n` variables is viewed as a univariate polynomial in
//! `x_0` whose coefficients are polynomials in `x_1..x_n`, down to ring
//! elements at depth zero. Works over any ring where exact coefficient
//! division exists; a division that fails aborts with
//! [`GcdFailure::Infeasible`].

use std::sync::Arc;

use tessera_rings::{Ring, RingKind};

use super::{GcdFailure, GcdResult};
use crate::context::Context;
use crate::error::Result;
use crate::sparse::SparsePoly;

/// Recursive dense representation. A `Node` lists coefficients in
/// ascending degree with no trailing zeros.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Rec<E> {
    Leaf(E),
    Node(Vec<Rec<E>>),
}

struct Dense<'r, R: Ring> {
    ring: &'r R,
}

impl<'r, R: Ring> Dense<'r, R> {
    fn zero(&self, depth: usize) -> Rec<R::Element> {
        if depth == 0 {
            Rec::Leaf(self.ring.zero())
        } else {
            Rec::Node(Vec::new())
        }
    }

    fn one(&self, depth: usize) -> Rec<R::Element> {
        if depth == 0 {
            Rec::Leaf(self.ring.one())
        } else {
            Rec::Node(vec![self.one(depth - 1)])
        }
    }

    fn is_zero(&self, a: &Rec<R::Element>) -> bool {
        match a {
            Rec::Leaf(c) => self.ring.is_zero(c),
            Rec::Node(v) => v.is_empty(),
        }
    }

    fn degree(a: &Rec<R::Element>) -> usize {
        match a {
            Rec::Leaf(_) => 0,
            Rec::Node(v) => v.len().saturating_sub(1),
        }
    }

    fn node(&self, mut v: Vec<Rec<R::Element>>) -> Rec<R::Element> {
        while v.last().is_some_and(|c| self.is_zero(c)) {
            v.pop();
        }
        Rec::Node(v)
    }

    fn add(&self, a: &Rec<R::Element>, b: &Rec<R::Element>) -> Rec<R::Element> {
        match (a, b) {
            (Rec::Leaf(x), Rec::Leaf(y)) => Rec::Leaf(self.ring.add(x, y)),
            (Rec::Node(x), Rec::Node(y)) => {
                let (long, short) = if x.len() >= y.len() { (x, y) } else { (y, x) };
                let mut v = long.clone();
                for (c, s) in v.iter_mut().zip(short) {
                    *c = self.add(c, s);
                }
                self.node(v)
            }
            _ => a.clone(),
        }
    }

    fn neg(&self, a: &Rec<R::Element>) -> Rec<R::Element> {
        match a {
            Rec::Leaf(x) => Rec::Leaf(self.ring.neg(x)),
            Rec::Node(v) => Rec::Node(v.iter().map(|c| self.neg(c)).collect()),
        }
    }

    fn sub(&self, a: &Rec<R::Element>, b: &Rec<R::Element>) -> Rec<R::Element> {
        self.add(a, &self.neg(b))
    }

    fn mul(&self, a: &Rec<R::Element>, b: &Rec<R::Element>, depth: usize) -> Rec<R::Element> {
        match (a, b) {
            (Rec::Leaf(x), Rec::Leaf(y)) => Rec::Leaf(self.ring.mul(x, y)),
            (Rec::Node(x), Rec::Node(y)) => {
                if x.is_empty() || y.is_empty() {
                    return Rec::Node(Vec::new());
                }
                let mut v = vec![self.zero(depth - 1); x.len() + y.len() - 1];
                for (i, p) in x.iter().enumerate() {
                    if self.is_zero(p) {
                        continue;
                    }
                    for (j, q) in y.iter().enumerate() {
                        let t = self.mul(p, q, depth - 1);
                        v[i + j] = self.add(&v[i + j], &t);
                    }
                }
                self.node(v)
            }
            _ => self.zero(depth),
        }
    }

    /// `a * c`, where `c` is one level below `a`.
    fn scale(&self, a: &Rec<R::Element>, c: &Rec<R::Element>, depth: usize) -> Rec<R::Element> {
        match a {
            Rec::Node(v) => self.node(v.iter().map(|x| self.mul(x, c, depth - 1)).collect()),
            Rec::Leaf(_) => self.mul(a, c, depth),
        }
    }

    /// `a * c * x^shift`, where `c` is one level below `a`.
    fn scale_shift(&self, a: &Rec<R::Element>, c: &Rec<R::Element>, shift: usize, depth: usize) -> Rec<R::Element> {
        match self.scale(a, c, depth) {
            Rec::Node(v) if !v.is_empty() => {
                let mut shifted = vec![self.zero(depth - 1); shift];
                shifted.extend(v);
                Rec::Node(shifted)
            }
            other => other,
        }
    }

    fn div_exact(&self, a: &Rec<R::Element>, b: &Rec<R::Element>, depth: usize) -> Option<Rec<R::Element>> {
        match (a, b) {
            (Rec::Leaf(x), Rec::Leaf(y)) => self.ring.div_exact(x, y).map(Rec::Leaf),
            (Rec::Node(x), Rec::Node(y)) => {
                let lb = y.last()?;
                if x.is_empty() {
                    return Some(Rec::Node(Vec::new()));
                }
                if x.len() < y.len() {
                    return None;
                }
                let db = y.len() - 1;
                let mut r = x.clone();
                let mut q = vec![self.zero(depth - 1); x.len() - db];
                for k in (0..q.len()).rev() {
                    if self.is_zero(&r[k + db]) {
                        continue;
                    }
                    let t = self.div_exact(&r[k + db], lb, depth - 1)?;
                    for (i, bc) in y.iter().enumerate() {
                        r[k + i] = self.sub(&r[k + i], &self.mul(&t, bc, depth - 1));
                    }
                    q[k] = t;
                }
                r.iter().all(|c| self.is_zero(c)).then(|| self.node(q))
            }
            _ => None,
        }
    }

    /// Content and primitive part of a nonzero node.
    fn primitive(&self, a: &Rec<R::Element>, depth: usize) -> Option<(Rec<R::Element>, Rec<R::Element>)> {
        let Rec::Node(v) = a else {
            return None;
        };
        let mut content = self.zero(depth - 1);
        for c in v {
            content = self.gcd(&content, c, depth - 1)?;
        }
        let pp = v
            .iter()
            .map(|c| self.div_exact(c, &content, depth - 1))
            .collect::<Option<Vec<_>>>()?;
        Some((content, self.node(pp)))
    }

    /// Pseudo-remainder of `a` by `b`, multiplying by `lc(b)` one step at a
    /// time.
    fn prem(&self, a: &Rec<R::Element>, b: &Rec<R::Element>, depth: usize) -> Option<Rec<R::Element>> {
        let Rec::Node(y) = b else {
            return None;
        };
        let lb = y.last()?;
        let db = y.len() - 1;
        let mut r = a.clone();
        while !self.is_zero(&r) && Self::degree(&r) >= db {
            let Rec::Node(x) = &r else {
                return None;
            };
            let shift = x.len() - 1 - db;
            let lr = x.last()?.clone();
            r = self.sub(&self.scale(&r, lb, depth), &self.scale_shift(b, &lr, shift, depth));
        }
        Some(r)
    }

    fn gcd(&self, a: &Rec<R::Element>, b: &Rec<R::Element>, depth: usize) -> Option<Rec<R::Element>> {
        if depth == 0 {
            let (Rec::Leaf(x), Rec::Leaf(y)) = (a, b) else {
                return None;
            };
            let g = self.ring.gcd(x, y);
            return Some(Rec::Leaf(self.ring.mul(&g, &self.ring.unit_normal(&g))));
        }
        if self.is_zero(a) {
            return Some(b.clone());
        }
        if self.is_zero(b) {
            return Some(a.clone());
        }

        let (ca, pa) = self.primitive(a, depth)?;
        let (cb, pb) = self.primitive(b, depth)?;
        let content = self.gcd(&ca, &cb, depth - 1)?;
        let (mut p, mut q) = if Self::degree(&pa) >= Self::degree(&pb) { (pa, pb) } else { (pb, pa) };
        let g = loop {
            if Self::degree(&q) == 0 {
                break self.one(depth);
            }
            let r = self.prem(&p, &q, depth)?;
            if self.is_zero(&r) {
                break q;
            }
            let (_, r) = self.primitive(&r, depth)?;
            p = q;
            q = r;
        };
        Some(self.scale(&g, &content, depth))
    }

    fn insert(&self, node: &mut Rec<R::Element>, exps: &[u64], c: R::Element, depth: usize) {
        match node {
            Rec::Leaf(x) => *x = c,
            Rec::Node(v) => {
                let e = usize::try_from(exps[0]).unwrap_or(usize::MAX);
                if v.len() <= e {
                    v.resize_with(e + 1, || self.zero(depth - 1));
                }
                self.insert(&mut v[e], &exps[1..], c, depth - 1);
            }
        }
    }

    fn from_sparse(&self, poly: &SparsePoly<R>) -> Rec<R::Element> {
        let depth = poly.nvars();
        let mut root = self.zero(depth);
        for (exps, c) in poly.terms() {
            self.insert(&mut root, &exps, c.clone(), depth);
        }
        root
    }

    fn collect(&self, node: &Rec<R::Element>, prefix: &mut Vec<u64>, out: &mut Vec<(Vec<u64>, R::Element)>) {
        match node {
            Rec::Leaf(c) => {
                if !self.ring.is_zero(c) {
                    out.push((prefix.clone(), c.clone()));
                }
            }
            Rec::Node(v) => {
                for (e, child) in (0u64..).zip(v) {
                    prefix.push(e);
                    self.collect(child, prefix, out);
                    prefix.pop();
                }
            }
        }
    }

    fn to_sparse(&self, ctx: &Arc<Context<R>>, node: &Rec<R::Element>) -> Result<SparsePoly<R>> {
        let mut terms = Vec::new();
        self.collect(node, &mut Vec::with_capacity(ctx.nvars()), &mut terms);
        SparsePoly::from_pairs(ctx, terms)
    }
}

/// GCD by recursive primitive PRS.
///
/// The result is unit-normalized but not made primitive. Over a ring with
/// zero divisors it is only returned after dividing both operands.
pub(super) fn gcd<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>) -> GcdResult<SparsePoly<R>> {
    let dense = Dense { ring: a.ring() };
    let depth = a.nvars();
    let g = dense
        .gcd(&dense.from_sparse(a), &dense.from_sparse(b), depth)
        .ok_or_else(|| GcdFailure::Infeasible("inexact coefficient division in remainder sequence".into()))?;
    let g = dense.to_sparse(a.context(), &g)?.unit_normalize();

    if a.ring().kind() == RingKind::IntegerMod {
        let verified = matches!(a.divides(&g), Ok(Some(_))) && matches!(b.divides(&g), Ok(Some(_)));
        if !verified {
            return Err(GcdFailure::Infeasible("candidate does not divide both operands".into()));
        }
    }
    Ok(g)
}
