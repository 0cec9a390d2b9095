//! Sparse multivariate polynomials.
//!
//! A [`SparsePoly`] stores its terms as two parallel arrays: packed
//! exponents (a flat `Vec<u64>` with a stride of `words` per term) and
//! coefficients. Terms are kept in strictly decreasing order under the
//! context's monomial ordering, with no zero coefficients, and every
//! exponent packed at the same field width.
//!
//! Operations that combine two polynomials check that their contexts are
//! compatible and bring both operands to a common field width first. The
//! width of a result is computed up front from field-wise maxima, so an
//! operation either fits or fails with [`PolyError::ExponentOverflow`]
//! before producing any exponent.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use smallvec::smallvec;
use tessera_rings::{Ring, RingKind};
use tracing::trace;

use crate::algorithms::gcd::GcdRing;
use crate::algorithms::{divide, evaluate, gcd, heap_mul, merge, transform};
use crate::context::Context;
use crate::error::{PolyError, Result};
use crate::monomial::{bits_for, bits_for_fields, bits_for_sum, ExpLayout, Exponents, Packed, FIELD_WIDTHS};

/// A sparse multivariate polynomial over the ring `R`.
#[derive(Clone)]
pub struct SparsePoly<R: Ring> {
    ctx: Arc<Context<R>>,
    bits: u32,
    exps: Vec<u64>,
    coeffs: Vec<R::Element>,
}

impl<R: Ring> SparsePoly<R> {
    /// Creates the zero polynomial.
    #[must_use]
    pub fn new(ctx: &Arc<Context<R>>) -> Self {
        Self {
            ctx: Arc::clone(ctx),
            bits: FIELD_WIDTHS[0],
            exps: Vec::new(),
            coeffs: Vec::new(),
        }
    }

    /// Builds a polynomial from unordered terms.
    ///
    /// Terms may repeat and coefficients may be zero; the result is sorted
    /// with like terms combined.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] if the two slices differ in
    /// length or an exponent vector has the wrong arity, and
    /// [`PolyError::ExponentOverflow`] if an exponent needs 64 bits.
    pub fn from_terms<E: AsRef<[u64]>>(
        ctx: &Arc<Context<R>>,
        exponents: &[E],
        coeffs: Vec<R::Element>,
    ) -> Result<Self> {
        if exponents.len() != coeffs.len() {
            return Err(PolyError::DimensionMismatch(format!(
                "{} exponent vectors for {} coefficients",
                exponents.len(),
                coeffs.len()
            )));
        }

        let nvars = ctx.nvars();
        let mut max = 0u64;
        for e in exponents {
            let e = e.as_ref();
            if e.len() != nvars {
                return Err(PolyError::DimensionMismatch(format!(
                    "exponent vector of length {} for {nvars} variables",
                    e.len()
                )));
            }
            let mut degree = 0u64;
            for &x in e {
                max = max.max(x);
                degree = degree.checked_add(x).ok_or(PolyError::ExponentOverflow)?;
            }
            if ctx.order().is_graded() {
                max = max.max(degree);
            }
        }

        let bits = bits_for(max)?;
        let layout = ctx.layout(bits);
        let words = layout.words();
        let mut exps = vec![0u64; exponents.len() * words];
        for (e, dst) in exponents.iter().zip(exps.chunks_exact_mut(words)) {
            layout.pack_into(e.as_ref(), dst)?;
        }

        let mut coeffs = coeffs;
        merge::radix_sort(layout, &mut exps, &mut coeffs);
        merge::combine_like_terms(layout, ctx.ring(), &mut exps, &mut coeffs);
        Ok(Self {
            ctx: Arc::clone(ctx),
            bits,
            exps,
            coeffs,
        })
    }

    /// Builds a polynomial from `(exponents, coefficient)` pairs.
    ///
    /// # Errors
    ///
    /// See [`SparsePoly::from_terms`].
    pub fn from_pairs<I>(ctx: &Arc<Context<R>>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<u64>, R::Element)>,
    {
        let (exponents, coeffs): (Vec<Vec<u64>>, Vec<R::Element>) = pairs.into_iter().unzip();
        Self::from_terms(ctx, &exponents, coeffs)
    }

    /// Creates a constant polynomial.
    #[must_use]
    pub fn constant(ctx: &Arc<Context<R>>, c: R::Element) -> Self {
        let mut poly = Self::new(ctx);
        if !ctx.ring().is_zero(&c) {
            poly.exps = vec![0; poly.words()];
            poly.coeffs.push(c);
        }
        poly
    }

    /// Creates the constant polynomial 1.
    #[must_use]
    pub fn one(ctx: &Arc<Context<R>>) -> Self {
        Self::constant(ctx, ctx.ring().one())
    }

    /// Creates the variable `x_var`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] if `var` is out of range.
    pub fn var(ctx: &Arc<Context<R>>, var: usize) -> Result<Self> {
        if var >= ctx.nvars() {
            return Err(PolyError::DimensionMismatch(format!(
                "variable x{var} in a ring of {} variables",
                ctx.nvars()
            )));
        }
        let mut exps = vec![0u64; ctx.nvars()];
        exps[var] = 1;
        Self::monomial(ctx, &exps, ctx.ring().one())
    }

    /// Creates the monomial `c * x^exps`.
    ///
    /// # Errors
    ///
    /// See [`SparsePoly::from_terms`].
    pub fn monomial(ctx: &Arc<Context<R>>, exps: &[u64], c: R::Element) -> Result<Self> {
        Self::from_terms(ctx, &[exps], vec![c])
    }

    pub(crate) fn from_parts(ctx: Arc<Context<R>>, bits: u32, exps: Vec<u64>, coeffs: Vec<R::Element>) -> Self {
        debug_assert_eq!(exps.len(), coeffs.len() * ctx.layout(bits).words());
        Self {
            ctx,
            bits,
            exps,
            coeffs,
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<u64>, Vec<R::Element>) {
        (self.exps, self.coeffs)
    }

    /// Maps the coefficients into another ring with the same variables and
    /// ordering, dropping those that become zero.
    pub(crate) fn map_coefficients<S: Ring>(
        &self,
        ctx: &Arc<Context<S>>,
        f: impl Fn(&R::Element) -> S::Element,
    ) -> SparsePoly<S> {
        debug_assert!(ctx.nvars() == self.nvars() && ctx.order() == self.ctx.order());
        let ring = ctx.ring();
        let mut exps = Vec::with_capacity(self.exps.len());
        let mut coeffs = Vec::with_capacity(self.coeffs.len());
        for (packed, c) in self.exps.chunks_exact(self.words()).zip(&self.coeffs) {
            let y = f(c);
            if !ring.is_zero(&y) {
                exps.extend_from_slice(packed);
                coeffs.push(y);
            }
        }
        SparsePoly::from_parts(Arc::clone(ctx), self.bits, exps, coeffs)
    }

    /// The context this polynomial lives in.
    #[must_use]
    pub fn context(&self) -> &Arc<Context<R>> {
        &self.ctx
    }

    /// The coefficient ring.
    #[must_use]
    pub fn ring(&self) -> &R {
        self.ctx.ring()
    }

    /// Number of variables.
    #[must_use]
    pub fn nvars(&self) -> usize {
        self.ctx.nvars()
    }

    /// Field width of the packed exponents.
    #[must_use]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub(crate) fn layout(&self) -> &ExpLayout {
        self.ctx.layout(self.bits)
    }

    pub(crate) fn words(&self) -> usize {
        self.layout().words()
    }

    /// Packed exponent of term `i`.
    pub(crate) fn packed(&self, i: usize) -> &[u64] {
        let w = self.words();
        &self.exps[i * w..(i + 1) * w]
    }

    /// All packed exponents, `words` per term.
    pub(crate) fn packed_exps(&self) -> &[u64] {
        &self.exps
    }

    /// Coefficients in term order.
    #[must_use]
    pub fn coefficients(&self) -> &[R::Element] {
        &self.coeffs
    }

    /// This polynomial packed at `bits`, borrowing when already there.
    pub(crate) fn at_bits(&self, bits: u32) -> Result<Cow<'_, Self>> {
        if bits == self.bits {
            return Ok(Cow::Borrowed(self));
        }
        trace!(from = self.bits, to = bits, terms = self.coeffs.len(), "repacking exponents");
        let exps = self.ctx.layout(bits).repack(self.layout(), &self.exps)?;
        Ok(Cow::Owned(Self::from_parts(Arc::clone(&self.ctx), bits, exps, self.coeffs.clone())))
    }

    /// Repacks at the narrowest width that holds every exponent.
    pub(crate) fn fit_bits(self) -> Self {
        let Ok(bits) = bits_for_fields(&self.max_fields()) else {
            return self;
        };
        if bits >= self.bits {
            return self;
        }
        let repacked = match self.at_bits(bits) {
            Ok(Cow::Owned(poly)) => Some(poly),
            _ => None,
        };
        repacked.unwrap_or(self)
    }

    pub(crate) fn check_compatible(&self, other: &Self) -> Result<()> {
        if Arc::ptr_eq(&self.ctx, &other.ctx) || self.ctx.is_compatible(&other.ctx) {
            Ok(())
        } else {
            Err(PolyError::DimensionMismatch(format!(
                "contexts differ: {:?} vs {:?}",
                self.ctx, other.ctx
            )))
        }
    }

    /// Field-wise maxima of all packed exponents.
    pub(crate) fn max_fields(&self) -> Exponents {
        self.layout().max_fields(&self.exps)
    }

    /// Exponents of the monomial gcd of all terms.
    #[must_use]
    pub fn monomial_content(&self) -> Exponents {
        self.layout().min_exponents(&self.exps)
    }

    // Inspection

    /// Number of terms.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.coeffs.len()
    }

    /// Returns true if this is the zero polynomial.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Returns true if the polynomial has exactly one term.
    #[must_use]
    pub fn is_monomial(&self) -> bool {
        self.coeffs.len() == 1
    }

    /// Returns true if the polynomial is zero or a constant.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        match self.coeffs.len() {
            0 => true,
            1 => self.layout().is_one(&self.exps),
            _ => false,
        }
    }

    /// Returns true if the polynomial is the constant 1.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.is_constant() && self.coeffs.first().is_some_and(|c| self.ring().is_one(c))
    }

    /// Leading coefficient, `None` for zero.
    #[must_use]
    pub fn leading_coeff(&self) -> Option<&R::Element> {
        self.coeffs.first()
    }

    /// Trailing coefficient, `None` for zero.
    #[must_use]
    pub fn trailing_coeff(&self) -> Option<&R::Element> {
        self.coeffs.last()
    }

    /// Exponent vector of term `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.term_count()`.
    #[must_use]
    pub fn exponents(&self, i: usize) -> Exponents {
        self.layout().unpack(self.packed(i))
    }

    /// Coefficient of term `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.term_count()`.
    #[must_use]
    pub fn coeff(&self, i: usize) -> &R::Element {
        &self.coeffs[i]
    }

    /// Iterates over `(exponents, coefficient)` in decreasing order.
    pub fn terms(&self) -> impl Iterator<Item = (Exponents, &R::Element)> + '_ {
        let layout = self.layout();
        self.exps
            .chunks_exact(layout.words())
            .zip(&self.coeffs)
            .map(move |(packed, c)| (layout.unpack(packed), c))
    }

    /// Degree in `var`, or `None` for zero or an out-of-range variable.
    #[must_use]
    pub fn degree(&self, var: usize) -> Option<u64> {
        if self.is_zero() || var >= self.nvars() {
            return None;
        }
        let layout = self.layout();
        if layout.order() == crate::MonomialOrder::Lex && var == 0 {
            return Some(layout.exponent(&self.exps, 0));
        }
        Some(layout.max_fields(&self.exps)[layout.order().var_field(var, self.nvars())])
    }

    /// Degree in every variable, or `None` for zero.
    ///
    /// Large polynomials are scanned in parallel.
    #[must_use]
    pub fn degrees(&self) -> Option<Exponents> {
        if self.is_zero() {
            return None;
        }
        let layout = self.layout();
        let maxima = if self.ctx.should_parallelize(self.coeffs.len()) {
            let chunk = layout.words() * 4096;
            self.ctx.install(|| {
                self.exps
                    .par_chunks(chunk)
                    .map(|part| layout.max_fields(part))
                    .reduce_with(|mut a, b| {
                        a.iter_mut().zip(&b).for_each(|(x, &y)| *x = (*x).max(y));
                        a
                    })
            })?
        } else {
            layout.max_fields(&self.exps)
        };
        let order = layout.order();
        Some((0..self.nvars()).map(|v| maxima[order.var_field(v, self.nvars())]).collect())
    }

    /// Total degree, or `None` for zero.
    #[must_use]
    pub fn total_degree(&self) -> Option<u64> {
        if self.is_zero() {
            return None;
        }
        let layout = self.layout();
        if layout.order().is_graded() {
            return Some(layout.field(&self.exps, 0));
        }
        let words = layout.words();
        if self.ctx.should_parallelize(self.coeffs.len()) {
            self.ctx
                .install(|| self.exps.par_chunks(words).map(|p| layout.degree(p)).max())
        } else {
            self.exps.chunks_exact(words).map(|p| layout.degree(p)).max()
        }
    }

    // Arithmetic

    /// Returns `self + other`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] for incompatible contexts.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.add_sub(other, false)
    }

    /// Returns `self - other`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] for incompatible contexts.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.add_sub(other, true)
    }

    fn add_sub(&self, other: &Self, negate: bool) -> Result<Self> {
        self.check_compatible(other)?;
        let bits = self.bits.max(other.bits);
        let a = self.at_bits(bits)?;
        let b = other.at_bits(bits)?;
        let (exps, coeffs) = merge::merge(
            self.ctx.layout(bits),
            self.ring(),
            (&a.exps, &a.coeffs),
            (&b.exps, &b.coeffs),
            negate,
        );
        Ok(Self::from_parts(Arc::clone(&self.ctx), bits, exps, coeffs))
    }

    /// Returns `-self`.
    #[must_use]
    pub fn neg(&self) -> Self {
        let ring = self.ring();
        let coeffs = self.coeffs.iter().map(|c| ring.neg(c)).collect();
        Self::from_parts(Arc::clone(&self.ctx), self.bits, self.exps.clone(), coeffs)
    }

    /// Multiplies every coefficient by `c`.
    #[must_use]
    pub fn scale(&self, c: &R::Element) -> Self {
        let ring = self.ring();
        let words = self.words();
        let mut exps = Vec::with_capacity(self.exps.len());
        let mut coeffs = Vec::with_capacity(self.coeffs.len());
        for (packed, x) in self.exps.chunks_exact(words).zip(&self.coeffs) {
            let y = ring.mul(x, c);
            if !ring.is_zero(&y) {
                exps.extend_from_slice(packed);
                coeffs.push(y);
            }
        }
        Self::from_parts(Arc::clone(&self.ctx), self.bits, exps, coeffs)
    }

    /// Multiplies by the monomial `c * x^exps`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] for a wrong arity and
    /// [`PolyError::ExponentOverflow`] if the result does not fit.
    pub fn mul_monomial(&self, exps: &[u64], c: &R::Element) -> Result<Self> {
        let mono = Self::monomial(&self.ctx, exps, c.clone())?;
        if mono.is_zero() || self.is_zero() {
            return Ok(Self::new(&self.ctx));
        }
        let bits = bits_for_sum(&self.max_fields(), &mono.max_fields())?;
        let a = self.at_bits(bits)?;
        let m = mono.at_bits(bits)?;
        let layout = self.ctx.layout(bits);
        let ring = self.ring();
        let words = layout.words();
        let shift = m.packed(0);

        let mut out_exps = Vec::with_capacity(a.exps.len());
        let mut out_coeffs = Vec::with_capacity(a.coeffs.len());
        let mut buf: Packed = smallvec![0; words];
        for (packed, x) in a.exps.chunks_exact(words).zip(&a.coeffs) {
            let y = ring.mul(x, c);
            if ring.is_zero(&y) {
                continue;
            }
            layout.add(packed, shift, &mut buf);
            out_exps.extend_from_slice(&buf);
            out_coeffs.push(y);
        }
        Ok(Self::from_parts(Arc::clone(&self.ctx), bits, out_exps, out_coeffs))
    }

    /// Returns `self * other`.
    ///
    /// Large products are split across worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] for incompatible contexts
    /// and [`PolyError::ExponentOverflow`] if the product does not fit.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        if self.is_zero() || other.is_zero() {
            return Ok(Self::new(&self.ctx));
        }

        let bits = bits_for_sum(&self.max_fields(), &other.max_fields())?;
        let a = self.at_bits(bits)?;
        let b = other.at_bits(bits)?;
        let work = a.term_count().saturating_mul(b.term_count());
        if self.ctx.should_parallelize(work) {
            Ok(self.ctx.install(|| heap_mul::mul_heap_threaded(&a, &b)))
        } else {
            Ok(heap_mul::mul_heap(&a, &b))
        }
    }

    /// Returns `self^n`.
    ///
    /// Monomials are raised directly; other polynomials by repeated
    /// squaring.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::ExponentOverflow`] if the result does not fit.
    pub fn pow(&self, n: u64) -> Result<Self> {
        if n == 0 {
            return Ok(Self::one(&self.ctx));
        }
        if n == 1 || self.is_zero() {
            return Ok(self.clone());
        }

        let mut maxima = self.max_fields();
        for m in &mut maxima {
            *m = m.checked_mul(n).ok_or(PolyError::ExponentOverflow)?;
        }
        let bits = bits_for_fields(&maxima)?;

        if self.is_monomial() {
            let layout = self.ctx.layout(bits);
            let exps: Exponents = self.exponents(0).iter().map(|e| e * n).collect();
            let c = self.ring().pow(&self.coeffs[0], n);
            if self.ring().is_zero(&c) {
                return Ok(Self::new(&self.ctx));
            }
            let packed = layout.pack(&exps)?;
            return Ok(Self::from_parts(Arc::clone(&self.ctx), bits, packed.to_vec(), vec![c]));
        }

        let mut result = Self::one(&self.ctx);
        let mut base = self.at_bits(bits)?.into_owned();
        let mut exp = n;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.mul(&base)?;
            }
            exp >>= 1;
            if exp > 0 {
                base = base.mul(&base)?;
            }
        }
        Ok(result)
    }

    fn check_divisor(&self, divisor: &Self) -> Result<()> {
        self.check_compatible(divisor)?;
        let Some(lc) = divisor.leading_coeff() else {
            return Err(PolyError::DivisionByZero);
        };
        if self.ring().kind() != RingKind::Integer && !self.ring().is_unit(lc) {
            return Err(PolyError::RingNotInvertible);
        }
        Ok(())
    }

    /// Exact division: `Some(q)` with `q * divisor == self`, or `None` if
    /// `divisor` does not divide `self`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DivisionByZero`] for a zero divisor,
    /// [`PolyError::RingNotInvertible`] if the divisor's leading
    /// coefficient is not a unit in a non-integer ring, and
    /// [`PolyError::DimensionMismatch`] for incompatible contexts.
    pub fn divides(&self, divisor: &Self) -> Result<Option<Self>> {
        self.check_divisor(divisor)?;
        if self.is_zero() {
            return Ok(Some(Self::new(&self.ctx)));
        }
        let quotient = if self.ctx.should_parallelize(self.term_count()) {
            self.ctx.install(|| divide::divides_threaded(self, divisor))?
        } else {
            divide::divides_heap(self, divisor)?
        };
        Ok(quotient.map(Self::fit_bits))
    }

    /// Division with remainder by a single divisor.
    ///
    /// Returns `(q, r)` with `self = q * divisor + r` where no term of `r`
    /// is divisible by the leading term of `divisor`.
    ///
    /// # Errors
    ///
    /// As for [`SparsePoly::divides`], plus
    /// [`PolyError::ExponentOverflow`] if an intermediate exponent does
    /// not fit.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self)> {
        self.check_divisor(divisor)?;
        if self.is_zero() {
            return Ok((Self::new(&self.ctx), Self::new(&self.ctx)));
        }
        let (q, r) = divide::div_rem_heap(self, divisor)?;
        Ok((q.fit_bits(), r.fit_bits()))
    }

    /// Greatest common divisor.
    ///
    /// Over a field the result is monic; over the integers it has a
    /// positive leading coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] for incompatible contexts,
    /// [`PolyError::ExponentOverflow`] on overflow, and
    /// [`PolyError::Infeasible`] if no strategy applies to the ring.
    pub fn gcd(&self, other: &Self) -> Result<Self>
    where
        R: GcdRing,
    {
        gcd::gcd(self, other)
    }

    /// Normalized gcd of all coefficients; zero for the zero polynomial.
    #[must_use]
    pub fn content(&self) -> R::Element {
        let ring = self.ring();
        let mut g = ring.zero();
        for c in &self.coeffs {
            g = ring.gcd(&g, c);
            if ring.is_one(&g) {
                return g;
            }
        }
        ring.mul(&g, &ring.unit_normal(&g))
    }

    /// Divides out the content.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::RingNotInvertible`] if a coefficient is not
    /// divisible by the content, which only happens in rings with zero
    /// divisors.
    pub fn primitive_part(&self) -> Result<Self> {
        if self.is_zero() {
            return Ok(self.clone());
        }
        let ring = self.ring();
        let c = self.content();
        if ring.is_one(&c) {
            return Ok(self.clone());
        }
        let coeffs = self
            .coeffs
            .iter()
            .map(|x| ring.div_exact(x, &c).ok_or(PolyError::RingNotInvertible))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parts(Arc::clone(&self.ctx), self.bits, self.exps.clone(), coeffs))
    }

    /// Scales so that the leading coefficient is 1.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::RingNotInvertible`] if the leading coefficient
    /// is not a unit.
    pub fn make_monic(&self) -> Result<Self> {
        let Some(lc) = self.leading_coeff() else {
            return Ok(self.clone());
        };
        let inv = self.ring().inv(lc).ok_or(PolyError::RingNotInvertible)?;
        Ok(self.scale(&inv))
    }

    /// Scales by the unit that puts the leading coefficient in normal form.
    #[must_use]
    pub fn unit_normalize(&self) -> Self {
        match self.leading_coeff() {
            Some(lc) => {
                let u = self.ring().unit_normal(lc);
                if self.ring().is_one(&u) {
                    self.clone()
                } else {
                    self.scale(&u)
                }
            }
            None => self.clone(),
        }
    }

    // Structural transforms

    /// Sets `x_var = value`. The result keeps `var` with exponent zero.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] if `var` is out of range.
    pub fn evaluate_one(&self, var: usize, value: &R::Element) -> Result<Self> {
        evaluate::evaluate_one(self, var, value)
    }

    /// Evaluates at a point with one value per variable.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] if the point has the wrong
    /// length.
    pub fn evaluate_all(&self, point: &[R::Element]) -> Result<R::Element> {
        evaluate::evaluate_all(self, point)
    }

    /// Replaces `x_var` by the polynomial `value`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] for a bad variable or
    /// incompatible contexts and [`PolyError::ExponentOverflow`] if the
    /// result does not fit.
    pub fn substitute(&self, var: usize, value: &Self) -> Result<Self> {
        evaluate::substitute(self, var, value)
    }

    /// Maps every exponent `e_i` to `shift_i + stride_i * e_i`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] for wrong-length vectors
    /// and [`PolyError::ExponentOverflow`] if the result does not fit.
    pub fn inflate(&self, shift: &[u64], stride: &[u64]) -> Result<Self> {
        transform::inflate(self, shift, stride)
    }

    /// Inverse of [`SparsePoly::inflate`]: maps `e_i` to
    /// `(e_i - shift_i) / stride_i`, or to 0 where `stride_i` is 0.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::InvalidTransform`] if some exponent is not of
    /// the form `shift_i + k * stride_i`.
    pub fn deflate(&self, shift: &[u64], stride: &[u64]) -> Result<Self> {
        transform::deflate(self, shift, stride)
    }

    /// The largest `(shift, stride)` for which [`SparsePoly::deflate`]
    /// applies.
    #[must_use]
    pub fn deflation(&self) -> (Exponents, Exponents) {
        transform::deflation(self)
    }

    /// Re-expresses this polynomial in another context with the same
    /// variables and ring, typically under a different ordering.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DimensionMismatch`] if the variable counts or
    /// rings differ.
    pub fn to_context(&self, ctx: &Arc<Context<R>>) -> Result<Self> {
        transform::to_context(self, ctx)
    }
}

impl<R: Ring> PartialEq for SparsePoly<R> {
    fn eq(&self, other: &Self) -> bool {
        if self.check_compatible(other).is_err() || self.coeffs != other.coeffs {
            return false;
        }
        if self.bits == other.bits {
            return self.exps == other.exps;
        }
        let (la, lb) = (self.layout(), other.layout());
        self.exps
            .chunks_exact(la.words())
            .zip(other.exps.chunks_exact(lb.words()))
            .all(|(a, b)| la.unpack(a) == lb.unpack(b))
    }
}

impl<R: Ring> Eq for SparsePoly<R> {}

impl<R: Ring> fmt::Debug for SparsePoly<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparsePoly")
            .field("bits", &self.bits)
            .field("terms", &self.terms().collect::<Vec<_>>())
            .finish()
    }
}

impl<R: Ring> fmt::Display for SparsePoly<R>
where
    R::Element: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let ring = self.ring();
        for (k, (exps, c)) in self.terms().enumerate() {
            let text = c.to_string();
            let (negative, magnitude) = match text.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, text.as_str()),
            };
            match (k, negative) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }

            let is_unit = ring.is_one(c) || (negative && ring.is_one(&ring.neg(c)));
            let mut need_star = false;
            if !is_unit || exps.iter().all(|&e| e == 0) {
                write!(f, "{magnitude}")?;
                need_star = true;
            }
            for (var, &e) in exps.iter().enumerate() {
                if e == 0 {
                    continue;
                }
                if need_star {
                    write!(f, "*")?;
                }
                match e {
                    1 => write!(f, "x{var}")?,
                    _ => write!(f, "x{var}^{e}")?,
                }
                need_star = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MonomialOrder;
    use tessera_integers::Integer;
    use tessera_rings::{FiniteField, Zn, Z};

    fn zpoly(ctx: &Arc<Context<Z>>, terms: &[(&[u64], i64)]) -> SparsePoly<Z> {
        SparsePoly::from_pairs(ctx, terms.iter().map(|(e, c)| (e.to_vec(), Integer::new(*c)))).unwrap()
    }

    #[test]
    fn test_from_terms_sorts_and_combines() {
        let ctx = Context::new(2, MonomialOrder::Lex, Z);
        let p = zpoly(&ctx, &[(&[0, 1], 2), (&[1, 0], 3), (&[0, 1], -2), (&[2, 0], 1)]);
        assert_eq!(p.term_count(), 2);
        assert_eq!(p.exponents(0).as_slice(), &[2, 0]);
        assert_eq!(p.exponents(1).as_slice(), &[1, 0]);
        assert_eq!(p.to_string(), "x0^2 + 3*x0");
    }

    #[test]
    fn test_from_terms_rejects_bad_arity() {
        let ctx = Context::new(2, MonomialOrder::Lex, Z);
        let err = SparsePoly::from_terms(&ctx, &[vec![1u64]], vec![Integer::new(1)]);
        assert!(matches!(err, Err(PolyError::DimensionMismatch(_))));
        assert!(SparsePoly::var(&ctx, 2).is_err());
    }

    #[test]
    fn test_add_sub_cancel() {
        let ctx = Context::new(3, MonomialOrder::DegRevLex, Z);
        let p = zpoly(&ctx, &[(&[1, 2, 0], 4), (&[0, 0, 3], -1)]);
        let q = zpoly(&ctx, &[(&[0, 0, 3], 1), (&[1, 0, 0], 5)]);
        let sum = p.add(&q).unwrap();
        assert_eq!(sum.term_count(), 2);
        assert!(p.sub(&p).unwrap().is_zero());
        assert_eq!(sum.sub(&q).unwrap(), p);
    }

    #[test]
    fn test_mixed_widths() {
        let ctx = Context::new(2, MonomialOrder::DegLex, Z);
        let small = zpoly(&ctx, &[(&[1, 1], 1)]);
        let big = zpoly(&ctx, &[(&[1000, 0], 1)]);
        assert_eq!(small.bits(), 8);
        assert_eq!(big.bits(), 16);
        let sum = small.add(&big).unwrap();
        assert_eq!(sum.bits(), 16);
        assert_eq!(sum.exponents(0).as_slice(), &[1000, 0]);
    }

    #[test]
    fn test_incompatible_contexts() {
        let a = Context::new(2, MonomialOrder::Lex, Z);
        let b = Context::new(3, MonomialOrder::Lex, Z);
        let p = SparsePoly::one(&a);
        let q = SparsePoly::one(&b);
        assert!(matches!(p.add(&q), Err(PolyError::DimensionMismatch(_))));

        // structurally equal contexts are compatible
        let c = Context::new(2, MonomialOrder::Lex, Z);
        assert_eq!(p.mul(&SparsePoly::one(&c)).unwrap(), p);
    }

    #[test]
    fn test_mul_grows_width() {
        let ctx = Context::new(1, MonomialOrder::Lex, Z);
        let p = zpoly(&ctx, &[(&[100], 1), (&[0], 1)]);
        let sq = p.mul(&p).unwrap();
        assert_eq!(sq.bits(), 16);
        assert_eq!(sq.exponents(0).as_slice(), &[200]);
        assert_eq!(sq.coeff(1), &Integer::new(2));
    }

    #[test]
    fn test_pow() {
        let ctx = Context::new(2, MonomialOrder::DegLex, Z);
        let x = SparsePoly::var(&ctx, 0).unwrap();
        let y = SparsePoly::var(&ctx, 1).unwrap();
        let s = x.add(&y).unwrap();
        let cube = s.pow(3).unwrap();
        assert_eq!(cube.term_count(), 4);
        assert_eq!(cube.coeff(1), &Integer::new(3));

        let mono = zpoly(&ctx, &[(&[3, 1], 2)]);
        let m5 = mono.pow(5).unwrap();
        assert_eq!(m5.exponents(0).as_slice(), &[15, 5]);
        assert_eq!(m5.coeff(0), &Integer::new(32));
        assert!(s.pow(0).unwrap().is_one());
    }

    #[test]
    fn test_pow_overflow() {
        let ctx = Context::new(1, MonomialOrder::Lex, Z);
        let x = SparsePoly::var(&ctx, 0).unwrap();
        assert_eq!(x.pow(1 << 63), Err(PolyError::ExponentOverflow));
    }

    #[test]
    fn test_zero_divisors_drop_terms() {
        let ctx = Context::new(1, MonomialOrder::Lex, Zn::new(12));
        let p = SparsePoly::from_pairs(&ctx, [(vec![1], 4), (vec![0], 3)]).unwrap();
        let scaled = p.scale(&3);
        assert_eq!(scaled.term_count(), 1);
        assert_eq!(scaled.coeff(0), &9);
    }

    #[test]
    fn test_content_and_monic() {
        let ctx = Context::new(2, MonomialOrder::Lex, Z);
        let p = zpoly(&ctx, &[(&[1, 0], -6), (&[0, 1], 9)]);
        assert_eq!(p.content(), Integer::new(3));
        let pp = p.primitive_part().unwrap();
        assert_eq!(pp.coeff(0), &Integer::new(-2));
        assert_eq!(pp.unit_normalize().coeff(0), &Integer::new(2));
        assert_eq!(p.make_monic(), Err(PolyError::RingNotInvertible));

        let fctx = Context::new(1, MonomialOrder::Lex, FiniteField::new(7));
        let f = SparsePoly::from_pairs(&fctx, [(vec![2], 3), (vec![0], 1)]).unwrap();
        let monic = f.make_monic().unwrap();
        assert_eq!(monic.coeff(0), &1);
        assert_eq!(monic.coeff(1), &5);
    }

    #[test]
    fn test_degrees() {
        let ctx = Context::new(3, MonomialOrder::Lex, Z);
        let p = zpoly(&ctx, &[(&[2, 0, 1], 1), (&[1, 5, 0], 1), (&[0, 0, 7], 1)]);
        assert_eq!(p.degree(0), Some(2));
        assert_eq!(p.degree(1), Some(5));
        assert_eq!(p.degree(3), None);
        assert_eq!(p.degrees().unwrap().as_slice(), &[2, 5, 7]);
        assert_eq!(p.total_degree(), Some(7));
        assert_eq!(SparsePoly::new(&ctx).total_degree(), None);
    }

    #[test]
    fn test_display() {
        let ctx = Context::new(2, MonomialOrder::DegLex, Z);
        let p = zpoly(&ctx, &[(&[1, 1], -1), (&[0, 0], 7), (&[0, 2], 3)]);
        assert_eq!(p.to_string(), "-x0*x1 + 3*x1^2 + 7");
        assert_eq!(SparsePoly::new(&ctx).to_string(), "0");
    }
}
