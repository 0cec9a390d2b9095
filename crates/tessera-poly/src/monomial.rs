//! Packed exponent vectors.
//!
//! A monomial is stored as a fixed number of `u64` words. Each exponent
//! field is `bits` wide, where `bits` is one of [`FIELD_WIDTHS`], and the
//! top bit of every field is a guard that must stay clear. Fields are
//! laid out most significant first so that, after XOR-ing a per-ordering
//! mask, comparing monomials is an unsigned comparison of the words in
//! order. Graded orderings prepend a total-degree field.
//!
//! With guard bits in place, multiplication is a word-wise add and
//! division a word-wise subtract: no carry or borrow can cross a field
//! boundary, and overflow or a negative exponent shows up in a guard bit.

use std::cmp::Ordering;

use smallvec::{smallvec, SmallVec};

use crate::error::{PolyError, Result};
use crate::ordering::MonomialOrder;

/// Supported field widths, narrowest first.
pub const FIELD_WIDTHS: [u32; 4] = [8, 16, 32, 64];

/// One packed monomial.
pub type Packed = SmallVec<[u64; 4]>;

/// One unpacked exponent vector.
pub type Exponents = SmallVec<[u64; 8]>;

/// Exclusive upper bound for a value stored in a field of `bits` bits.
#[inline]
#[must_use]
pub const fn field_limit(bits: u32) -> u64 {
    1u64 << (bits - 1)
}

/// The narrowest field width that can store `max`.
///
/// # Errors
///
/// Returns [`PolyError::ExponentOverflow`] if `max` needs 64 bits or more.
pub fn bits_for(max: u64) -> Result<u32> {
    FIELD_WIDTHS
        .iter()
        .copied()
        .find(|&bits| max < field_limit(bits))
        .ok_or(PolyError::ExponentOverflow)
}

/// Word layout of packed monomials for one ordering and field width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpLayout {
    nvars: usize,
    order: MonomialOrder,
    bits: u32,
    per_word: usize,
    words: usize,
    cmp_mask: Packed,
    guard_mask: Packed,
}

impl ExpLayout {
    /// Creates the layout for `nvars` variables at the given width.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not one of [`FIELD_WIDTHS`].
    #[must_use]
    pub fn new(nvars: usize, order: MonomialOrder, bits: u32) -> Self {
        assert!(FIELD_WIDTHS.contains(&bits), "unsupported field width {bits}");
        let per_word = (64 / bits) as usize;
        let nfields = order.field_count(nvars);
        let words = nfields.div_ceil(per_word).max(1);

        let mut layout = Self {
            nvars,
            order,
            bits,
            per_word,
            words,
            cmp_mask: smallvec![0; words],
            guard_mask: smallvec![0; words],
        };
        let value_mask = field_limit(bits) - 1;
        for field in 0..nfields {
            let (w, shift) = layout.locate(field);
            layout.guard_mask[w] |= field_limit(bits) << shift;
            if order.is_reversed_field(field) {
                layout.cmp_mask[w] |= value_mask << shift;
            }
        }
        layout
    }

    /// Number of variables.
    #[must_use]
    pub const fn nvars(&self) -> usize {
        self.nvars
    }

    /// The monomial ordering.
    #[must_use]
    pub const fn order(&self) -> MonomialOrder {
        self.order
    }

    /// Field width in bits.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Words per packed monomial.
    #[must_use]
    pub const fn words(&self) -> usize {
        self.words
    }

    /// Number of packed fields, including the degree field.
    #[must_use]
    pub const fn field_count(&self) -> usize {
        self.order.field_count(self.nvars)
    }

    /// Largest storable field value.
    #[must_use]
    pub const fn max_value(&self) -> u64 {
        field_limit(self.bits) - 1
    }

    /// Per-word comparison mask.
    #[must_use]
    pub fn cmp_mask(&self) -> &[u64] {
        &self.cmp_mask
    }

    #[inline]
    fn locate(&self, field: usize) -> (usize, u32) {
        let slot = (field % self.per_word) as u32;
        (field / self.per_word, 64 - self.bits * (slot + 1))
    }

    #[inline]
    fn value_bits(&self) -> u64 {
        if self.bits == 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }

    /// Reads packed field `field`.
    #[inline]
    #[must_use]
    pub fn field(&self, packed: &[u64], field: usize) -> u64 {
        let (w, shift) = self.locate(field);
        (packed[w] >> shift) & self.value_bits()
    }

    #[inline]
    fn set_field(&self, packed: &mut [u64], field: usize, value: u64) {
        let (w, shift) = self.locate(field);
        packed[w] &= !(self.value_bits() << shift);
        packed[w] |= value << shift;
    }

    /// Exponent of variable `var`.
    #[inline]
    #[must_use]
    pub fn exponent(&self, packed: &[u64], var: usize) -> u64 {
        self.field(packed, self.order.var_field(var, self.nvars))
    }

    /// Total degree of a packed monomial.
    #[must_use]
    pub fn degree(&self, packed: &[u64]) -> u64 {
        if self.order.is_graded() {
            self.field(packed, 0)
        } else {
            (0..self.nvars).map(|v| self.exponent(packed, v)).sum()
        }
    }

    /// Packs an exponent vector into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::ExponentOverflow`] if an exponent or the total
    /// degree does not fit this width, and
    /// [`PolyError::DimensionMismatch`] if `exps` has the wrong length.
    pub fn pack_into(&self, exps: &[u64], out: &mut [u64]) -> Result<()> {
        if exps.len() != self.nvars {
            return Err(PolyError::DimensionMismatch(format!(
                "exponent vector of length {} for {} variables",
                exps.len(),
                self.nvars
            )));
        }
        out.fill(0);
        let mut degree = 0u64;
        for (var, &e) in exps.iter().enumerate() {
            if e > self.max_value() {
                return Err(PolyError::ExponentOverflow);
            }
            degree = degree.checked_add(e).ok_or(PolyError::ExponentOverflow)?;
            self.set_field(out, self.order.var_field(var, self.nvars), e);
        }
        if self.order.is_graded() {
            if degree > self.max_value() {
                return Err(PolyError::ExponentOverflow);
            }
            self.set_field(out, 0, degree);
        }
        Ok(())
    }

    /// Packs an exponent vector.
    ///
    /// # Errors
    ///
    /// See [`ExpLayout::pack_into`].
    pub fn pack(&self, exps: &[u64]) -> Result<Packed> {
        let mut out: Packed = smallvec![0; self.words];
        self.pack_into(exps, &mut out)?;
        Ok(out)
    }

    /// Unpacks to one exponent per variable.
    #[must_use]
    pub fn unpack(&self, packed: &[u64]) -> Exponents {
        (0..self.nvars).map(|v| self.exponent(packed, v)).collect()
    }

    /// Compares two packed monomials in this ordering.
    #[inline]
    #[must_use]
    pub fn compare(&self, a: &[u64], b: &[u64]) -> Ordering {
        for ((&x, &y), &m) in a.iter().zip(b).zip(&self.cmp_mask) {
            match (x ^ m).cmp(&(y ^ m)) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Writes `a * b` into `out`.
    ///
    /// The caller picks a width wide enough for the product; check
    /// [`ExpLayout::overflowed`] otherwise.
    #[inline]
    pub fn add(&self, a: &[u64], b: &[u64], out: &mut [u64]) {
        for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
            *o = x.wrapping_add(y);
        }
    }

    /// Returns true if any guard bit is set.
    #[inline]
    #[must_use]
    pub fn overflowed(&self, packed: &[u64]) -> bool {
        packed.iter().zip(&self.guard_mask).any(|(&w, &g)| w & g != 0)
    }

    /// Writes `a / b` into `out` and returns true if `b` divides `a`.
    ///
    /// `out` is unspecified when the result is false.
    #[inline]
    pub fn divides(&self, a: &[u64], b: &[u64], out: &mut [u64]) -> bool {
        let mut ok = true;
        for (((o, &x), &y), &g) in out.iter_mut().zip(a).zip(b).zip(&self.guard_mask) {
            // Setting every guard first absorbs per-field borrows; a field
            // borrowed iff its guard is cleared by the subtraction.
            let d = (x | g).wrapping_sub(y);
            ok &= d & g == g;
            *o = d ^ g;
        }
        ok
    }

    /// Returns true if the packed monomial is 1.
    #[must_use]
    pub fn is_one(&self, packed: &[u64]) -> bool {
        packed.iter().all(|&w| w == 0)
    }

    /// Per-field maxima over a flat array of packed monomials.
    #[must_use]
    pub fn max_fields(&self, exps: &[u64]) -> Exponents {
        let mut maxima: Exponents = smallvec![0; self.field_count()];
        for packed in exps.chunks_exact(self.words) {
            for (field, m) in maxima.iter_mut().enumerate() {
                *m = (*m).max(self.field(packed, field));
            }
        }
        maxima
    }

    /// Per-variable minima over a flat array of packed monomials.
    ///
    /// This is the exponent vector of the monomial gcd.
    #[must_use]
    pub fn min_exponents(&self, exps: &[u64]) -> Exponents {
        let mut minima: Exponents = smallvec![u64::MAX; self.nvars];
        let mut any = false;
        for packed in exps.chunks_exact(self.words) {
            any = true;
            for (var, m) in minima.iter_mut().enumerate() {
                *m = (*m).min(self.exponent(packed, var));
            }
        }
        if !any {
            minima.fill(0);
        }
        minima
    }

    /// Returns the same ordering at a different width.
    #[must_use]
    pub fn with_bits(&self, bits: u32) -> Self {
        Self::new(self.nvars, self.order, bits)
    }

    /// Re-encodes a flat array packed under `from` into this layout.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::ExponentOverflow`] if a field does not fit.
    pub fn repack(&self, from: &ExpLayout, exps: &[u64]) -> Result<Vec<u64>> {
        if from == self {
            return Ok(exps.to_vec());
        }
        let mut out = vec![0u64; exps.len() / from.words * self.words];
        for (src, dst) in exps.chunks_exact(from.words).zip(out.chunks_exact_mut(self.words)) {
            self.pack_into(&from.unpack(src), dst)?;
        }
        Ok(out)
    }
}

/// Width needed to hold `a + b` for all field maxima `a`, `b`.
///
/// # Errors
///
/// Returns [`PolyError::ExponentOverflow`] if a sum needs 64 bits.
pub fn bits_for_sum(a: &[u64], b: &[u64]) -> Result<u32> {
    let mut max = 0u64;
    for (&x, &y) in a.iter().zip(b) {
        max = max.max(x.checked_add(y).ok_or(PolyError::ExponentOverflow)?);
    }
    bits_for(max)
}

/// Width needed to hold every field maximum.
///
/// # Errors
///
/// Returns [`PolyError::ExponentOverflow`] if a value needs 64 bits.
pub fn bits_for_fields(maxima: &[u64]) -> Result<u32> {
    bits_for(maxima.iter().copied().max().unwrap_or(0))
}
