//! Dense univariate polynomials.
//!
//! Used by the GCD algorithms for content in the main variable,
//! leading-coefficient scaling and Newton interpolation, where the
//! polynomials are short and dense.

use tessera_rings::{Field, Ring};

/// A dense univariate polynomial over a ring handle.
///
/// Coefficients are stored in ascending degree order with no trailing
/// zeros; the zero polynomial has no coefficients.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DensePoly<R: Ring> {
    ring: R,
    /// Coefficients in ascending degree order.
    coeffs: Vec<R::Element>,
}

impl<R: Ring> DensePoly<R> {
    /// Creates a new polynomial from coefficients.
    #[must_use]
    pub fn new(ring: R, mut coeffs: Vec<R::Element>) -> Self {
        while coeffs.last().is_some_and(|c| ring.is_zero(c)) {
            coeffs.pop();
        }
        Self { ring, coeffs }
    }

    /// Creates the zero polynomial.
    #[must_use]
    pub fn zero(ring: R) -> Self {
        Self {
            ring,
            coeffs: Vec::new(),
        }
    }

    /// Creates the constant polynomial 1.
    #[must_use]
    pub fn one(ring: R) -> Self {
        let one = ring.one();
        Self::new(ring, vec![one])
    }

    /// Creates `x - a`.
    #[must_use]
    pub fn linear_root(ring: R, a: &R::Element) -> Self {
        let coeffs = vec![ring.neg(a), ring.one()];
        Self::new(ring, coeffs)
    }

    /// The coefficient ring.
    #[must_use]
    pub fn ring(&self) -> &R {
        &self.ring
    }

    /// Returns the degree of the polynomial, or 0 for zero.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Returns true if this is the zero polynomial.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Returns true if this is a non-zero constant.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.coeffs.len() == 1
    }

    /// Returns the leading coefficient, zero for the zero polynomial.
    #[must_use]
    pub fn leading_coeff(&self) -> R::Element {
        self.coeffs.last().cloned().unwrap_or_else(|| self.ring.zero())
    }

    /// Returns the coefficient of `x^i`.
    #[must_use]
    pub fn coeff(&self, i: usize) -> R::Element {
        self.coeffs.get(i).cloned().unwrap_or_else(|| self.ring.zero())
    }

    /// Returns all coefficients.
    #[must_use]
    pub fn coeffs(&self) -> &[R::Element] {
        &self.coeffs
    }

    /// Evaluates the polynomial at a point using Horner's method.
    #[must_use]
    pub fn eval(&self, x: &R::Element) -> R::Element {
        let r = &self.ring;
        self.coeffs
            .iter()
            .rev()
            .fold(r.zero(), |acc, c| r.add(&r.mul(&acc, x), c))
    }

    /// Adds two polynomials.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let r = &self.ring;
        let len = self.coeffs.len().max(other.coeffs.len());
        let coeffs = (0..len).map(|i| r.add(&self.coeff(i), &other.coeff(i))).collect();
        Self::new(r.clone(), coeffs)
    }

    /// Negates the polynomial.
    #[must_use]
    pub fn neg(&self) -> Self {
        let coeffs = self.coeffs.iter().map(|c| self.ring.neg(c)).collect();
        Self::new(self.ring.clone(), coeffs)
    }

    /// Subtracts two polynomials.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Multiplies two polynomials by the schoolbook method.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let r = &self.ring;
        if self.is_zero() || other.is_zero() {
            return Self::zero(r.clone());
        }

        let n = self.coeffs.len() + other.coeffs.len() - 1;
        let coeffs = (0..n)
            .map(|k| {
                let lo = k.saturating_sub(other.coeffs.len() - 1);
                let hi = k.min(self.coeffs.len() - 1);
                let mut acc = r.accumulator();
                for i in lo..=hi {
                    r.accumulate(&mut acc, &self.coeffs[i], &other.coeffs[k - i]);
                }
                r.finish(acc)
            })
            .collect();
        Self::new(r.clone(), coeffs)
    }

    /// Multiplies by a scalar.
    #[must_use]
    pub fn scale(&self, c: &R::Element) -> Self {
        let coeffs = self.coeffs.iter().map(|x| self.ring.mul(x, c)).collect();
        Self::new(self.ring.clone(), coeffs)
    }
}

impl<F: Field> DensePoly<F> {
    /// Divides with remainder by a non-zero polynomial.
    ///
    /// Returns `None` if `other` is zero.
    #[must_use]
    pub fn div_rem(&self, other: &Self) -> Option<(Self, Self)> {
        let r = &self.ring;
        let lead_inv = r.inv(other.coeffs.last()?)?;
        if self.coeffs.len() < other.coeffs.len() {
            return Some((Self::zero(r.clone()), self.clone()));
        }

        let db = other.coeffs.len() - 1;
        let mut rem = self.coeffs.clone();
        let mut quot = vec![r.zero(); rem.len() - db];
        for k in (0..quot.len()).rev() {
            let c = r.mul(&rem[k + db], &lead_inv);
            if r.is_zero(&c) {
                continue;
            }
            for (i, bc) in other.coeffs.iter().enumerate() {
                rem[k + i] = r.sub(&rem[k + i], &r.mul(&c, bc));
            }
            quot[k] = c;
        }
        rem.truncate(db);
        Some((Self::new(r.clone(), quot), Self::new(r.clone(), rem)))
    }

    /// Scales to a monic polynomial; zero stays zero.
    #[must_use]
    pub fn make_monic(&self) -> Self {
        match self.coeffs.last().and_then(|lc| self.ring.inv(lc)) {
            Some(inv) => self.scale(&inv),
            None => self.clone(),
        }
    }

    /// Monic greatest common divisor by the Euclidean algorithm.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        let mut p = self.clone();
        let mut q = other.clone();
        while !q.is_zero() {
            let Some((_, r)) = p.div_rem(&q) else {
                break;
            };
            p = q;
            q = r;
        }
        p.make_monic()
    }

    /// Exact quotient, or `None` if `other` does not divide `self`.
    #[must_use]
    pub fn div_exact(&self, other: &Self) -> Option<Self> {
        let (q, r) = self.div_rem(other)?;
        r.is_zero().then_some(q)
    }
}

impl<R: Ring> std::fmt::Display for DensePoly<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let mut terms = Vec::new();
        for (i, c) in self.coeffs.iter().enumerate().rev() {
            if self.ring.is_zero(c) {
                continue;
            }

            let term = match i {
                0 => format!("{c:?}"),
                1 => format!("{c:?}*x"),
                _ => format!("{c:?}*x^{i}"),
            };
            terms.push(term);
        }

        write!(f, "{}", terms.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_rings::{FiniteField, Z};

    #[test]
    fn test_basic_ops() {
        let z = Z;
        let p = DensePoly::new(z, vec![z.from_i64(1), z.from_i64(2)]); // 1 + 2x
        let q = DensePoly::new(z, vec![z.from_i64(3), z.from_i64(4)]); // 3 + 4x

        let sum = p.add(&q);
        assert_eq!(sum.coeff(0), z.from_i64(4));
        assert_eq!(sum.coeff(1), z.from_i64(6));
        assert!(p.sub(&p).is_zero());
    }

    #[test]
    fn test_mul_schoolbook() {
        let z = Z;
        let p = DensePoly::new(z, vec![z.from_i64(1), z.from_i64(2)]);
        let q = DensePoly::new(z, vec![z.from_i64(3), z.from_i64(4)]);

        // (1 + 2x)(3 + 4x) = 3 + 10x + 8x^2
        let prod = p.mul(&q);
        assert_eq!(prod.coeffs(), &[z.from_i64(3), z.from_i64(10), z.from_i64(8)]);
    }

    #[test]
    fn test_eval() {
        let z = Z;
        let p = DensePoly::new(z, vec![z.from_i64(1), z.from_i64(2), z.from_i64(3)]);
        // p(2) = 1 + 4 + 12 = 17
        assert_eq!(p.eval(&z.from_i64(2)), z.from_i64(17));
    }

    #[test]
    fn test_div_rem() {
        let f = FiniteField::new(101);
        // x^2 - 1 = (x - 1)(x + 1)
        let a = DensePoly::new(f, vec![f.from_i64(-1), 0, 1]);
        let b = DensePoly::linear_root(f, &1);
        let (q, r) = a.div_rem(&b).unwrap();
        assert!(r.is_zero());
        assert_eq!(q.coeffs(), &[1, 1]);
        assert!(a.div_rem(&DensePoly::zero(f)).is_none());
    }

    #[test]
    fn test_gcd() {
        let f = FiniteField::new(101);
        let x_minus_1 = DensePoly::linear_root(f, &1);
        let x_plus_2 = DensePoly::linear_root(f, &f.from_i64(-2));
        let x_minus_3 = DensePoly::linear_root(f, &3);
        let a = x_minus_1.mul(&x_plus_2).scale(&7);
        let b = x_minus_1.mul(&x_minus_3);
        assert_eq!(a.gcd(&b), x_minus_1);
        assert!(a.div_exact(&x_minus_3).is_none());
    }
}
