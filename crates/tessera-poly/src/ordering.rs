//! Monomial orderings.
//!
//! An ordering only decides how exponent fields are laid out inside the
//! packed words (see [`ExpLayout`](crate::monomial::ExpLayout)); once
//! packed, every ordering compares as an unsigned multi-word integer.

/// A monomial ordering with `x0 > x1 > ... > x(n-1)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum MonomialOrder {
    /// Lexicographic order.
    ///
    /// `x^a > x^b` iff the first nonzero difference `a_i - b_i` is positive.
    #[default]
    Lex,

    /// Graded lexicographic order.
    ///
    /// Compares total degree first, then lex.
    DegLex,

    /// Graded reverse lexicographic order.
    ///
    /// Compares total degree first; ties go to the monomial whose last
    /// differing exponent is smaller.
    DegRevLex,
}

impl MonomialOrder {
    /// Returns true if the packed layout carries a total-degree field.
    #[must_use]
    pub const fn is_graded(&self) -> bool {
        matches!(self, MonomialOrder::DegLex | MonomialOrder::DegRevLex)
    }

    /// Number of packed fields for `nvars` variables.
    #[must_use]
    pub const fn field_count(&self, nvars: usize) -> usize {
        if self.is_graded() {
            nvars + 1
        } else {
            nvars
        }
    }

    /// Packed field index that stores the exponent of variable `var`.
    #[must_use]
    pub const fn var_field(&self, var: usize, nvars: usize) -> usize {
        match self {
            MonomialOrder::Lex => var,
            MonomialOrder::DegLex => var + 1,
            MonomialOrder::DegRevLex => nvars - var,
        }
    }

    /// Returns true if the field is stored complemented for comparison.
    #[must_use]
    pub const fn is_reversed_field(&self, field: usize) -> bool {
        matches!(self, MonomialOrder::DegRevLex) && field > 0
    }

    /// Returns a short name for the ordering.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            MonomialOrder::Lex => "lex",
            MonomialOrder::DegLex => "deglex",
            MonomialOrder::DegRevLex => "degrevlex",
        }
    }
}

impl std::fmt::Display for MonomialOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_layout() {
        assert_eq!(MonomialOrder::Lex.field_count(3), 3);
        assert_eq!(MonomialOrder::DegLex.field_count(3), 4);

        assert_eq!(MonomialOrder::Lex.var_field(0, 3), 0);
        assert_eq!(MonomialOrder::DegLex.var_field(0, 3), 1);
        // degrevlex stores variables last-to-first after the degree
        assert_eq!(MonomialOrder::DegRevLex.var_field(0, 3), 3);
        assert_eq!(MonomialOrder::DegRevLex.var_field(2, 3), 1);
    }

    #[test]
    fn test_reversed_fields() {
        assert!(!MonomialOrder::DegRevLex.is_reversed_field(0));
        assert!(MonomialOrder::DegRevLex.is_reversed_field(1));
        assert!(!MonomialOrder::DegLex.is_reversed_field(1));
    }

    #[test]
    fn test_display() {
        assert_eq!(MonomialOrder::DegRevLex.to_string(), "degrevlex");
    }
}
