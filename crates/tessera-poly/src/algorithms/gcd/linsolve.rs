//! Gaussian elimination over prime fields.

use tessera_rings::{FiniteField, Ring};

/// Solves `m * x = rhs`, where `m` has one row per equation.
///
/// The system may be overdetermined. Returns `None` unless it has exactly
/// one solution.
pub(super) fn solve(field: &FiniteField, m: &[Vec<u64>], rhs: &[u64]) -> Option<Vec<u64>> {
    let rows = m.len();
    let cols = m.first().map_or(0, Vec::len);
    if rows != rhs.len() || rows < cols {
        return None;
    }

    // Augmented matrix [m | rhs]
    let mut aug: Vec<Vec<u64>> = m
        .iter()
        .zip(rhs)
        .map(|(row, &b)| {
            let mut r = row.clone();
            r.push(b);
            r
        })
        .collect();

    for col in 0..cols {
        let pivot = (col..rows).find(|&r| !field.is_zero(&aug[r][col]))?;
        aug.swap(col, pivot);

        // Scale pivot row to make pivot = 1
        let inv = field.inv(&aug[col][col])?;
        for x in &mut aug[col][col..] {
            *x = field.mul(x, &inv);
        }

        let pivot_row = aug[col].clone();
        for (r, row) in aug.iter_mut().enumerate() {
            if r == col || field.is_zero(&row[col]) {
                continue;
            }
            let factor = row[col];
            for (x, p) in row[col..].iter_mut().zip(&pivot_row[col..]) {
                *x = field.sub(x, &field.mul(&factor, p));
            }
        }
    }

    // Leftover equations must reduce to 0 = 0.
    if aug[cols..].iter().any(|row| !field.is_zero(&row[cols])) {
        return None;
    }
    Some(aug[..cols].iter().map(|row| row[cols]).collect())
}
