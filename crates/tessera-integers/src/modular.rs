//! Word-size modular arithmetic.
//!
//! Moduli are chosen at runtime: the modular GCD walks a sequence of
//! primes, so the modulus cannot be a compile-time constant. Products are
//! formed in `u128` and reduced once.

use crate::Integer;

/// Arithmetic modulo a runtime `u64` modulus.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Modulus {
    n: u64,
}

impl Modulus {
    /// Creates a modulus.
    ///
    /// # Panics
    ///
    /// Panics if `n < 2`.
    #[must_use]
    pub fn new(n: u64) -> Self {
        assert!(n >= 2, "modulus must be at least 2");
        Self { n }
    }

    /// Returns the modulus.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.n
    }

    /// Reduces an arbitrary word.
    #[must_use]
    pub const fn reduce(self, a: u64) -> u64 {
        a % self.n
    }

    /// Reduces a double-width value.
    #[must_use]
    pub const fn reduce_wide(self, a: u128) -> u64 {
        (a % self.n as u128) as u64
    }

    /// Maps a signed value into `[0, n)`.
    #[must_use]
    pub fn from_signed(self, value: i64) -> u64 {
        let r = i128::from(value).rem_euclid(i128::from(self.n));
        r as u64
    }

    /// Lifts a residue into the symmetric range.
    #[must_use]
    pub fn to_signed(self, a: u64) -> i128 {
        if a > self.n / 2 {
            i128::from(a) - i128::from(self.n)
        } else {
            i128::from(a)
        }
    }

    /// Modular addition of reduced operands.
    #[must_use]
    pub const fn add(self, a: u64, b: u64) -> u64 {
        let (s, carry) = a.overflowing_add(b);
        if carry || s >= self.n {
            s.wrapping_sub(self.n)
        } else {
            s
        }
    }

    /// Modular subtraction of reduced operands.
    #[must_use]
    pub const fn sub(self, a: u64, b: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            a.wrapping_sub(b).wrapping_add(self.n)
        }
    }

    /// Modular negation of a reduced operand.
    #[must_use]
    pub const fn neg(self, a: u64) -> u64 {
        if a == 0 {
            0
        } else {
            self.n - a
        }
    }

    /// Modular multiplication of reduced operands.
    #[must_use]
    pub const fn mul(self, a: u64, b: u64) -> u64 {
        ((a as u128 * b as u128) % self.n as u128) as u64
    }

    /// Computes `a^exp` by binary exponentiation.
    #[must_use]
    pub fn pow(self, a: u64, mut exp: u64) -> u64 {
        let mut base = a % self.n;
        let mut result = 1 % self.n;

        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            exp >>= 1;
        }

        result
    }

    /// Computes the modular inverse using the extended Euclidean algorithm.
    ///
    /// Returns `None` if `gcd(a, n) != 1`.
    #[must_use]
    pub fn inv(self, a: u64) -> Option<u64> {
        let a = a % self.n;
        if a == 0 {
            return None;
        }

        let mut t = 0i128;
        let mut new_t = 1i128;
        let mut r = i128::from(self.n);
        let mut new_r = i128::from(a);

        while new_r != 0 {
            let quotient = r / new_r;
            (t, new_t) = (new_t, t - quotient * new_t);
            (r, new_r) = (new_r, r - quotient * new_r);
        }

        if r > 1 {
            return None;
        }

        Some(t.rem_euclid(i128::from(self.n)) as u64)
    }

    /// Greatest common divisor of a residue with the modulus.
    #[must_use]
    pub fn gcd_with_modulus(self, a: u64) -> u64 {
        gcd_u64(a % self.n, self.n)
    }
}

/// Euclid's algorithm on words.
#[must_use]
pub fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Deterministic Miller-Rabin for 64-bit integers.
#[must_use]
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut s = 0;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    let m = Modulus::new(n);
    'witness: for a in [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        let mut x = m.pow(a, d);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = m.mul(x, x);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Largest prime strictly below `n`.
#[must_use]
pub fn prev_prime(n: u64) -> Option<u64> {
    let mut candidate = n.checked_sub(1)?;
    while candidate >= 2 {
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate -= 1;
    }
    None
}

/// Well-known primes.
pub mod primes {
    /// 2^23 * 7 * 17 + 1
    pub const P998244353: u64 = 998_244_353;

    /// Mersenne prime 2^61 - 1.
    pub const MERSENNE_61: u64 = (1 << 61) - 1;

    /// Starting point for the descending prime sequence used by modular
    /// algorithms. Images stay below 2^62 so sums of two residues never wrap.
    pub const MODULAR_START: u64 = 1 << 62;
}

/// Descending sequence of primes below [`primes::MODULAR_START`].
#[derive(Clone, Debug)]
pub struct PrimeSequence {
    next_below: u64,
}

impl PrimeSequence {
    /// Starts below the default bound.
    #[must_use]
    pub fn new() -> Self {
        Self::below(primes::MODULAR_START)
    }

    /// Starts below `bound`.
    #[must_use]
    pub fn below(bound: u64) -> Self {
        Self { next_below: bound }
    }
}

impl Default for PrimeSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for PrimeSequence {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let p = prev_prime(self.next_below)?;
        self.next_below = p;
        Some(p)
    }
}

/// One Chinese-remainder step.
///
/// Given `x ≡ residue (mod modulus)` with `0 <= residue < modulus` and
/// `x ≡ r (mod p)`, returns the unique `x` in `[0, modulus * p)`.
/// `p` must be coprime to `modulus`.
#[must_use]
pub fn crt_step(residue: &Integer, modulus: &Integer, r: u64, p: u64) -> Integer {
    let m = Modulus::new(p);
    let m_mod_p = modulus.rem_u64(p);
    let res_mod_p = residue.rem_u64(p);
    let Some(m_inv) = m.inv(m_mod_p) else {
        return residue.clone();
    };
    let k = m.mul(m.sub(r % p, res_mod_p), m_inv);
    if k == 0 {
        return residue.clone();
    }
    residue + &(modulus * &Integer::from(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let m = Modulus::new(7);
        assert_eq!(m.add(5, 4), 2);
        assert_eq!(m.sub(4, 5), 6);
        assert_eq!(m.mul(5, 4), 6);
        assert_eq!(m.neg(3), 4);
        assert_eq!(m.from_signed(-3), 4);
    }

    #[test]
    fn test_large_modulus_add() {
        let m = Modulus::new(u64::MAX - 58);
        let a = u64::MAX - 60;
        assert_eq!(m.add(a, a), a - 2);
    }

    #[test]
    fn test_inverse() {
        let m = Modulus::new(7);
        assert_eq!(m.inv(3), Some(5));
        assert_eq!(m.inv(0), None);

        let composite = Modulus::new(12);
        assert_eq!(composite.inv(4), None);
        assert_eq!(composite.inv(5), Some(5));
    }

    #[test]
    fn test_pow() {
        let m = Modulus::new(7);
        assert_eq!(m.pow(3, 0), 1);
        assert_eq!(m.pow(3, 2), 2);
        assert_eq!(m.pow(3, 6), 1);
    }

    #[test]
    fn test_primality() {
        assert!(is_prime(2));
        assert!(is_prime(primes::P998244353));
        assert!(is_prime(primes::MERSENNE_61));
        assert!(!is_prime(1));
        assert!(!is_prime(561));
        assert!(!is_prime(3_215_031_751));
    }

    #[test]
    fn test_prime_sequence_descends() {
        let ps: Vec<u64> = PrimeSequence::below(30).take(4).collect();
        assert_eq!(ps, vec![29, 23, 19, 17]);

        let big: Vec<u64> = PrimeSequence::new().take(2).collect();
        assert!(big[0] > big[1]);
        assert!(big[0] < primes::MODULAR_START);
    }

    #[test]
    fn test_crt_step() {
        // x ≡ 2 (mod 3), x ≡ 3 (mod 5) => x = 8
        let x = crt_step(&Integer::new(2), &Integer::new(3), 3, 5);
        assert_eq!(x, Integer::new(8));
    }
}
