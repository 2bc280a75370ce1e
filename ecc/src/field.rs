//! Arithmetic modulo a prime.
//!
//! The same type serves the base field of a curve (coordinates modulo `p`) and its scalar field
//! (exponents modulo the group order `n`). Operands are reduced on entry, so callers may pass any
//! non-negative integer.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

/// Small primes used for trial division and as Miller-Rabin witnesses.
const SMALL_PRIMES: [u32; 20] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71,
];

/// Upper bound on candidates tried when searching for a quadratic non-residue.
const NON_RESIDUE_SEARCH: u32 = 1 << 16;

/// Returns whether `n` is (with overwhelming likelihood) prime.
///
/// Runs Miller-Rabin with the fixed witnesses in [SMALL_PRIMES], which is deterministic below
/// 2^64 and rejects every composite of cryptographic size seen in practice.
pub fn is_probable_prime(n: &BigUint) -> bool {
    if *n < BigUint::from(2u32) {
        return false;
    }
    for p in SMALL_PRIMES {
        if *n == BigUint::from(p) {
            return true;
        }
        if (n % p).is_zero() {
            return false;
        }
    }

    // n - 1 = d * 2^s with d odd
    let minus_one = n - 1u32;
    let s = minus_one.trailing_zeros().unwrap_or(0);
    let d = &minus_one >> s;
    'witness: for w in SMALL_PRIMES {
        let mut x = BigUint::from(w).modpow(&d, n);
        if x.is_one() || x == minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// A prime field `GF(p)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    modulus: BigUint,
}

impl Field {
    /// Creates the field of integers modulo `modulus`.
    pub fn new(modulus: BigUint) -> Self {
        Self { modulus }
    }

    /// Returns the modulus.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Returns the bit length of the modulus.
    pub fn bits(&self) -> u64 {
        self.modulus.bits()
    }

    pub fn reduce(&self, a: &BigUint) -> BigUint {
        a % &self.modulus
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.modulus
    }

    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let a = self.reduce(a);
        let b = self.reduce(b);
        if a >= b {
            a - b
        } else {
            &self.modulus - b + a
        }
    }

    pub fn neg(&self, a: &BigUint) -> BigUint {
        let a = self.reduce(a);
        if a.is_zero() {
            a
        } else {
            &self.modulus - a
        }
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.modulus
    }

    pub fn square(&self, a: &BigUint) -> BigUint {
        self.mul(a, a)
    }

    pub fn pow(&self, a: &BigUint, exp: &BigUint) -> BigUint {
        a.modpow(exp, &self.modulus)
    }

    /// Returns the multiplicative inverse of `a`, or `None` if `a` is zero (or shares a factor
    /// with the modulus).
    pub fn inv(&self, a: &BigUint) -> Option<BigUint> {
        let a = self.reduce(a);
        if a.is_zero() {
            return None;
        }
        let m = BigInt::from(self.modulus.clone());
        let e = BigInt::from(a).extended_gcd(&m);
        if !e.gcd.is_one() {
            return None;
        }
        e.x.mod_floor(&m).to_biguint()
    }

    /// Returns whether `a` is a quadratic residue (zero counts as a square).
    pub fn is_square(&self, a: &BigUint) -> bool {
        let a = self.reduce(a);
        if a.is_zero() || self.modulus == BigUint::from(2u32) {
            return true;
        }
        let exp = (&self.modulus - 1u32) >> 1;
        self.pow(&a, &exp).is_one()
    }

    /// Returns a square root of `a`, or `None` if `a` is not a quadratic residue.
    ///
    /// Which of the two roots is returned is unspecified; callers select by parity.
    pub fn sqrt(&self, a: &BigUint) -> Option<BigUint> {
        let p = &self.modulus;
        let a = self.reduce(a);
        if a.is_zero() || *p == BigUint::from(2u32) {
            return Some(a);
        }
        if !self.is_square(&a) {
            return None;
        }

        // p = 3 (mod 4)
        if (p % 4u32) == BigUint::from(3u32) {
            let exp = (p + 1u32) >> 2;
            return Some(self.pow(&a, &exp));
        }

        // Tonelli-Shanks: write p - 1 = q * 2^s with q odd
        let one = BigUint::one();
        let minus_one = p - 1u32;
        let mut q = minus_one.clone();
        let mut s = 0u64;
        while q.is_even() {
            q >>= 1;
            s += 1;
        }
        let half = &minus_one >> 1;
        let z = (2..NON_RESIDUE_SEARCH)
            .map(BigUint::from)
            .find(|z| self.pow(z, &half) == minus_one)?;

        let mut m = s;
        let mut c = self.pow(&z, &q);
        let mut t = self.pow(&a, &q);
        let mut r = self.pow(&a, &((&q + 1u32) >> 1));
        while t != one {
            // Least i with t^(2^i) = 1 (always below m for a residue modulo a prime)
            let mut i = 0u64;
            let mut t2 = t.clone();
            while t2 != one {
                t2 = self.square(&t2);
                i += 1;
                if i >= m {
                    return None;
                }
            }
            let b = self.pow(&c, &(BigUint::one() << (m - i - 1)));
            m = i;
            c = self.square(&b);
            t = self.mul(&t, &c);
            r = self.mul(&r, &b);
        }
        Some(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(p: u64) -> Field {
        Field::new(BigUint::from(p))
    }

    fn n(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_add_sub_wraps() {
        let f = field(163);
        assert_eq!(f.add(&n(100), &n(70)), n(7));
        assert_eq!(f.sub(&n(7), &n(70)), n(100));
        assert_eq!(f.sub(&n(70), &n(7)), n(63));
        assert_eq!(f.neg(&n(0)), n(0));
        assert_eq!(f.neg(&n(1)), n(162));
        assert_eq!(f.sub(&n(400), &n(3)), n(71));
    }

    #[test]
    fn test_inverse() {
        let f = field(167);
        for a in 1..167u64 {
            let inv = f.inv(&n(a)).unwrap();
            assert_eq!(f.mul(&n(a), &inv), n(1), "a={a}");
        }
    }

    #[test]
    fn test_inverse_of_zero() {
        let f = field(167);
        assert!(f.inv(&n(0)).is_none());
        assert!(f.inv(&n(167)).is_none());
    }

    #[test]
    fn test_sqrt_three_mod_four() {
        // 163 = 3 (mod 4)
        let f = field(163);
        for a in 0..163u64 {
            let square = f.square(&n(a));
            let root = f.sqrt(&square).unwrap();
            assert_eq!(f.square(&root), square);
        }
    }

    #[test]
    fn test_sqrt_tonelli_shanks() {
        // 241 - 1 = 15 * 2^4, exercises the general path
        let f = field(241);
        let mut residues = 0;
        for a in 0..241u64 {
            match f.sqrt(&n(a)) {
                Some(root) => {
                    assert_eq!(f.square(&root), n(a));
                    residues += 1;
                }
                None => assert!(!f.is_square(&n(a))),
            }
        }
        // Zero plus (p - 1) / 2 non-zero residues
        assert_eq!(residues, 121);
    }

    #[test]
    fn test_is_probable_prime() {
        let primes: Vec<u64> = (0..200).filter(|&v| is_probable_prime(&n(v))).collect();
        let expected: Vec<u64> = (2..200u64)
            .filter(|&v| (2..v).take_while(|d| d * d <= v).all(|d| v % d != 0))
            .collect();
        assert_eq!(primes, expected);

        // Carmichael numbers and a strong pseudoprime to base 2
        for v in [561u64, 1105, 1729, 2047, 3215031751] {
            assert!(!is_probable_prime(&n(v)), "v={v}");
        }
        assert!(is_probable_prime(&((BigUint::one() << 255u32) - 19u32)));
        assert!(is_probable_prime(&((BigUint::one() << 521u32) - 1u32)));
        assert!(!is_probable_prime(&((BigUint::one() << 256u32) - 1u32)));
    }

    #[test]
    fn test_sqrt_composite_modulus_terminates() {
        // 65 = 1 (mod 4) is composite; no element passes the non-residue test
        let f = field(65);
        for a in 0..65u64 {
            if let Some(root) = f.sqrt(&n(a)) {
                assert_eq!(f.square(&root), n(a) % 65u32);
            }
        }
    }

    #[test]
    fn test_sqrt_curve25519_field() {
        let p = (BigUint::one() << 255u32) - 19u32;
        let f = Field::new(p);
        let square = f.square(&n(123456789));
        let root = f.sqrt(&square).unwrap();
        assert_eq!(f.square(&root), square);

        // 2 is a non-residue modulo 2^255 - 19
        assert!(f.sqrt(&n(2)).is_none());
    }
}
