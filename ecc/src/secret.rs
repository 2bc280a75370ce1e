//! A wrapper for secret key material that prevents accidental leakage.
//!
//! - Debug and Display always show `[REDACTED]`
//! - The bytes are zeroized on drop
//! - Access requires an explicit `expose()` call
//! - Equality is evaluated in constant time

use std::fmt::{Debug, Display, Formatter};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret bytes (a big-endian ECDSA exponent or an EdDSA seed).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Exposes the secret bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Display for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        // Lengths are public (fixed by the curve)
        self.0.len() == other.0.len() && bool::from(self.0.ct_eq(&other.0))
    }
}

impl Eq for Secret {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted() {
        let secret = Secret::new(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
        assert_eq!(secret.expose(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_equality() {
        let a = Secret::new(vec![1, 2, 3]);
        assert_eq!(a, Secret::new(vec![1, 2, 3]));
        assert_ne!(a, Secret::new(vec![1, 2, 4]));
        assert_ne!(a, Secret::new(vec![1, 2]));
    }

    #[test]
    fn test_zeroize() {
        let mut secret = Secret::new(vec![1, 2, 3]);
        secret.zeroize();
        assert!(secret.expose().is_empty());
    }
}
