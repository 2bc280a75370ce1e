//! Digest providers consumed by the signature engines.

use hmac::{digest::core_api::BlockSizeUser, Mac, SimpleHmac};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};
use std::fmt;

/// Hash function applied to messages before ECDSA signing and used to instantiate the
/// HMAC-DRBG of RFC 6979.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Returns the digest of `msg`.
    pub fn digest(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(msg).to_vec(),
            Self::Sha224 => Sha224::digest(msg).to_vec(),
            Self::Sha256 => Sha256::digest(msg).to_vec(),
            Self::Sha384 => Sha384::digest(msg).to_vec(),
            Self::Sha512 => Sha512::digest(msg).to_vec(),
        }
    }

    /// Length of the digest in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Computes `HMAC(key, parts[0] || parts[1] || ...)`.
    pub fn hmac(&self, key: &[u8], parts: &[&[u8]]) -> Vec<u8> {
        match self {
            Self::Sha1 => mac::<Sha1>(key, parts),
            Self::Sha224 => mac::<Sha224>(key, parts),
            Self::Sha256 => mac::<Sha256>(key, parts),
            Self::Sha384 => mac::<Sha384>(key, parts),
            Self::Sha512 => mac::<Sha512>(key, parts),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        };
        f.write_str(name)
    }
}

fn mac<D: Digest + BlockSizeUser>(key: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut mac =
        <SimpleHmac<D> as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
    for part in parts {
        Mac::update(&mut mac, part);
    }
    Mac::finalize(mac).into_bytes().to_vec()
}

/// Hash used by an EdDSA instantiation (RFC 8032).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdwardsHash {
    /// SHA-512 with no domain separation (Ed25519).
    Sha512,
    /// SHAKE256 with a 114-byte output prefixed by `dom4(0, "")` (Ed448).
    Shake256,
}

impl EdwardsHash {
    /// Domain separation prefix for pure signing with an empty context.
    pub fn dom(&self) -> &'static [u8] {
        match self {
            Self::Sha512 => b"",
            Self::Shake256 => b"SigEd448\x00\x00",
        }
    }

    /// Hashes the concatenation of `parts`.
    ///
    /// The domain prefix is not added here; callers include it where RFC 8032 requires it.
    pub fn digest(&self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            Self::Sha512 => {
                let mut hasher = Sha512::new();
                for part in parts {
                    Digest::update(&mut hasher, part);
                }
                hasher.finalize().to_vec()
            }
            Self::Shake256 => {
                let mut hasher = Shake256::default();
                for part in parts {
                    Update::update(&mut hasher, part);
                }
                let mut out = vec![0u8; 114];
                hasher.finalize_xof().read(&mut out);
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{from_hex_formatted, hex};
    use test_case::test_case;

    #[test_case(HashAlgorithm::Sha1, "a9993e364706816aba3e25717850c26c9cd0d89d"; "sha1")]
    #[test_case(HashAlgorithm::Sha224, "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7"; "sha224")]
    #[test_case(HashAlgorithm::Sha256, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"; "sha256")]
    fn test_digest_abc(alg: HashAlgorithm, expected: &str) {
        let digest = alg.digest(b"abc");
        assert_eq!(digest.len(), alg.output_len());
        assert_eq!(hex(&digest), expected);
    }

    #[test]
    fn test_output_lengths() {
        assert_eq!(HashAlgorithm::Sha384.digest(b"").len(), 48);
        assert_eq!(HashAlgorithm::Sha512.digest(b"").len(), 64);
    }

    #[test]
    fn test_hmac_rfc4231_case_2() {
        let mac = HashAlgorithm::Sha256.hmac(b"Jefe", &[b"what do ya want ", b"for nothing?"]);
        let expected = from_hex_formatted(
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843",
        )
        .unwrap();
        assert_eq!(mac, expected);
    }

    #[test]
    fn test_shake256_length_and_dom() {
        let out = EdwardsHash::Shake256.digest(&[b""]);
        assert_eq!(out.len(), 114);
        assert_eq!(EdwardsHash::Shake256.dom().len(), 10);
        assert!(EdwardsHash::Sha512.dom().is_empty());
        assert_eq!(
            EdwardsHash::Sha512.digest(&[b"a", b"bc"]),
            HashAlgorithm::Sha512.digest(b"abc")
        );
    }
}
