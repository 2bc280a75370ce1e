//! Sign and verify with ECDSA and EdDSA over Weierstrass and Edwards curves.
//!
//! # Overview
//!
//! Keys ([SigningKey], [VerifyingKey]) are bound to a [Curve] from the [curve] catalogue
//! (or to a caller-defined curve) and dispatch to the [ecdsa] engine for short Weierstrass
//! curves or to the [eddsa] engine for twisted Edwards curves. ECDSA signatures are plain
//! `(r, s)` pairs ([Signature]) that can be moved between the raw, DER and strings encodings;
//! EdDSA signatures are opaque fixed-length byte strings.
//!
//! All arithmetic is performed over arbitrary precision integers so that the same code paths
//! serve named curves and small toy curves used to exercise degenerate cases.
//!
//! # Example
//!
//! ```rust
//! use commonware_ecc::{curve, Encoding, SigningKey};
//! use rand::rngs::OsRng;
//!
//! // Generate a new private key
//! let signer = SigningKey::generate(&curve::nist_p256(), &mut OsRng).unwrap();
//!
//! // Sign a message (nonce derived per RFC 6979)
//! let msg = b"hello, world!";
//! let signature = signer.sign_deterministic(msg, Encoding::Der, &[]).unwrap();
//!
//! // Verify the signature
//! assert!(signer.verifying_key().verify(&signature, msg).is_ok());
//! ```
//!
//! # Status
//!
//! `commonware-ecc` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

use thiserror::Error;

pub mod curve;
pub use curve::{Config, Curve, CurveEncoding, EdwardsParameters, ExplicitParameters};
pub mod ecdsa;
pub use ecdsa::RecoveryId;
pub mod eddsa;
pub mod edwards;
pub mod field;
pub mod hash;
pub use hash::{EdwardsHash, HashAlgorithm};
pub mod keys;
pub use keys::{SigningKey, VerifyingKey};
pub mod point;
pub use point::Point;
pub mod rfc6979;
mod secret;
pub mod signature;
pub use signature::{Encoded, Encoding, Signature};
pub mod utils;
pub mod weierstrass;
pub use weierstrass::PointEncoding;

/// Errors that can occur when constructing keys, decoding material, signing or verifying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bad byte length, invalid point encoding, point not on the curve, etc.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// Structural violation of a DER encoding.
    #[error("unexpected encoding: {0}")]
    UnexpectedEncoding(String),
    /// The operation is not defined for the curve family or is disabled by configuration.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// The signature is well-formed but does not match the message and key.
    #[error("signature verification failed")]
    VerificationFailure,
}

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        Self::UnexpectedEncoding(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }
}
