//! EdDSA over twisted Edwards curves ([RFC 8032](https://www.rfc-editor.org/rfc/rfc8032)).
//!
//! Only the pure variants are implemented (no pre-hashing, empty context). Verification uses
//! the cofactorless equation `[S]B = R + [k]A`.

use crate::{
    curve::{Curve, Family},
    edwards::{EdwardsCurve, EdwardsPoint},
    hash::EdwardsHash,
    point::{mul, Group, Precomputed},
    utils::to_le_fixed,
    Error,
};
use num_bigint::BigUint;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Scalar and nonce prefix derived from a seed.
pub(crate) struct ExpandedSecret {
    scalar: BigUint,
    prefix: Zeroizing<Vec<u8>>,
}

impl ExpandedSecret {
    pub fn scalar(&self) -> &BigUint {
        &self.scalar
    }
}

/// Returns the Edwards group of `curve` or fails for Weierstrass curves.
pub(crate) fn edwards(
    curve: &Curve,
) -> Result<(&Arc<EdwardsCurve>, EdwardsHash, &Precomputed<EdwardsPoint>), Error> {
    match curve.family() {
        Family::Edwards {
            curve: e,
            hash,
            table,
        } => Ok((e, *hash, table)),
        Family::Weierstrass { .. } => Err(Error::unsupported(format!(
            "EdDSA is unsupported for Weierstrass curves ({curve})"
        ))),
    }
}

/// Clears the cofactor bits and fixes the position of the highest set bit.
fn clamp(curve: &EdwardsCurve, cofactor: &BigUint, bytes: &mut [u8]) -> Result<(), Error> {
    if cofactor.count_ones() != 1 {
        return Err(Error::unsupported(format!(
            "cofactor {cofactor} is not a power of two"
        )));
    }
    let low = cofactor.trailing_zeros().unwrap_or(0);
    bytes[0] &= u8::MAX.checked_shl(low as u32).unwrap_or(0);

    let len = bytes.len();
    let top = (curve.field().bits() % 8) as u32;
    if top == 0 {
        bytes[len - 1] = 0;
        bytes[len - 2] |= 0x80;
    } else {
        bytes[len - 1] = (bytes[len - 1] & ((1u8 << top) - 1)) | (1u8 << (top - 1));
    }
    Ok(())
}

/// Expands a seed into the secret scalar and nonce prefix.
pub(crate) fn expand(curve: &Curve, seed: &[u8]) -> Result<ExpandedSecret, Error> {
    let (e, hash, _) = edwards(curve)?;
    let len = e.encoded_len();
    if seed.len() != len {
        return Err(Error::malformed(format!(
            "invalid length of private key: expected {len} bytes, got {}",
            seed.len()
        )));
    }
    let digest = Zeroizing::new(hash.digest(&[seed]));
    if digest.len() < 2 * len {
        return Err(Error::unsupported(format!(
            "hash output of {} bytes is too short for {curve}",
            digest.len()
        )));
    }
    let mut scalar = Zeroizing::new(digest[..len].to_vec());
    clamp(e, curve.cofactor(), &mut scalar)?;
    Ok(ExpandedSecret {
        scalar: BigUint::from_bytes_le(&scalar),
        prefix: Zeroizing::new(digest[len..].to_vec()),
    })
}

/// Returns `[scalar]B`.
pub(crate) fn public_point(curve: &Curve, scalar: &BigUint) -> Result<EdwardsPoint, Error> {
    let (_, _, generator) = edwards(curve)?;
    Ok(generator.mul(scalar))
}

/// Rejects public keys in the small-order subgroup.
pub(crate) fn check_public(curve: &Curve, point: &EdwardsPoint) -> Result<(), Error> {
    if mul(point, curve.cofactor()).is_identity() {
        return Err(Error::malformed("public key has small order"));
    }
    Ok(())
}

/// Hashes `parts` (prefixed by the curve's domain separator) to a scalar.
fn challenge(curve: &Curve, hash: EdwardsHash, parts: &[&[u8]]) -> BigUint {
    let mut all: Vec<&[u8]> = Vec::with_capacity(parts.len() + 1);
    all.push(hash.dom());
    all.extend_from_slice(parts);
    BigUint::from_bytes_le(&hash.digest(&all)) % curve.order()
}

/// Signs `msg`, returning `R || S` with both halves of the encoded point length.
pub(crate) fn sign(
    curve: &Curve,
    secret: &ExpandedSecret,
    public: &[u8],
    msg: &[u8],
) -> Result<Vec<u8>, Error> {
    let (e, hash, generator) = edwards(curve)?;
    let len = e.encoded_len();
    let r = challenge(curve, hash, &[&secret.prefix, msg]);
    let r_point = generator.mul(&r).to_bytes();
    let k = challenge(curve, hash, &[&r_point, public, msg]);
    let scalars = curve.scalars();
    let s = scalars.add(&r, &scalars.mul(&k, &secret.scalar));
    let s = to_le_fixed(&s, len).ok_or_else(|| Error::malformed("order too large for curve"))?;

    let mut signature = r_point;
    signature.extend_from_slice(&s);
    Ok(signature)
}

/// Verifies `signature` over `msg` against the encoded public key.
///
/// `mul_public` computes multiples of the public point.
pub(crate) fn verify(
    curve: &Curve,
    mul_public: impl FnOnce(&BigUint) -> EdwardsPoint,
    public: &[u8],
    signature: &[u8],
    msg: &[u8],
) -> Result<(), Error> {
    let (e, hash, generator) = edwards(curve)?;
    let len = e.encoded_len();
    if signature.len() != 2 * len {
        return Err(Error::malformed(format!(
            "invalid signature length: expected {} bytes, got {}",
            2 * len,
            signature.len()
        )));
    }
    let (r_bytes, s_bytes) = signature.split_at(len);
    let r_point = EdwardsPoint::from_bytes(e.clone(), r_bytes)?;
    let s = BigUint::from_bytes_le(s_bytes);
    if &s >= curve.order() {
        return Err(Error::malformed("S is not below the group order"));
    }
    let k = challenge(curve, hash, &[r_bytes, public, msg]);
    if generator.mul(&s) != mul_public(&k).add(&r_point) {
        return Err(Error::VerificationFailure);
    }
    Ok(())
}
