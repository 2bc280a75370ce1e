//! ECDSA over short Weierstrass curves.
//!
//! The engine works on integers: keys hand it the secret exponent (or public point), the
//! digest reduced by [digest_to_number], and a stream of nonce candidates. Degenerate
//! candidates (those giving `r = 0` or `s = 0`) are skipped internally and never surface.
//!
//! Signatures produced here also carry a [RecoveryId], which with the digest is enough to
//! reconstruct the public key.

use crate::{
    curve::{Curve, Family},
    point::{mul, Group, Precomputed},
    signature::Signature,
    weierstrass::{AffinePoint, JacobianPoint, WeierstrassCurve},
    Error,
};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use std::sync::Arc;
use tracing::debug;

/// Identifies which of the candidate points `R` produced a signature (SEC 1, section 4.1.6).
///
/// The identifier is `2 * j + parity(y)` where `x(R) = r + j * n`. `j` is zero unless the x
/// coordinate of `R` was not below the order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecoveryId {
    overflow: u32,
    y_odd: bool,
}

impl RecoveryId {
    pub fn new(overflow: u32, y_odd: bool) -> Self {
        Self { overflow, y_odd }
    }

    /// Number of times the order was subtracted from `x(R)` to obtain `r`.
    pub fn overflow(&self) -> u32 {
        self.overflow
    }

    pub fn is_y_odd(&self) -> bool {
        self.y_odd
    }

    pub fn to_u32(&self) -> u32 {
        2 * self.overflow + self.y_odd as u32
    }

    pub fn from_u32(id: u32) -> Self {
        Self {
            overflow: id / 2,
            y_odd: id % 2 == 1,
        }
    }
}

/// Candidate nonce rejected because it produced `r = 0` or `s = 0`.
struct DegenerateNonce;

/// Converts a digest to an integer of at most the bit length of `order`.
///
/// With `allow_truncate`, the digest is cut to the byte length of the order and shifted right
/// so that only its leftmost `bits(order)` bits remain. Without it, digests longer than the
/// order are rejected.
pub fn digest_to_number(
    digest: &[u8],
    order: &BigUint,
    allow_truncate: bool,
) -> Result<BigUint, Error> {
    let order_len = (order.bits() as usize).div_ceil(8);
    if !allow_truncate {
        if digest.len() > order_len {
            return Err(Error::malformed(format!(
                "this curve is too short for the length of your digest ({} bytes)",
                digest.len()
            )));
        }
        return Ok(BigUint::from_bytes_be(digest));
    }
    let digest = &digest[..digest.len().min(order_len)];
    let number = BigUint::from_bytes_be(digest);
    let length = digest.len() as u64 * 8;
    Ok(number >> length.saturating_sub(order.bits()))
}

/// Returns the Weierstrass group of `curve` or fails for Edwards curves.
pub(crate) fn weierstrass(
    curve: &Curve,
) -> Result<(&Arc<WeierstrassCurve>, &Precomputed<JacobianPoint>), Error> {
    match curve.family() {
        Family::Weierstrass { curve: w, table, .. } => Ok((w, table)),
        Family::Edwards { .. } => Err(Error::unsupported(format!(
            "ECDSA is unsupported for Edwards curves ({curve})"
        ))),
    }
}

fn try_sign(
    curve: &Curve,
    secret: &BigUint,
    z: &BigUint,
    k: &BigUint,
) -> Result<(Signature, RecoveryId), DegenerateNonce> {
    let (_, generator) = weierstrass(curve).map_err(|_| DegenerateNonce)?;
    let n = curve.order();
    let scalars = curve.scalars();
    let point = generator.mul(k).to_affine().ok_or(DegenerateNonce)?;
    let (j, r) = point.x().div_rem(n);
    if r.is_zero() {
        return Err(DegenerateNonce);
    }
    let k_inv = scalars.inv(k).ok_or(DegenerateNonce)?;
    let s = scalars.mul(&k_inv, &scalars.add(z, &scalars.mul(&r, secret)));
    if s.is_zero() {
        return Err(DegenerateNonce);
    }
    let overflow = u32::try_from(j).map_err(|_| DegenerateNonce)?;
    let id = RecoveryId::new(overflow, point.y().is_odd());
    Ok((Signature::new(r, s), id))
}

/// Signs the digest number `z` with the secret exponent, drawing nonces from `nonces` until
/// one is not degenerate.
pub(crate) fn sign(
    curve: &Curve,
    secret: &BigUint,
    z: &BigUint,
    nonces: impl IntoIterator<Item = BigUint>,
) -> Result<(Signature, RecoveryId), Error> {
    weierstrass(curve)?;
    for (attempt, k) in nonces.into_iter().enumerate() {
        match try_sign(curve, secret, z, &k) {
            Ok(signature) => return Ok(signature),
            Err(DegenerateNonce) => {
                debug!(curve = %curve, attempt, "degenerate nonce, retrying");
            }
        }
    }
    Err(Error::unsupported("nonce source exhausted"))
}

/// Verifies `signature` over the digest number `z`.
///
/// `mul_public` computes multiples of the public point so that callers can route it through a
/// precomputed table.
pub(crate) fn verify(
    curve: &Curve,
    mul_public: impl FnOnce(&BigUint) -> JacobianPoint,
    signature: &Signature,
    z: &BigUint,
) -> Result<(), Error> {
    let (_, generator) = weierstrass(curve)?;
    let n = curve.order();
    let (r, s) = (signature.r(), signature.s());
    if r.is_zero() || r >= n || s.is_zero() || s >= n {
        return Err(Error::VerificationFailure);
    }
    let scalars = curve.scalars();
    let w = scalars.inv(s).ok_or(Error::VerificationFailure)?;
    let u1 = scalars.mul(z, &w);
    let u2 = scalars.mul(r, &w);
    let point = generator.mul(&u1).add(&mul_public(&u2));
    let point = point.to_affine().ok_or(Error::VerificationFailure)?;
    if &(point.x() % n) != r {
        return Err(Error::VerificationFailure);
    }
    Ok(())
}

/// Computes `Q = r^-1 (sR - zG)`.
fn public_from_r(
    curve: &Curve,
    r_point: &AffinePoint,
    signature: &Signature,
    z: &BigUint,
) -> Result<AffinePoint, Error> {
    let (_, generator) = weierstrass(curve)?;
    let scalars = curve.scalars();
    let r_inv = scalars
        .inv(signature.r())
        .ok_or_else(|| Error::malformed("r is not invertible"))?;
    let minus_z = scalars.neg(z);
    let point = mul(&r_point.to_jacobian(), signature.s()).add(&generator.mul(&minus_z));
    mul(&point, &r_inv)
        .to_affine()
        .ok_or_else(|| Error::malformed("recovered public key is the point at infinity"))
}

fn check_range(curve: &Curve, signature: &Signature) -> Result<(), Error> {
    let n = curve.order();
    for (name, value) in [("r", signature.r()), ("s", signature.s())] {
        if value.is_zero() || value >= n {
            return Err(Error::malformed(format!("{name} is not in [1, n-1]")));
        }
    }
    Ok(())
}

/// Returns the two public keys (for `R = (r, y)` and `R = (r, -y)`) that validate
/// `signature` over `z`.
pub(crate) fn recover_candidates(
    curve: &Curve,
    signature: &Signature,
    z: &BigUint,
) -> Result<Vec<AffinePoint>, Error> {
    let (w, _) = weierstrass(curve)?;
    check_range(curve, signature)?;
    let x = signature.r().clone();
    let y = w
        .lift_x(&x)
        .ok_or_else(|| Error::malformed("no curve point has x = r"))?;
    let r1 = AffinePoint::new(w.clone(), x, y)?;
    let r2 = r1.negate();
    [r1, r2]
        .iter()
        .map(|r_point| public_from_r(curve, r_point, signature, z))
        .collect()
}

/// Returns the public key that produced `signature` over `z` given its recovery id.
pub(crate) fn recover(
    curve: &Curve,
    signature: &Signature,
    z: &BigUint,
    id: RecoveryId,
) -> Result<AffinePoint, Error> {
    let (w, _) = weierstrass(curve)?;
    check_range(curve, signature)?;
    let x = signature.r() + curve.order() * BigUint::from(id.overflow());
    if &x >= w.p() {
        return Err(Error::malformed("recovery id overflows the field"));
    }
    let beta = w
        .lift_x(&x)
        .ok_or_else(|| Error::malformed("no curve point has the x given by the recovery id"))?;
    let y = if id.is_y_odd() {
        w.field().neg(&beta)
    } else {
        beta
    };
    let r_point = AffinePoint::new(w.clone(), x, y)?;
    public_from_r(curve, &r_point, signature, z)
}
