//! Twisted Edwards curves `ax^2 + y^2 = 1 + dx^2y^2` in extended coordinates.
//!
//! A point `(X, Y, Z, T)` represents the affine point `(X/Z, Y/Z)` with `XY = ZT`. The addition
//! law is unified and, for the curves in the catalogue (square `a`, non-square `d`), complete,
//! so doubling is only a faster special case.

use crate::{
    field::Field,
    point::Group,
    utils::to_le_fixed,
    Error,
};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::{fmt, sync::Arc};

/// Parameters of a twisted Edwards curve over a prime field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdwardsCurve {
    field: Field,
    a: BigUint,
    d: BigUint,
}

impl EdwardsCurve {
    pub fn new(p: BigUint, a: BigUint, d: BigUint) -> Self {
        let field = Field::new(p);
        let a = field.reduce(&a);
        let d = field.reduce(&d);
        Self { field, a, d }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn p(&self) -> &BigUint {
        self.field.modulus()
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn d(&self) -> &BigUint {
        &self.d
    }

    /// Length of an encoded point: the bits of `p` plus a sign bit, rounded up to bytes.
    pub fn encoded_len(&self) -> usize {
        (self.field.bits() as usize + 1).div_ceil(8)
    }

    pub fn contains(&self, x: &BigUint, y: &BigUint) -> bool {
        let p = self.p();
        if x >= p || y >= p {
            return false;
        }
        let f = &self.field;
        let xx = f.square(x);
        let yy = f.square(y);
        let lhs = f.add(&f.mul(&self.a, &xx), &yy);
        let rhs = f.add(&BigUint::one(), &f.mul(&self.d, &f.mul(&xx, &yy)));
        lhs == rhs
    }
}

/// A point in extended twisted Edwards coordinates.
#[derive(Clone)]
pub struct EdwardsPoint {
    curve: Arc<EdwardsCurve>,
    x: BigUint,
    y: BigUint,
    z: BigUint,
    t: BigUint,
}

impl EdwardsPoint {
    /// Creates a point from affine coordinates, checking that it lies on `curve`.
    pub fn new(curve: Arc<EdwardsCurve>, x: BigUint, y: BigUint) -> Result<Self, Error> {
        if !curve.contains(&x, &y) {
            return Err(Error::malformed("point is not on the curve"));
        }
        let t = curve.field.mul(&x, &y);
        Ok(Self {
            curve,
            x,
            y,
            z: BigUint::one(),
            t,
        })
    }

    pub fn curve(&self) -> &Arc<EdwardsCurve> {
        &self.curve
    }

    /// Returns the affine `(x, y)`.
    pub fn to_affine(&self) -> (BigUint, BigUint) {
        let f = &self.curve.field;
        // Z is never zero for points produced by the complete addition law
        let z_inv = f.inv(&self.z).unwrap_or_default();
        (f.mul(&self.x, &z_inv), f.mul(&self.y, &z_inv))
    }

    /// Encodes `y` little-endian with the parity of `x` in the top bit of the last byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let (x, y) = self.to_affine();
        let len = self.curve.encoded_len();
        let mut out = to_le_fixed(&y, len).expect("coordinate below p");
        if x.is_odd() {
            out[len - 1] |= 0x80;
        }
        out
    }

    /// Decodes a point, recovering `x` from `y` and the sign bit.
    pub fn from_bytes(curve: Arc<EdwardsCurve>, bytes: &[u8]) -> Result<Self, Error> {
        let len = curve.encoded_len();
        if bytes.len() != len {
            return Err(Error::malformed(format!(
                "invalid length of encoded point: expected {len} bytes, got {}",
                bytes.len()
            )));
        }
        let mut y = bytes.to_vec();
        let sign = y[len - 1] >> 7 == 1;
        y[len - 1] &= 0x7f;
        let y = BigUint::from_bytes_le(&y);
        if &y >= curve.p() {
            return Err(Error::malformed("y coordinate is not below the field prime"));
        }

        // x^2 = (y^2 - 1) / (dy^2 - a)
        let f = &curve.field;
        let yy = f.square(&y);
        let num = f.sub(&yy, &BigUint::one());
        let den = f.sub(&f.mul(&curve.d, &yy), &curve.a);
        let den_inv = f
            .inv(&den)
            .ok_or_else(|| Error::malformed("invalid encoded point"))?;
        let xx = f.mul(&num, &den_inv);
        let mut x = f
            .sqrt(&xx)
            .ok_or_else(|| Error::malformed("encoded point has no valid x coordinate"))?;
        if x.is_zero() && sign {
            return Err(Error::malformed("sign bit set for x = 0"));
        }
        if x.is_odd() != sign {
            x = f.neg(&x);
        }
        Self::new(curve, x, y)
    }
}

impl Group for EdwardsPoint {
    fn identity(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            x: BigUint::zero(),
            y: BigUint::one(),
            z: BigUint::one(),
            t: BigUint::zero(),
        }
    }

    fn is_identity(&self) -> bool {
        let f = &self.curve.field;
        f.reduce(&self.x).is_zero() && f.reduce(&self.y) == f.reduce(&self.z)
    }

    // add-2008-hwcd
    fn add(&self, other: &Self) -> Self {
        let f = &self.curve.field;
        let a = f.mul(&self.x, &other.x);
        let b = f.mul(&self.y, &other.y);
        let c = f.mul(&self.curve.d, &f.mul(&self.t, &other.t));
        let d = f.mul(&self.z, &other.z);
        let e = f.sub(
            &f.sub(
                &f.mul(&f.add(&self.x, &self.y), &f.add(&other.x, &other.y)),
                &a,
            ),
            &b,
        );
        let ff = f.sub(&d, &c);
        let g = f.add(&d, &c);
        let h = f.sub(&b, &f.mul(&self.curve.a, &a));
        Self {
            curve: self.curve.clone(),
            x: f.mul(&e, &ff),
            y: f.mul(&g, &h),
            z: f.mul(&ff, &g),
            t: f.mul(&e, &h),
        }
    }

    // dbl-2008-hwcd
    fn double(&self) -> Self {
        let f = &self.curve.field;
        let a = f.square(&self.x);
        let b = f.square(&self.y);
        let zz = f.square(&self.z);
        let c = f.add(&zz, &zz);
        let d = f.mul(&self.curve.a, &a);
        let e = f.sub(&f.sub(&f.square(&f.add(&self.x, &self.y)), &a), &b);
        let g = f.add(&d, &b);
        let ff = f.sub(&g, &c);
        let h = f.sub(&d, &b);
        Self {
            curve: self.curve.clone(),
            x: f.mul(&e, &ff),
            y: f.mul(&g, &h),
            z: f.mul(&ff, &g),
            t: f.mul(&e, &h),
        }
    }

    fn negate(&self) -> Self {
        let f = &self.curve.field;
        Self {
            curve: self.curve.clone(),
            x: f.neg(&self.x),
            y: self.y.clone(),
            z: self.z.clone(),
            t: f.neg(&self.t),
        }
    }
}

impl PartialEq for EdwardsPoint {
    fn eq(&self, other: &Self) -> bool {
        let f = &self.curve.field;
        f.mul(&self.x, &other.z) == f.mul(&other.x, &self.z)
            && f.mul(&self.y, &other.z) == f.mul(&other.y, &self.z)
    }
}

impl Eq for EdwardsPoint {}

impl fmt::Debug for EdwardsPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.to_affine();
        write!(f, "EdwardsPoint({x:#x}, {y:#x})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{point::mul, utils::from_hex_formatted};

    fn ed25519() -> (Arc<EdwardsCurve>, EdwardsPoint) {
        let dec = |s: &str| s.parse::<BigUint>().unwrap();
        let p = (BigUint::one() << 255u32) - 19u32;
        let a = &p - 1u32;
        let curve = Arc::new(EdwardsCurve::new(
            p,
            a,
            dec("37095705934669439343138083508754565189542113879843219016388785533085940283555"),
        ));
        let g = EdwardsPoint::new(
            curve.clone(),
            dec("15112221349535400772501151409588531511454012693041857206046113283949847762202"),
            dec("46316835694926478169428394003475163141307993866256225615783033603165251855960"),
        )
        .unwrap();
        (curve, g)
    }

    #[test]
    fn test_generator_encoding() {
        let (curve, g) = ed25519();
        let expected = from_hex_formatted(
            "5866666666666666666666666666666666666666666666666666666666666666",
        )
        .unwrap();
        assert_eq!(curve.encoded_len(), 32);
        assert_eq!(g.to_bytes(), expected);
        assert_eq!(EdwardsPoint::from_bytes(curve, &expected).unwrap(), g);
    }

    #[test]
    fn test_decode_public_key() {
        // RFC 8032 section 7.1, test 1
        let (curve, _) = ed25519();
        let bytes = from_hex_formatted(
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
        )
        .unwrap();
        let point = EdwardsPoint::from_bytes(curve, &bytes).unwrap();
        assert_eq!(point.to_bytes(), bytes);
        assert_eq!(point.negate().to_bytes()[..31], bytes[..31]);
    }

    #[test]
    fn test_decode_rejects() {
        let (curve, g) = ed25519();

        // Wrong length
        assert!(EdwardsPoint::from_bytes(curve.clone(), &[0u8; 31]).is_err());

        // y >= p
        let mut bytes = vec![0xff; 32];
        bytes[31] = 0x7f;
        assert!(EdwardsPoint::from_bytes(curve.clone(), &bytes).is_err());

        // x = 0 with the sign bit set (y = 1 is the identity)
        let mut bytes = vec![0u8; 32];
        bytes[0] = 1;
        assert!(g.identity().to_bytes() == bytes);
        bytes[31] = 0x80;
        assert!(EdwardsPoint::from_bytes(curve.clone(), &bytes).is_err());

        // y = 2 has no x on the curve
        let mut bytes = vec![0u8; 32];
        bytes[0] = 2;
        assert!(EdwardsPoint::from_bytes(curve, &bytes).is_err());
    }

    #[test]
    fn test_group_law() {
        let (_, g) = ed25519();
        let two = g.double();
        assert_eq!(g.add(&g), two);
        assert_eq!(two.add(&g), g.add(&two));
        assert!(g.add(&g.negate()).is_identity());
        assert_eq!(g.add(&g.identity()), g);
        assert!(g.identity().is_identity());
        assert!(!g.is_identity());
        assert_eq!(mul(&g, &BigUint::from(5u32)), two.double().add(&g));
    }

    #[test]
    fn test_generator_order() {
        let (_, g) = ed25519();
        let n = (BigUint::one() << 252u32)
            + "27742317777372353535851937790883648493"
                .parse::<BigUint>()
                .unwrap();
        assert!(mul(&g, &n).is_identity());
        assert!(!mul(&g, &(&n - 1u32)).is_identity());
    }
}
