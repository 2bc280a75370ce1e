//! Short Weierstrass curves `y^2 = x^3 + ax + b` in affine and Jacobian coordinates.

use crate::{
    field::Field,
    point::Group,
    utils::{byte_length, to_be_fixed},
    Error,
};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::{fmt, sync::Arc};

/// Byte encodings of a Weierstrass point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointEncoding {
    /// `x || y`
    Raw,
    /// `0x04 || x || y`
    Uncompressed,
    /// `0x02 || x` when y is even, `0x03 || x` when odd.
    Compressed,
    /// `0x06 || x || y` when y is even, `0x07 || x || y` when odd.
    Hybrid,
}

impl PointEncoding {
    /// Every encoding, in the order decoding tries them.
    pub const ALL: [PointEncoding; 4] = [
        PointEncoding::Raw,
        PointEncoding::Uncompressed,
        PointEncoding::Compressed,
        PointEncoding::Hybrid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Uncompressed => "uncompressed",
            Self::Compressed => "compressed",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for PointEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of a short Weierstrass curve over a prime field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WeierstrassCurve {
    field: Field,
    a: BigUint,
    b: BigUint,
}

impl WeierstrassCurve {
    pub fn new(p: BigUint, a: BigUint, b: BigUint) -> Self {
        let field = Field::new(p);
        let a = field.reduce(&a);
        let b = field.reduce(&b);
        Self { field, a, b }
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

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// Byte length of an encoded coordinate.
    pub fn coordinate_len(&self) -> usize {
        byte_length(self.p())
    }

    /// Evaluates `x^3 + ax + b`.
    fn rhs(&self, x: &BigUint) -> BigUint {
        let f = &self.field;
        let x3 = f.mul(&f.square(x), x);
        f.add(&f.add(&x3, &f.mul(&self.a, x)), &self.b)
    }

    /// Returns whether `(x, y)` satisfies the curve equation (coordinates must be reduced).
    pub fn contains(&self, x: &BigUint, y: &BigUint) -> bool {
        let p = self.p();
        if x >= p || y >= p {
            return false;
        }
        self.field.square(y) == self.rhs(x)
    }

    /// Returns the even y for which `(x, y)` lies on the curve, if any.
    pub fn lift_x(&self, x: &BigUint) -> Option<BigUint> {
        if x >= self.p() {
            return None;
        }
        let beta = self.field.sqrt(&self.rhs(x))?;
        if beta.is_even() {
            Some(beta)
        } else {
            Some(self.field.neg(&beta))
        }
    }
}

/// A finite point in affine coordinates.
#[derive(Clone)]
pub struct AffinePoint {
    curve: Arc<WeierstrassCurve>,
    x: BigUint,
    y: BigUint,
}

impl AffinePoint {
    /// Creates a point, checking that it lies on `curve`.
    pub fn new(curve: Arc<WeierstrassCurve>, x: BigUint, y: BigUint) -> Result<Self, Error> {
        if !curve.contains(&x, &y) {
            return Err(Error::malformed("point is not on the curve"));
        }
        Ok(Self { curve, x, y })
    }

    pub fn curve(&self) -> &Arc<WeierstrassCurve> {
        &self.curve
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }

    pub fn negate(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            x: self.x.clone(),
            y: self.curve.field.neg(&self.y),
        }
    }

    pub fn to_jacobian(&self) -> JacobianPoint {
        JacobianPoint {
            curve: self.curve.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
            z: BigUint::one(),
        }
    }

    /// Encodes the point with fixed-width big-endian coordinates.
    pub fn to_bytes(&self, encoding: PointEncoding) -> Vec<u8> {
        let len = self.curve.coordinate_len();
        let x = to_be_fixed(&self.x, len).expect("coordinate below p");
        let y = to_be_fixed(&self.y, len).expect("coordinate below p");
        let odd = self.y.is_odd() as u8;
        let mut out = Vec::with_capacity(2 * len + 1);
        match encoding {
            PointEncoding::Raw => {}
            PointEncoding::Uncompressed => out.push(0x04),
            PointEncoding::Compressed => {
                out.push(0x02 | odd);
                out.extend_from_slice(&x);
                return out;
            }
            PointEncoding::Hybrid => out.push(0x06 | odd),
        }
        out.extend_from_slice(&x);
        out.extend_from_slice(&y);
        out
    }

    /// Decodes a point in any of the `enabled` encodings.
    ///
    /// The encoding is selected by length (and then prefix). Raw takes precedence when its
    /// length coincides with the compressed length.
    pub fn from_bytes(
        curve: Arc<WeierstrassCurve>,
        bytes: &[u8],
        enabled: &[PointEncoding],
    ) -> Result<Self, Error> {
        let len = curve.coordinate_len();
        let has = |e: PointEncoding| enabled.contains(&e);
        if bytes.len() == 2 * len && has(PointEncoding::Raw) {
            let (x, y) = bytes.split_at(len);
            let x = BigUint::from_bytes_be(x);
            let y = BigUint::from_bytes_be(y);
            return Self::new(curve, x, y);
        }
        if bytes.len() == 2 * len + 1
            && (has(PointEncoding::Uncompressed) || has(PointEncoding::Hybrid))
        {
            let prefix = bytes[0];
            let hybrid = match prefix {
                0x04 if has(PointEncoding::Uncompressed) => false,
                0x06 | 0x07 if has(PointEncoding::Hybrid) => true,
                _ => {
                    return Err(Error::malformed(format!(
                        "invalid prefix {prefix:#04x} for an encoding of {} bytes",
                        bytes.len()
                    )))
                }
            };
            let x = BigUint::from_bytes_be(&bytes[1..1 + len]);
            let y = BigUint::from_bytes_be(&bytes[1 + len..]);
            if hybrid && (prefix & 1 == 1) != y.is_odd() {
                return Err(Error::malformed("hybrid prefix does not match parity of y"));
            }
            return Self::new(curve, x, y);
        }
        if bytes.len() == len + 1 && has(PointEncoding::Compressed) {
            let prefix = bytes[0];
            if prefix != 0x02 && prefix != 0x03 {
                return Err(Error::malformed(format!(
                    "invalid prefix {prefix:#04x} for a compressed point"
                )));
            }
            let x = BigUint::from_bytes_be(&bytes[1..]);
            let beta = curve
                .lift_x(&x)
                .ok_or_else(|| Error::malformed("x is not the coordinate of a curve point"))?;
            let y = if prefix & 1 == 1 {
                curve.field.neg(&beta)
            } else {
                beta
            };
            return Self::new(curve, x, y);
        }
        let names: Vec<&str> = enabled.iter().map(PointEncoding::name).collect();
        Err(Error::malformed(format!(
            "length of {} bytes does not match lengths of any of the enabled ({}) encodings",
            bytes.len(),
            names.join(", ")
        )))
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        self.curve == other.curve && self.x == other.x && self.y == other.y
    }
}

impl Eq for AffinePoint {}

impl fmt::Debug for AffinePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AffinePoint({:#x}, {:#x})", self.x, self.y)
    }
}

/// A point in Jacobian coordinates: affine `x = X/Z^2`, `y = Y/Z^3`. `Z = 0` is infinity.
#[derive(Clone)]
pub struct JacobianPoint {
    curve: Arc<WeierstrassCurve>,
    x: BigUint,
    y: BigUint,
    z: BigUint,
}

impl JacobianPoint {
    pub fn curve(&self) -> &Arc<WeierstrassCurve> {
        &self.curve
    }

    /// Normalizes to affine coordinates, or `None` at infinity.
    pub fn to_affine(&self) -> Option<AffinePoint> {
        let f = &self.curve.field;
        let z_inv = f.inv(&self.z)?;
        let z_inv2 = f.square(&z_inv);
        let x = f.mul(&self.x, &z_inv2);
        let y = f.mul(&self.y, &f.mul(&z_inv2, &z_inv));
        Some(AffinePoint {
            curve: self.curve.clone(),
            x,
            y,
        })
    }
}

impl Group for JacobianPoint {
    fn identity(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            x: BigUint::zero(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    fn add(&self, other: &Self) -> Self {
        if self.is_identity() {
            return other.clone();
        }
        if other.is_identity() {
            return self.clone();
        }
        let f = &self.curve.field;
        let z1z1 = f.square(&self.z);
        let z2z2 = f.square(&other.z);
        let u1 = f.mul(&self.x, &z2z2);
        let u2 = f.mul(&other.x, &z1z1);
        let s1 = f.mul(&self.y, &f.mul(&other.z, &z2z2));
        let s2 = f.mul(&other.y, &f.mul(&self.z, &z1z1));
        let h = f.sub(&u2, &u1);
        let r = f.sub(&s2, &s1);
        if h.is_zero() {
            if r.is_zero() {
                return self.double();
            }
            return self.identity();
        }
        let hh = f.square(&h);
        let hhh = f.mul(&hh, &h);
        let v = f.mul(&u1, &hh);
        let x3 = f.sub(&f.sub(&f.square(&r), &hhh), &f.add(&v, &v));
        let y3 = f.sub(&f.mul(&r, &f.sub(&v, &x3)), &f.mul(&s1, &hhh));
        let z3 = f.mul(&h, &f.mul(&self.z, &other.z));
        Self {
            curve: self.curve.clone(),
            x: x3,
            y: y3,
            z: z3,
        }
    }

    fn double(&self) -> Self {
        if self.is_identity() || self.y.is_zero() {
            return self.identity();
        }
        let f = &self.curve.field;
        let yy = f.square(&self.y);
        let s = f.mul(&BigUint::from(4u32), &f.mul(&self.x, &yy));
        let zz = f.square(&self.z);
        let m = f.add(
            &f.mul(&BigUint::from(3u32), &f.square(&self.x)),
            &f.mul(&self.curve.a, &f.square(&zz)),
        );
        let x3 = f.sub(&f.square(&m), &f.add(&s, &s));
        let y3 = f.sub(
            &f.mul(&m, &f.sub(&s, &x3)),
            &f.mul(&BigUint::from(8u32), &f.square(&yy)),
        );
        let z3 = f.mul(&BigUint::from(2u32), &f.mul(&self.y, &self.z));
        Self {
            curve: self.curve.clone(),
            x: x3,
            y: y3,
            z: z3,
        }
    }

    fn negate(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            x: self.x.clone(),
            y: self.curve.field.neg(&self.y),
            z: self.z.clone(),
        }
    }
}

impl PartialEq for JacobianPoint {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_identity(), other.is_identity()) {
            (true, true) => return true,
            (false, false) => {}
            _ => return false,
        }
        // Cross-multiply to avoid inverting Z.
        let f = &self.curve.field;
        let z1z1 = f.square(&self.z);
        let z2z2 = f.square(&other.z);
        f.mul(&self.x, &z2z2) == f.mul(&other.x, &z1z1)
            && f.mul(&self.y, &f.mul(&z2z2, &other.z)) == f.mul(&other.y, &f.mul(&z1z1, &self.z))
    }
}

impl Eq for JacobianPoint {}

impl fmt::Debug for JacobianPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_affine() {
            Some(p) => write!(f, "JacobianPoint({:#x}, {:#x})", p.x, p.y),
            None => f.write_str("JacobianPoint(infinity)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::from_hex_formatted;
    use test_case::test_case;

    fn toy() -> Arc<WeierstrassCurve> {
        Arc::new(WeierstrassCurve::new(
            BigUint::from(163u32),
            BigUint::from(84u32),
            BigUint::from(58u32),
        ))
    }

    fn p192() -> (Arc<WeierstrassCurve>, AffinePoint) {
        let hex = |s: &str| BigUint::from_bytes_be(&from_hex_formatted(s).unwrap());
        let p = hex("fffffffffffffffffffffffffffffffeffffffffffffffff");
        let a = &p - 3u32;
        let curve = Arc::new(WeierstrassCurve::new(
            p,
            a,
            hex("64210519e59c80e70fa7e9ab72243049feb8deecc146b9b1"),
        ));
        let point = AffinePoint::new(
            curve.clone(),
            hex("044ca295dbc75ad71f930a7acf97cfd7c2d96ffe387d5821"),
            hex("aed4fa68fa5e0d7049bad159fb927861eb6f2b9c47fa76ca"),
        )
        .unwrap();
        (curve, point)
    }

    #[test]
    fn test_contains() {
        let curve = toy();
        assert!(curve.contains(&BigUint::from(2u32), &BigUint::from(87u32)));
        assert!(!curve.contains(&BigUint::from(2u32), &BigUint::from(88u32)));
        assert!(!curve.contains(&BigUint::from(2u32), &BigUint::from(250u32)));
        assert!(AffinePoint::new(curve, BigUint::from(2u32), BigUint::from(88u32)).is_err());
    }

    #[test]
    fn test_lift_x_is_even() {
        let curve = toy();
        let y = curve.lift_x(&BigUint::from(2u32)).unwrap();
        assert!(y.is_even());
        assert!(curve.contains(&BigUint::from(2u32), &y));
    }

    #[test]
    fn test_known_encodings() {
        let (_, point) = p192();
        let x = "044ca295dbc75ad71f930a7acf97cfd7c2d96ffe387d5821";
        let y = "aed4fa68fa5e0d7049bad159fb927861eb6f2b9c47fa76ca";
        let raw = from_hex_formatted(&format!("{x}{y}")).unwrap();
        assert_eq!(point.to_bytes(PointEncoding::Raw), raw);
        let uncompressed = from_hex_formatted(&format!("04{x}{y}")).unwrap();
        assert_eq!(point.to_bytes(PointEncoding::Uncompressed), uncompressed);
        let compressed = from_hex_formatted(&format!("02{x}")).unwrap();
        assert_eq!(point.to_bytes(PointEncoding::Compressed), compressed);
        let hybrid = from_hex_formatted(&format!("06{x}{y}")).unwrap();
        assert_eq!(point.to_bytes(PointEncoding::Hybrid), hybrid);
    }

    #[test_case(PointEncoding::Raw; "raw")]
    #[test_case(PointEncoding::Uncompressed; "uncompressed")]
    #[test_case(PointEncoding::Compressed; "compressed")]
    #[test_case(PointEncoding::Hybrid; "hybrid")]
    fn test_decode_each_encoding(encoding: PointEncoding) {
        let (curve, point) = p192();
        for p in [point.clone(), point.negate()] {
            let bytes = p.to_bytes(encoding);
            let decoded =
                AffinePoint::from_bytes(curve.clone(), &bytes, &PointEncoding::ALL).unwrap();
            assert_eq!(decoded, p);
        }
    }

    #[test]
    fn test_decode_disabled_encoding() {
        let (curve, point) = p192();
        let bytes = point.to_bytes(PointEncoding::Uncompressed);
        let err = AffinePoint::from_bytes(curve, &bytes, &[PointEncoding::Raw]).unwrap_err();
        match err {
            Error::MalformedInput(msg) => assert!(msg.contains("enabled (raw) encodings")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_bad_material() {
        let (curve, point) = p192();

        // Unknown prefix
        let mut bytes = point.to_bytes(PointEncoding::Uncompressed);
        bytes[0] = 0x05;
        assert!(AffinePoint::from_bytes(curve.clone(), &bytes, &PointEncoding::ALL).is_err());

        // Hybrid parity mismatch
        let mut bytes = point.to_bytes(PointEncoding::Hybrid);
        bytes[0] ^= 1;
        assert!(AffinePoint::from_bytes(curve.clone(), &bytes, &PointEncoding::ALL).is_err());

        // Point off the curve
        let mut bytes = point.to_bytes(PointEncoding::Raw);
        let last = bytes.len() - 1;
        bytes[last] ^= 1;
        assert!(AffinePoint::from_bytes(curve.clone(), &bytes, &PointEncoding::ALL).is_err());

        // Coordinate not below p
        let bytes = vec![0xff; 48];
        assert!(AffinePoint::from_bytes(curve.clone(), &bytes, &PointEncoding::ALL).is_err());

        // Compressed prefix 0x04
        let mut bytes = point.to_bytes(PointEncoding::Compressed);
        bytes[0] = 0x04;
        assert!(AffinePoint::from_bytes(curve, &bytes, &PointEncoding::ALL).is_err());
    }

    #[test]
    fn test_toy_raw_takes_precedence() {
        // On a one-byte field raw and compressed encodings share a length.
        let curve = toy();
        let point =
            AffinePoint::new(curve.clone(), BigUint::from(2u32), BigUint::from(87u32)).unwrap();
        let decoded =
            AffinePoint::from_bytes(curve.clone(), &[2, 87], &PointEncoding::ALL).unwrap();
        assert_eq!(decoded, point);
        let decoded =
            AffinePoint::from_bytes(curve, &[3, 2], &[PointEncoding::Compressed]).unwrap();
        assert_eq!(decoded, point);
    }

    #[test]
    fn test_jacobian_group_law() {
        let curve = toy();
        let g = AffinePoint::new(curve, BigUint::from(2u32), BigUint::from(87u32))
            .unwrap()
            .to_jacobian();
        let two = g.double();
        assert_eq!(g.add(&g), two);
        assert_eq!(two.add(&g), g.add(&two));
        assert!(g.add(&g.negate()).is_identity());
        assert_eq!(g.add(&g.identity()), g);
        assert_eq!(g.identity().add(&g), g);
        let affine = two.to_affine().unwrap();
        assert_eq!(affine.to_jacobian(), two);
        assert!(g.identity().to_affine().is_none());
    }
}
