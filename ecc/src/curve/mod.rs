//! Curve registry.
//!
//! A [Curve] bundles the group law, generator, order and cofactor of a prime-order subgroup
//! together with the scalar field used by the signature engines. Curves are cheap to clone
//! (they share one immutable record) and compare by their algebraic parameters.
//!
//! The named catalogue is built once per process on first use and never mutated afterwards.

use crate::{
    edwards::{EdwardsCurve, EdwardsPoint},
    field::{is_probable_prime, Field},
    hash::EdwardsHash,
    point::{Group, Point, Precomputed},
    utils::byte_length,
    weierstrass::{AffinePoint, JacobianPoint, PointEncoding, WeierstrassCurve},
    Error,
};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::{
    fmt,
    sync::{Arc, LazyLock},
};
use tracing::debug;

mod params;

/// How a curve may be referenced in decoded key material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurveEncoding {
    /// By object identifier.
    Named,
    /// By the full parameter set.
    Explicit,
}

/// Decoding policy for keys and curves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Weierstrass point encodings accepted when decoding verifying keys.
    pub point_encodings: Vec<PointEncoding>,
    /// Accepted curve references.
    pub curve_encodings: Vec<CurveEncoding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            point_encodings: PointEncoding::ALL.to_vec(),
            curve_encodings: vec![CurveEncoding::Named, CurveEncoding::Explicit],
        }
    }
}

impl Config {
    pub fn with_point_encodings(mut self, encodings: &[PointEncoding]) -> Self {
        self.point_encodings = encodings.to_vec();
        self
    }

    pub fn with_curve_encodings(mut self, encodings: &[CurveEncoding]) -> Self {
        self.curve_encodings = encodings.to_vec();
        self
    }
}

/// Explicit parameters of a short Weierstrass curve `y^2 = x^3 + ax + b` over GF(p).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplicitParameters {
    pub p: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    pub gx: BigUint,
    pub gy: BigUint,
    pub order: BigUint,
    pub cofactor: BigUint,
}

/// Parameters of a twisted Edwards curve `ax^2 + y^2 = 1 + dx^2y^2` over GF(p) and the hash
/// of its EdDSA instantiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdwardsParameters {
    pub p: BigUint,
    pub a: BigUint,
    pub d: BigUint,
    pub gx: BigUint,
    pub gy: BigUint,
    pub order: BigUint,
    pub cofactor: BigUint,
    pub hash: EdwardsHash,
}

pub(crate) enum Family {
    Weierstrass {
        curve: Arc<WeierstrassCurve>,
        generator: AffinePoint,
        table: Precomputed<JacobianPoint>,
    },
    Edwards {
        curve: Arc<EdwardsCurve>,
        hash: EdwardsHash,
        table: Precomputed<EdwardsPoint>,
    },
}

struct Inner {
    name: String,
    oid: Option<Vec<u64>>,
    order: BigUint,
    cofactor: BigUint,
    scalars: Field,
    family: Family,
}

/// Rejects a field modulus or group order that is not an odd prime (order 2 aside).
fn check_primes(p: &BigUint, order: &BigUint) -> Result<(), Error> {
    if *p < BigUint::from(3u32) || p.is_even() || !is_probable_prime(p) {
        return Err(Error::malformed("field modulus is not an odd prime"));
    }
    if !is_probable_prime(order) {
        return Err(Error::malformed("order is not prime"));
    }
    Ok(())
}

/// An elliptic curve with a distinguished generator of prime order.
#[derive(Clone)]
pub struct Curve {
    inner: Arc<Inner>,
}

impl Curve {
    /// Builds a short Weierstrass curve, checking that the generator is a point of `order`.
    pub fn weierstrass(name: impl Into<String>, params: ExplicitParameters) -> Result<Self, Error> {
        let name = name.into();
        check_primes(&params.p, &params.order)?;
        let curve = Arc::new(WeierstrassCurve::new(params.p, params.a, params.b));
        let generator = AffinePoint::new(curve.clone(), params.gx, params.gy)
            .map_err(|_| Error::malformed("generator is not on the curve"))?;
        let table = Precomputed::new(name.clone(), generator.to_jacobian(), params.order.bits());
        Self::build(
            name,
            params.order,
            params.cofactor,
            Family::Weierstrass {
                curve,
                generator,
                table,
            },
        )
    }

    /// Builds a twisted Edwards curve, checking that the generator is a point of `order`.
    pub fn edwards(name: impl Into<String>, params: EdwardsParameters) -> Result<Self, Error> {
        let name = name.into();
        check_primes(&params.p, &params.order)?;
        let curve = Arc::new(EdwardsCurve::new(params.p, params.a, params.d));
        let generator = EdwardsPoint::new(curve.clone(), params.gx, params.gy)
            .map_err(|_| Error::malformed("generator is not on the curve"))?;
        let table = Precomputed::new(name.clone(), generator, params.order.bits());
        Self::build(
            name,
            params.order,
            params.cofactor,
            Family::Edwards {
                curve,
                hash: params.hash,
                table,
            },
        )
    }

    fn build(
        name: String,
        order: BigUint,
        cofactor: BigUint,
        family: Family,
    ) -> Result<Self, Error> {
        if order <= BigUint::one() {
            return Err(Error::malformed("order must be greater than one"));
        }
        if cofactor.is_zero() {
            return Err(Error::malformed("cofactor must be positive"));
        }
        let generates = match &family {
            Family::Weierstrass { table, .. } => {
                crate::point::mul(table.point(), &order).is_identity()
            }
            Family::Edwards { table, .. } => crate::point::mul(table.point(), &order).is_identity(),
        };
        if !generates {
            return Err(Error::malformed("generator does not have the given order"));
        }
        let scalars = Field::new(order.clone());
        Ok(Self {
            inner: Arc::new(Inner {
                name,
                oid: None,
                order,
                cofactor,
                scalars,
                family,
            }),
        })
    }

    fn with_oid(self, oid: &[u64]) -> Self {
        match Arc::try_unwrap(self.inner) {
            Ok(mut inner) => {
                inner.oid = Some(oid.to_vec());
                Self {
                    inner: Arc::new(inner),
                }
            }
            Err(inner) => Self { inner },
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Object identifier arcs, for named curves.
    pub fn oid(&self) -> Option<&[u64]> {
        self.inner.oid.as_deref()
    }

    /// Order of the generator.
    pub fn order(&self) -> &BigUint {
        &self.inner.order
    }

    pub fn cofactor(&self) -> &BigUint {
        &self.inner.cofactor
    }

    /// Prime of the base field.
    pub fn p(&self) -> &BigUint {
        match &self.inner.family {
            Family::Weierstrass { curve, .. } => curve.p(),
            Family::Edwards { curve, .. } => curve.p(),
        }
    }

    pub fn is_edwards(&self) -> bool {
        matches!(self.inner.family, Family::Edwards { .. })
    }

    pub fn generator(&self) -> Point {
        match &self.inner.family {
            Family::Weierstrass { generator, .. } => Point::Affine(generator.clone()),
            Family::Edwards { table, .. } => Point::Edwards(table.point().clone()),
        }
    }

    /// Byte length of a scalar (and of each ECDSA signature component).
    pub fn order_len(&self) -> usize {
        byte_length(&self.inner.order)
    }

    /// Byte length of an encoded coordinate (Weierstrass) or encoded point (Edwards).
    pub fn coordinate_len(&self) -> usize {
        match &self.inner.family {
            Family::Weierstrass { curve, .. } => curve.coordinate_len(),
            Family::Edwards { curve, .. } => curve.encoded_len(),
        }
    }

    pub(crate) fn family(&self) -> &Family {
        &self.inner.family
    }

    /// Arithmetic modulo the order.
    pub(crate) fn scalars(&self) -> &Field {
        &self.inner.scalars
    }

    /// Resolves a named curve by object identifier.
    pub fn from_oid(oid: &[u64], config: &Config) -> Result<Self, Error> {
        if !config.curve_encodings.contains(&CurveEncoding::Named) {
            return Err(Error::unsupported("named curve parameters are disabled"));
        }
        catalogue()
            .into_iter()
            .find(|curve| curve.oid() == Some(oid))
            .ok_or_else(|| Error::unsupported(format!("unknown curve with oid {oid:?}")))
    }

    /// Builds a curve from explicit parameters, preferring the matching named curve.
    pub fn from_explicit(params: ExplicitParameters, config: &Config) -> Result<Self, Error> {
        if !config.curve_encodings.contains(&CurveEncoding::Explicit) {
            debug!("rejected explicit curve parameters");
            return Err(Error::unsupported("explicit curve parameters are disabled"));
        }
        let custom = Self::weierstrass("explicit", params)?;
        Ok(catalogue()
            .into_iter()
            .find(|curve| *curve == custom)
            .unwrap_or(custom))
    }
}

impl PartialEq for Curve {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        let (a, b) = (&self.inner, &other.inner);
        if a.order != b.order || a.cofactor != b.cofactor {
            return false;
        }
        match (&a.family, &b.family) {
            (
                Family::Weierstrass {
                    curve: ca,
                    generator: ga,
                    ..
                },
                Family::Weierstrass {
                    curve: cb,
                    generator: gb,
                    ..
                },
            ) => ca == cb && ga == gb,
            (
                Family::Edwards {
                    curve: ca,
                    hash: ha,
                    table: ta,
                },
                Family::Edwards {
                    curve: cb,
                    hash: hb,
                    table: tb,
                },
            ) => ca == cb && ha == hb && ta.point() == tb.point(),
            _ => false,
        }
    }
}

impl Eq for Curve {}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Curve")
            .field("name", &self.inner.name)
            .field("oid", &self.inner.oid)
            .finish()
    }
}

static NIST_P192: LazyLock<Curve> = LazyLock::new(params::nist_p192);
static NIST_P224: LazyLock<Curve> = LazyLock::new(params::nist_p224);
static NIST_P256: LazyLock<Curve> = LazyLock::new(params::nist_p256);
static NIST_P384: LazyLock<Curve> = LazyLock::new(params::nist_p384);
static NIST_P521: LazyLock<Curve> = LazyLock::new(params::nist_p521);
static SECP256K1: LazyLock<Curve> = LazyLock::new(params::secp256k1);
static BRAINPOOL_P160R1: LazyLock<Curve> = LazyLock::new(params::brainpool_p160r1);
static BRAINPOOL_P256R1: LazyLock<Curve> = LazyLock::new(params::brainpool_p256r1);
static ED25519: LazyLock<Curve> = LazyLock::new(params::ed25519);
static ED448: LazyLock<Curve> = LazyLock::new(params::ed448);

pub fn nist_p192() -> Curve {
    NIST_P192.clone()
}

pub fn nist_p224() -> Curve {
    NIST_P224.clone()
}

pub fn nist_p256() -> Curve {
    NIST_P256.clone()
}

pub fn nist_p384() -> Curve {
    NIST_P384.clone()
}

pub fn nist_p521() -> Curve {
    NIST_P521.clone()
}

pub fn secp256k1() -> Curve {
    SECP256K1.clone()
}

pub fn brainpool_p160r1() -> Curve {
    BRAINPOOL_P160R1.clone()
}

pub fn brainpool_p256r1() -> Curve {
    BRAINPOOL_P256R1.clone()
}

pub fn ed25519() -> Curve {
    ED25519.clone()
}

pub fn ed448() -> Curve {
    ED448.clone()
}

/// Every named curve.
pub fn catalogue() -> Vec<Curve> {
    vec![
        nist_p192(),
        nist_p224(),
        nist_p256(),
        nist_p384(),
        nist_p521(),
        secp256k1(),
        brainpool_p160r1(),
        brainpool_p256r1(),
        ed25519(),
        ed448(),
    ]
}

/// Looks up a named curve (e.g. `"NIST256p"`).
pub fn by_name(name: &str) -> Option<Curve> {
    catalogue().into_iter().find(|curve| curve.name() == name)
}

#[cfg(test)]
pub(crate) use params::toy;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(nist_p192(); "nist_p192")]
    #[test_case(nist_p224(); "nist_p224")]
    #[test_case(nist_p256(); "nist_p256")]
    #[test_case(nist_p384(); "nist_p384")]
    #[test_case(nist_p521(); "nist_p521")]
    #[test_case(secp256k1(); "secp256k1")]
    #[test_case(brainpool_p160r1(); "brainpool_p160r1")]
    #[test_case(brainpool_p256r1(); "brainpool_p256r1")]
    #[test_case(ed25519(); "ed25519")]
    #[test_case(ed448(); "ed448")]
    #[test_case(toy(); "toy")]
    fn test_generator_times_order_is_infinity(curve: Curve) {
        let g = curve.generator();
        assert!(g.mul(curve.order()).is_infinity());
        assert!(!g.mul(&(curve.order() - 1u32)).is_infinity());
        assert_eq!(g.mul(&(curve.order() + 1u32)), g);
    }

    #[test]
    fn test_lengths() {
        assert_eq!(nist_p192().order_len(), 24);
        assert_eq!(nist_p521().order_len(), 66);
        assert_eq!(nist_p521().coordinate_len(), 66);
        assert_eq!(brainpool_p160r1().order_len(), 20);
        assert_eq!(ed25519().coordinate_len(), 32);
        assert_eq!(ed448().coordinate_len(), 57);
        assert_eq!(toy().order_len(), 1);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(by_name("NIST256p").unwrap(), nist_p256());
        assert!(by_name("NIST257p").is_none());
        let config = Config::default();
        let curve = Curve::from_oid(&[1, 2, 840, 10045, 3, 1, 7], &config).unwrap();
        assert_eq!(curve.name(), "NIST256p");
        let curve = Curve::from_oid(&[1, 3, 101, 113], &config).unwrap();
        assert_eq!(curve.name(), "Ed448");
        assert!(Curve::from_oid(&[1, 2, 3], &config).is_err());
        for curve in catalogue() {
            assert!(curve.oid().is_some());
            assert_eq!(by_name(curve.name()).unwrap(), curve);
        }
    }

    #[test]
    fn test_named_disabled() {
        let config = Config::default().with_curve_encodings(&[CurveEncoding::Explicit]);
        assert!(matches!(
            Curve::from_oid(&[1, 2, 840, 10045, 3, 1, 7], &config),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    fn p256_parameters() -> ExplicitParameters {
        let curve = nist_p256();
        let Family::Weierstrass {
            curve: w, generator, ..
        } = curve.family()
        else {
            unreachable!()
        };
        ExplicitParameters {
            p: w.p().clone(),
            a: w.a().clone(),
            b: w.b().clone(),
            gx: generator.x().clone(),
            gy: generator.y().clone(),
            order: curve.order().clone(),
            cofactor: curve.cofactor().clone(),
        }
    }

    #[test]
    fn test_explicit_resolves_named() {
        let curve = Curve::from_explicit(p256_parameters(), &Config::default()).unwrap();
        assert_eq!(curve.name(), "NIST256p");
        assert_eq!(curve, nist_p256());
    }

    #[test]
    fn test_explicit_disabled() {
        let config = Config::default().with_curve_encodings(&[CurveEncoding::Named]);
        assert!(matches!(
            Curve::from_explicit(p256_parameters(), &config),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_explicit_custom() {
        let toy = toy();
        let params = ExplicitParameters {
            p: BigUint::from(163u32),
            a: BigUint::from(84u32),
            b: BigUint::from(58u32),
            gx: BigUint::from(2u32),
            gy: BigUint::from(87u32),
            order: BigUint::from(167u32),
            cofactor: BigUint::one(),
        };
        let curve = Curve::from_explicit(params, &Config::default()).unwrap();
        assert_eq!(curve.name(), "explicit");
        assert!(curve.oid().is_none());
        assert_eq!(curve, toy);
        assert_ne!(curve, nist_p256());
    }

    #[test]
    fn test_invalid_parameters() {
        let mut params = p256_parameters();
        params.gy += 1u32;
        assert!(Curve::weierstrass("bad", params).is_err());

        let mut params = p256_parameters();
        params.order -= 1u32;
        assert!(Curve::weierstrass("bad", params).is_err());
    }

    #[test_case(0, 7; "zero modulus")]
    #[test_case(1, 7; "unit modulus")]
    #[test_case(2, 7; "even prime modulus")]
    #[test_case(164, 167; "even modulus")]
    #[test_case(65, 7; "composite modulus")]
    #[test_case(163, 168; "composite order")]
    #[test_case(163, 1; "unit order")]
    fn test_rejects_non_prime_parameters(p: u32, order: u32) {
        let params = ExplicitParameters {
            p: BigUint::from(p),
            a: BigUint::one(),
            b: BigUint::one(),
            gx: BigUint::zero(),
            gy: BigUint::zero(),
            order: BigUint::from(order),
            cofactor: BigUint::one(),
        };
        assert!(matches!(
            Curve::from_explicit(params.clone(), &Config::default()),
            Err(Error::MalformedInput(_))
        ));
        let edwards = EdwardsParameters {
            p: params.p,
            a: BigUint::one(),
            d: BigUint::from(2u32),
            gx: BigUint::zero(),
            gy: BigUint::one(),
            order: params.order,
            cofactor: BigUint::one(),
            hash: EdwardsHash::Sha512,
        };
        assert!(matches!(
            Curve::edwards("bad", edwards),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_families() {
        assert!(ed25519().is_edwards());
        assert!(!secp256k1().is_edwards());
        assert_ne!(ed25519(), ed448());
        assert_ne!(ed25519(), nist_p256());
        assert_eq!(ed25519().cofactor(), &BigUint::from(8u32));
        assert_eq!(ed448().cofactor(), &BigUint::from(4u32));
    }
}
