//! Points over either curve family.
//!
//! Both group laws implement [Group], which is all that scalar multiplication and the
//! precomputation tables need. [Point] is the public tagged view over the representations
//! and rejects operations that would mix families.

use crate::{
    edwards::EdwardsPoint,
    weierstrass::{AffinePoint, JacobianPoint},
    Error,
};
use num_bigint::BigUint;
use std::sync::OnceLock;
use tracing::debug;

/// Width (in bits) of a precomputation window.
const WINDOW: u64 = 4;

/// Number of non-zero multiples stored per window.
const MULTIPLES: usize = (1 << WINDOW) - 1;

/// Group law over points of a single curve.
pub(crate) trait Group: Clone {
    /// Returns the identity of the curve `self` lives on.
    fn identity(&self) -> Self;

    fn is_identity(&self) -> bool;

    fn add(&self, other: &Self) -> Self;

    fn double(&self) -> Self;

    fn negate(&self) -> Self;
}

/// Computes `k * point` by left-to-right double-and-add.
pub(crate) fn mul<G: Group>(point: &G, k: &BigUint) -> G {
    let mut acc = point.identity();
    if point.is_identity() {
        return acc;
    }
    for i in (0..k.bits()).rev() {
        acc = acc.double();
        if k.bit(i) {
            acc = acc.add(point);
        }
    }
    acc
}

/// Fixed-base multiples of a point, one row per 4-bit window.
///
/// Row `i` holds `j * 16^i * P` for `j` in `1..=15`, so a scalar multiplication costs one
/// addition per non-zero window and no doublings.
pub(crate) struct Table<G> {
    rows: Vec<Vec<G>>,
}

impl<G: Group> Table<G> {
    /// Builds a table covering scalars of up to `bits` bits.
    pub fn new(point: &G, bits: u64) -> Self {
        let windows = bits.div_ceil(WINDOW) as usize;
        let mut rows = Vec::with_capacity(windows);
        let mut base = point.clone();
        for _ in 0..windows {
            let mut row = Vec::with_capacity(MULTIPLES);
            let mut acc = base.clone();
            for _ in 0..MULTIPLES {
                row.push(acc.clone());
                acc = acc.add(&base);
            }
            base = acc;
            rows.push(row);
        }
        Self { rows }
    }

    /// Returns `k * P`, or `None` if `k` is wider than the table.
    pub fn mul(&self, k: &BigUint) -> Option<G> {
        let first = self.rows.first()?.first()?;
        if k.bits() > self.rows.len() as u64 * WINDOW {
            return None;
        }
        let mut acc = first.identity();
        for (row, digit) in self.rows.iter().zip(k.to_radix_le(1 << WINDOW)) {
            if digit != 0 {
                acc = acc.add(&row[digit as usize - 1]);
            }
        }
        Some(acc)
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }
}

/// A point with a lazily built multiplication table.
///
/// The table is published at most once; concurrent first users either build it or wait for
/// the winner, and never observe a partial table.
pub(crate) struct Precomputed<G> {
    label: String,
    point: G,
    bits: u64,
    table: OnceLock<Table<G>>,
}

impl<G: Group> Precomputed<G> {
    /// Prepares `point` for multiplication by scalars of up to `bits` bits.
    ///
    /// `label` only identifies the table in log events.
    pub fn new(label: impl Into<String>, point: G, bits: u64) -> Self {
        Self {
            label: label.into(),
            point,
            bits,
            table: OnceLock::new(),
        }
    }

    pub fn point(&self) -> &G {
        &self.point
    }

    pub fn is_built(&self) -> bool {
        self.table.get().is_some()
    }

    /// Returns the table, building it on first use.
    pub fn table(&self) -> &Table<G> {
        self.table.get_or_init(|| {
            let table = Table::new(&self.point, self.bits);
            debug!(label = %self.label, rows = table.rows(), "built precomputation table");
            table
        })
    }

    /// Multiplies through the table, building it if needed.
    pub fn mul(&self, k: &BigUint) -> G {
        self.table()
            .mul(k)
            .unwrap_or_else(|| mul(&self.point, k))
    }

    /// Multiplies through the table only if it has already been built.
    pub fn mul_if_built(&self, k: &BigUint) -> G {
        self.table
            .get()
            .and_then(|table| table.mul(k))
            .unwrap_or_else(|| mul(&self.point, k))
    }
}

/// A point on a Weierstrass or Edwards curve, or the point at infinity.
///
/// Weierstrass points may be held in affine or Jacobian coordinates; both compare equal when
/// they denote the same point. Arithmetic between the two families (or between different
/// curves) fails with [Error::UnsupportedOperation].
#[derive(Clone, Debug)]
pub enum Point {
    Infinity,
    Affine(AffinePoint),
    Jacobian(JacobianPoint),
    Edwards(EdwardsPoint),
}

impl Point {
    /// Returns whether this is the group identity.
    pub fn is_infinity(&self) -> bool {
        match self {
            Self::Infinity => true,
            Self::Affine(_) => false,
            Self::Jacobian(p) => p.is_identity(),
            Self::Edwards(p) => p.is_identity(),
        }
    }

    /// Returns the affine x coordinate, or `None` at infinity.
    pub fn x(&self) -> Option<BigUint> {
        self.affine().map(|(x, _)| x)
    }

    /// Returns the affine y coordinate, or `None` at infinity.
    pub fn y(&self) -> Option<BigUint> {
        self.affine().map(|(_, y)| y)
    }

    fn affine(&self) -> Option<(BigUint, BigUint)> {
        match self {
            Self::Infinity => None,
            Self::Affine(p) => Some((p.x().clone(), p.y().clone())),
            Self::Jacobian(p) => p.to_affine().map(|a| (a.x().clone(), a.y().clone())),
            Self::Edwards(p) => {
                if p.is_identity() {
                    return None;
                }
                Some(p.to_affine())
            }
        }
    }

    pub fn negate(&self) -> Point {
        match self {
            Self::Infinity => Self::Infinity,
            Self::Affine(p) => Self::Affine(p.negate()),
            Self::Jacobian(p) => Self::Jacobian(p.negate()),
            Self::Edwards(p) => Self::Edwards(p.negate()),
        }
    }

    pub fn double(&self) -> Point {
        match self {
            Self::Infinity => Self::Infinity,
            Self::Affine(p) => Self::from_jacobian(&p.to_jacobian().double(), true),
            Self::Jacobian(p) => Self::Jacobian(p.double()),
            Self::Edwards(p) => Self::Edwards(p.double()),
        }
    }

    /// Adds two points of the same curve.
    ///
    /// Affine operands produce an affine result; any Jacobian operand keeps the result in
    /// Jacobian coordinates.
    pub fn add(&self, other: &Point) -> Result<Point, Error> {
        match (self, other) {
            (Self::Infinity, p) | (p, Self::Infinity) => Ok(p.clone()),
            (Self::Edwards(a), Self::Edwards(b)) => {
                if a.curve() != b.curve() {
                    return Err(Error::unsupported("points lie on different curves"));
                }
                Ok(Self::Edwards(a.add(b)))
            }
            (Self::Edwards(_), _) | (_, Self::Edwards(_)) => Err(Error::unsupported(
                "cannot add Weierstrass and Edwards points",
            )),
            (a, b) => {
                let (ja, affine_a) = a.jacobian()?;
                let (jb, affine_b) = b.jacobian()?;
                if ja.curve() != jb.curve() {
                    return Err(Error::unsupported("points lie on different curves"));
                }
                Ok(Self::from_jacobian(&ja.add(&jb), affine_a && affine_b))
            }
        }
    }

    /// Returns `k * self`.
    pub fn mul(&self, k: &BigUint) -> Point {
        match self {
            Self::Infinity => Self::Infinity,
            Self::Affine(p) => Self::from_jacobian(&mul(&p.to_jacobian(), k), true),
            Self::Jacobian(p) => Self::Jacobian(mul(p, k)),
            Self::Edwards(p) => Self::Edwards(mul(p, k)),
        }
    }

    fn jacobian(&self) -> Result<(JacobianPoint, bool), Error> {
        match self {
            Self::Affine(p) => Ok((p.to_jacobian(), true)),
            Self::Jacobian(p) => Ok((p.clone(), false)),
            _ => Err(Error::unsupported("not a Weierstrass point")),
        }
    }

    fn from_jacobian(p: &JacobianPoint, affine: bool) -> Point {
        if !affine {
            return Self::Jacobian(p.clone());
        }
        match p.to_affine() {
            Some(a) => Self::Affine(a),
            None => Self::Infinity,
        }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Edwards(a), Self::Edwards(b)) => a.curve() == b.curve() && a == b,
            (Self::Edwards(_), Self::Affine(_) | Self::Jacobian(_))
            | (Self::Affine(_) | Self::Jacobian(_), Self::Edwards(_)) => false,
            (a, b) if a.is_infinity() || b.is_infinity() => {
                a.is_infinity() && b.is_infinity()
            }
            (a, b) => match (a.jacobian(), b.jacobian()) {
                (Ok((ja, _)), Ok((jb, _))) => ja.curve() == jb.curve() && ja == jb,
                _ => false,
            },
        }
    }
}

impl Eq for Point {}

impl From<AffinePoint> for Point {
    fn from(p: AffinePoint) -> Self {
        Self::Affine(p)
    }
}

impl From<JacobianPoint> for Point {
    fn from(p: JacobianPoint) -> Self {
        if p.is_identity() {
            return Self::Infinity;
        }
        Self::Jacobian(p)
    }
}

impl From<EdwardsPoint> for Point {
    fn from(p: EdwardsPoint) -> Self {
        Self::Edwards(p)
    }
}
