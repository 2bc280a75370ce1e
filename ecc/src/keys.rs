//! Signing and verifying keys bound to a [Curve].
//!
//! Keys on short Weierstrass curves sign with ECDSA, keys on twisted Edwards curves sign with
//! EdDSA. The family is fixed by the curve, so the same types serve both.

use crate::{
    curve::{Config, Curve, Family},
    ecdsa::{self, RecoveryId},
    eddsa,
    edwards::EdwardsPoint,
    hash::HashAlgorithm,
    point::{mul, Group, Point, Precomputed},
    rfc6979::NonceGenerator,
    secret::Secret,
    signature::{Encoded, Encoding, Signature},
    utils::{hex, to_be_fixed},
    weierstrass::{AffinePoint, JacobianPoint, PointEncoding},
    Error,
};
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use zeroize::Zeroizing;

/// Multiplication table for a public point, built only once requested.
struct Cache<G> {
    requested: AtomicBool,
    table: Precomputed<G>,
}

impl<G: Group> Cache<G> {
    fn new(curve: &Curve, point: G) -> Arc<Self> {
        Arc::new(Self {
            requested: AtomicBool::new(false),
            table: Precomputed::new(
                format!("{} public key", curve.name()),
                point,
                curve.order().bits(),
            ),
        })
    }

    fn precompute(&self, lazy: bool) {
        self.requested.store(true, Ordering::Release);
        if !lazy {
            self.table.table();
        }
    }

    fn mul(&self, k: &BigUint) -> G {
        if self.requested.load(Ordering::Acquire) {
            self.table.mul(k)
        } else {
            self.table.mul_if_built(k)
        }
    }

    fn is_built(&self) -> bool {
        self.table.is_built()
    }
}

#[derive(Clone)]
enum Public {
    Weierstrass {
        point: AffinePoint,
        cache: Arc<Cache<JacobianPoint>>,
    },
    Edwards {
        point: EdwardsPoint,
        encoded: Vec<u8>,
        cache: Arc<Cache<EdwardsPoint>>,
    },
}

fn unsupported_for_edwards(curve: &Curve, operation: &str) -> Result<(), Error> {
    if curve.is_edwards() {
        return Err(Error::unsupported(format!(
            "{operation} is unsupported for Edwards curves ({curve})"
        )));
    }
    Ok(())
}

/// A public key.
///
/// Equality compares the curve and the point. Precomputation is a cache and never affects
/// equality or verification results.
#[derive(Clone)]
pub struct VerifyingKey {
    curve: Curve,
    hash: HashAlgorithm,
    public: Public,
}

impl VerifyingKey {
    fn weierstrass(curve: &Curve, point: AffinePoint) -> Self {
        let cache = Cache::new(curve, point.to_jacobian());
        Self {
            curve: curve.clone(),
            hash: HashAlgorithm::default(),
            public: Public::Weierstrass { point, cache },
        }
    }

    fn edwards(curve: &Curve, point: EdwardsPoint) -> Self {
        let cache = Cache::new(curve, point.clone());
        Self {
            curve: curve.clone(),
            hash: HashAlgorithm::default(),
            public: Public::Edwards {
                encoded: point.to_bytes(),
                point,
                cache,
            },
        }
    }

    /// Builds a key from a Weierstrass point on `curve`.
    ///
    /// Edwards keys must be decoded from bytes with [VerifyingKey::from_bytes].
    pub fn from_public_point(point: &Point, curve: &Curve) -> Result<Self, Error> {
        if curve.is_edwards() {
            return Err(Error::unsupported(format!(
                "public points are incompatible with Edwards curves ({curve}), \
                 decode the key from bytes instead"
            )));
        }
        let (w, _) = ecdsa::weierstrass(curve)?;
        let point = match point {
            Point::Affine(p) => p.clone(),
            Point::Jacobian(p) => p
                .to_affine()
                .ok_or_else(|| Error::malformed("public key is the point at infinity"))?,
            Point::Infinity => return Err(Error::malformed("public key is the point at infinity")),
            Point::Edwards(_) => {
                return Err(Error::unsupported(
                    "Edwards points are incompatible with Weierstrass curves",
                ))
            }
        };
        if point.curve() != w {
            return Err(Error::malformed("point is not on the curve of the key"));
        }
        Self::validated(curve, point)
    }

    /// Checks subgroup membership where the cofactor allows points outside it.
    fn validated(curve: &Curve, point: AffinePoint) -> Result<Self, Error> {
        if !curve.cofactor().is_one() && !mul(&point.to_jacobian(), curve.order()).is_identity()
        {
            return Err(Error::malformed(
                "point does not belong to the subgroup of the generator",
            ));
        }
        Ok(Self::weierstrass(curve, point))
    }

    /// Decodes a key accepting every point encoding.
    pub fn from_bytes(bytes: &[u8], curve: &Curve) -> Result<Self, Error> {
        Self::from_bytes_with_config(bytes, curve, &Config::default())
    }

    /// Decodes a key accepting only the point encodings enabled in `config`.
    ///
    /// Edwards keys have a single encoding and must not be of small order.
    pub fn from_bytes_with_config(
        bytes: &[u8],
        curve: &Curve,
        config: &Config,
    ) -> Result<Self, Error> {
        match curve.family() {
            Family::Weierstrass { curve: w, .. } => {
                let point = AffinePoint::from_bytes(w.clone(), bytes, &config.point_encodings)?;
                Self::validated(curve, point)
            }
            Family::Edwards { curve: e, .. } => {
                let point = EdwardsPoint::from_bytes(e.clone(), bytes)?;
                eddsa::check_public(curve, &point)?;
                Ok(Self::edwards(curve, point))
            }
        }
    }

    /// Sets the hash used by the message-based verification and recovery methods.
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn point(&self) -> Point {
        match &self.public {
            Public::Weierstrass { point, .. } => Point::Affine(point.clone()),
            Public::Edwards { point, .. } => Point::Edwards(point.clone()),
        }
    }

    /// Encodes the public point. Edwards keys ignore `encoding`.
    pub fn to_bytes(&self, encoding: PointEncoding) -> Vec<u8> {
        match &self.public {
            Public::Weierstrass { point, .. } => point.to_bytes(encoding),
            Public::Edwards { encoded, .. } => encoded.clone(),
        }
    }

    /// Prepares a multiplication table for the public point.
    ///
    /// With `lazy` the table is built by the first verification that needs it. Clones of this key
    /// share the table, so precomputing one precomputes them all.
    pub fn precompute(&self, lazy: bool) {
        match &self.public {
            Public::Weierstrass { cache, .. } => cache.precompute(lazy),
            Public::Edwards { cache, .. } => cache.precompute(lazy),
        }
    }

    /// Returns whether the multiplication table has been built.
    pub fn is_precomputed(&self) -> bool {
        match &self.public {
            Public::Weierstrass { cache, .. } => cache.is_built(),
            Public::Edwards { cache, .. } => cache.is_built(),
        }
    }

    /// Verifies a signature over `msg`, hashing it with the key's algorithm.
    pub fn verify(&self, signature: &Encoded, msg: &[u8]) -> Result<(), Error> {
        match &self.public {
            Public::Weierstrass { .. } => {
                let digest = self.hash.digest(msg);
                self.verify_ecdsa(signature, &digest, true)
            }
            Public::Edwards { encoded, cache, .. } => {
                let Encoded::Raw(bytes) = signature else {
                    return Err(Error::unsupported(format!(
                        "EdDSA signatures only use the raw encoding, got {:?}",
                        signature.encoding()
                    )));
                };
                eddsa::verify(&self.curve, |k| cache.mul(k), encoded, bytes, msg)
            }
        }
    }

    /// Verifies a signature over a precomputed digest no longer than the order.
    pub fn verify_digest(&self, signature: &Encoded, digest: &[u8]) -> Result<(), Error> {
        unsupported_for_edwards(&self.curve, "verifying a digest")?;
        self.verify_ecdsa(signature, digest, false)
    }

    fn verify_ecdsa(
        &self,
        signature: &Encoded,
        digest: &[u8],
        allow_truncate: bool,
    ) -> Result<(), Error> {
        let Public::Weierstrass { cache, .. } = &self.public else {
            return Err(Error::unsupported("ECDSA is unsupported for Edwards curves"));
        };
        let z = ecdsa::digest_to_number(digest, self.curve.order(), allow_truncate)?;
        let signature = Signature::decode(signature, self.curve.order_len())?;
        ecdsa::verify(&self.curve, |k| cache.mul(k), &signature, &z)
    }

    /// Returns the two keys that validate `signature` over `msg`.
    pub fn from_public_key_recovery(
        signature: &Encoded,
        msg: &[u8],
        curve: &Curve,
        hash: HashAlgorithm,
    ) -> Result<Vec<Self>, Error> {
        unsupported_for_edwards(curve, "public key recovery")?;
        let digest = hash.digest(msg);
        Self::recover_candidates(signature, &digest, curve, hash, true)
    }

    /// Returns the two keys that validate `signature` over `digest`.
    pub fn from_public_key_recovery_with_digest(
        signature: &Encoded,
        digest: &[u8],
        curve: &Curve,
        hash: HashAlgorithm,
    ) -> Result<Vec<Self>, Error> {
        unsupported_for_edwards(curve, "public key recovery")?;
        Self::recover_candidates(signature, digest, curve, hash, false)
    }

    fn recover_candidates(
        signature: &Encoded,
        digest: &[u8],
        curve: &Curve,
        hash: HashAlgorithm,
        allow_truncate: bool,
    ) -> Result<Vec<Self>, Error> {
        let z = ecdsa::digest_to_number(digest, curve.order(), allow_truncate)?;
        let signature = Signature::decode(signature, curve.order_len())?;
        Ok(ecdsa::recover_candidates(curve, &signature, &z)?
            .into_iter()
            .map(|point| Self::weierstrass(curve, point).with_hash(hash))
            .collect())
    }

    /// Returns the key identified by `id` that produced `signature` over `msg`.
    pub fn recover(
        signature: &Encoded,
        msg: &[u8],
        id: RecoveryId,
        curve: &Curve,
        hash: HashAlgorithm,
    ) -> Result<Self, Error> {
        unsupported_for_edwards(curve, "public key recovery")?;
        let z = ecdsa::digest_to_number(&hash.digest(msg), curve.order(), true)?;
        let signature = Signature::decode(signature, curve.order_len())?;
        let point = ecdsa::recover(curve, &signature, &z, id)?;
        Ok(Self::weierstrass(curve, point).with_hash(hash))
    }
}

impl PartialEq for VerifyingKey {
    fn eq(&self, other: &Self) -> bool {
        if self.curve != other.curve {
            return false;
        }
        match (&self.public, &other.public) {
            (Public::Weierstrass { point: a, .. }, Public::Weierstrass { point: b, .. }) => a == b,
            (Public::Edwards { point: a, .. }, Public::Edwards { point: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for VerifyingKey {}

impl PartialEq<SigningKey> for VerifyingKey {
    fn eq(&self, _: &SigningKey) -> bool {
        false
    }
}

impl fmt::Display for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VerifyingKey({}, {})",
            self.curve,
            hex(&self.to_bytes(PointEncoding::Uncompressed))
        )
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A private key.
///
/// ECDSA keys hold the secret exponent (big-endian, order length), EdDSA keys hold the seed.
/// Neither is printed by `Debug`.
#[derive(Clone)]
pub struct SigningKey {
    curve: Curve,
    hash: HashAlgorithm,
    secret: Secret,
    verifying_key: VerifyingKey,
}

impl SigningKey {
    /// Generates a key with a uniformly random exponent (or seed, for Edwards curves).
    pub fn generate<R: RngCore + CryptoRng>(curve: &Curve, rng: &mut R) -> Result<Self, Error> {
        if curve.is_edwards() {
            let mut seed = Zeroizing::new(vec![0u8; curve.coordinate_len()]);
            rng.fill_bytes(&mut seed);
            return Self::from_bytes(&seed, curve);
        }
        let exponent = rng.gen_biguint_range(&BigUint::one(), curve.order());
        Self::from_secret_exponent(&exponent, curve)
    }

    /// Builds an ECDSA key from an exponent in `[1, n-1]`.
    pub fn from_secret_exponent(exponent: &BigUint, curve: &Curve) -> Result<Self, Error> {
        if curve.is_edwards() {
            return Err(Error::unsupported(format!(
                "secret exponents are incompatible with Edwards curves ({curve}), use a seed"
            )));
        }
        let (_, generator) = ecdsa::weierstrass(curve)?;
        if exponent.is_zero() || exponent >= curve.order() {
            return Err(Error::malformed("invalid secret exponent: must be in [1, n-1]"));
        }
        let point = generator
            .mul(exponent)
            .to_affine()
            .ok_or_else(|| Error::malformed("public key is the point at infinity"))?;
        let secret = to_be_fixed(exponent, curve.order_len())
            .ok_or_else(|| Error::malformed("secret exponent longer than the order"))?;
        Ok(Self {
            curve: curve.clone(),
            hash: HashAlgorithm::default(),
            secret: Secret::new(secret),
            verifying_key: VerifyingKey::weierstrass(curve, point),
        })
    }

    /// Decodes an exponent (order length, big-endian) or an EdDSA seed.
    pub fn from_bytes(bytes: &[u8], curve: &Curve) -> Result<Self, Error> {
        if !curve.is_edwards() {
            let expected = curve.order_len();
            if bytes.len() != expected {
                return Err(Error::malformed(format!(
                    "invalid length of private key: expected {expected} bytes, got {}",
                    bytes.len()
                )));
            }
            return Self::from_secret_exponent(&BigUint::from_bytes_be(bytes), curve);
        }
        let expanded = eddsa::expand(curve, bytes)?;
        let point = eddsa::public_point(curve, expanded.scalar())?;
        Ok(Self {
            curve: curve.clone(),
            hash: HashAlgorithm::default(),
            secret: Secret::new(bytes.to_vec()),
            verifying_key: VerifyingKey::edwards(curve, point),
        })
    }

    /// Exports the exponent or seed.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.secret.expose().to_vec())
    }

    /// Sets the hash used for messages and for RFC 6979 nonces (also on the verifying key).
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self.verifying_key = self.verifying_key.with_hash(hash);
        self
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    fn exponent(&self) -> BigUint {
        BigUint::from_bytes_be(self.secret.expose())
    }

    /// Signs `msg`. ECDSA nonces are drawn from `rng`; EdDSA is deterministic and ignores it.
    pub fn sign<R: RngCore + CryptoRng>(
        &self,
        msg: &[u8],
        encoding: Encoding,
        rng: &mut R,
    ) -> Result<Encoded, Error> {
        if self.curve.is_edwards() {
            return self.sign_eddsa(msg, encoding);
        }
        let digest = self.hash.digest(msg);
        self.sign_random(&digest, true, encoding, rng)
    }

    /// Signs a digest no longer than the order with a random nonce.
    pub fn sign_digest<R: RngCore + CryptoRng>(
        &self,
        digest: &[u8],
        encoding: Encoding,
        rng: &mut R,
    ) -> Result<Encoded, Error> {
        unsupported_for_edwards(&self.curve, "signing a digest")?;
        self.sign_random(digest, false, encoding, rng)
    }

    /// Signs `msg` with a nonce derived from the key and message (RFC 6979).
    ///
    /// `extra_entropy` is mixed into the nonce derivation; EdDSA keys require it to be empty.
    pub fn sign_deterministic(
        &self,
        msg: &[u8],
        encoding: Encoding,
        extra_entropy: &[u8],
    ) -> Result<Encoded, Error> {
        if self.curve.is_edwards() {
            if !extra_entropy.is_empty() {
                return Err(Error::unsupported("EdDSA signing does not take extra entropy"));
            }
            return self.sign_eddsa(msg, encoding);
        }
        let digest = self.hash.digest(msg);
        let (signature, _) = self.sign_rfc6979(&digest, true, encoding, extra_entropy)?;
        Ok(signature)
    }

    /// Signs a digest no longer than the order with a nonce derived per RFC 6979.
    pub fn sign_digest_deterministic(
        &self,
        digest: &[u8],
        encoding: Encoding,
        extra_entropy: &[u8],
    ) -> Result<Encoded, Error> {
        unsupported_for_edwards(&self.curve, "signing a digest")?;
        let (signature, _) = self.sign_rfc6979(digest, false, encoding, extra_entropy)?;
        Ok(signature)
    }

    /// Signs `msg` deterministically and returns the id needed to recover the public key.
    pub fn sign_recoverable(
        &self,
        msg: &[u8],
        encoding: Encoding,
        extra_entropy: &[u8],
    ) -> Result<(Encoded, RecoveryId), Error> {
        unsupported_for_edwards(&self.curve, "public key recovery")?;
        let digest = self.hash.digest(msg);
        self.sign_rfc6979(&digest, true, encoding, extra_entropy)
    }

    fn sign_random<R: RngCore + CryptoRng>(
        &self,
        digest: &[u8],
        allow_truncate: bool,
        encoding: Encoding,
        rng: &mut R,
    ) -> Result<Encoded, Error> {
        let one = BigUint::one();
        let order = self.curve.order();
        let nonces = std::iter::repeat_with(|| rng.gen_biguint_range(&one, order));
        let (signature, _) = self.sign_ecdsa(digest, allow_truncate, encoding, nonces)?;
        Ok(signature)
    }

    fn sign_rfc6979(
        &self,
        digest: &[u8],
        allow_truncate: bool,
        encoding: Encoding,
        extra_entropy: &[u8],
    ) -> Result<(Encoded, RecoveryId), Error> {
        let nonces = NonceGenerator::new(
            self.curve.order(),
            &self.exponent(),
            self.hash,
            digest,
            extra_entropy,
        );
        self.sign_ecdsa(digest, allow_truncate, encoding, nonces)
    }

    fn sign_ecdsa(
        &self,
        digest: &[u8],
        allow_truncate: bool,
        encoding: Encoding,
        nonces: impl IntoIterator<Item = BigUint>,
    ) -> Result<(Encoded, RecoveryId), Error> {
        let z = ecdsa::digest_to_number(digest, self.curve.order(), allow_truncate)?;
        let (signature, id) = ecdsa::sign(&self.curve, &self.exponent(), &z, nonces)?;
        Ok((signature.encode(encoding, self.curve.order_len())?, id))
    }

    fn sign_eddsa(&self, msg: &[u8], encoding: Encoding) -> Result<Encoded, Error> {
        if encoding != Encoding::Raw {
            return Err(Error::unsupported(format!(
                "EdDSA signatures only use the raw encoding, got {encoding:?}"
            )));
        }
        let expanded = eddsa::expand(&self.curve, self.secret.expose())?;
        let public = self.verifying_key.to_bytes(PointEncoding::Raw);
        Ok(Encoded::Raw(eddsa::sign(
            &self.curve,
            &expanded,
            &public,
            msg,
        )?))
    }
}

impl PartialEq for SigningKey {
    fn eq(&self, other: &Self) -> bool {
        self.curve == other.curve && self.secret == other.secret
    }
}

impl Eq for SigningKey {}

impl PartialEq<VerifyingKey> for SigningKey {
    fn eq(&self, _: &VerifyingKey) -> bool {
        false
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("curve", &self.curve.name())
            .field("hash", &self.hash)
            .field("secret", &self.secret)
            .field("verifying_key", &self.verifying_key)
            .finish()
    }
}
