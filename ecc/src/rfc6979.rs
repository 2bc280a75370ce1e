//! Deterministic nonce generation for ECDSA ([RFC 6979](https://www.rfc-editor.org/rfc/rfc6979)).
//!
//! [NonceGenerator] is an unbounded iterator over the candidates of section 3.2 that fall in
//! `[1, n-1]`. Signing takes the first candidate and only pulls more when a candidate produces
//! `r = 0` or `s = 0`, so the same key, digest and extra entropy always yield the same
//! signature.

use crate::{hash::HashAlgorithm, utils::to_be_fixed};
use num_bigint::BigUint;
use num_traits::Zero;
use zeroize::Zeroizing;

/// Interprets `data` as a big-endian integer keeping only its leftmost `qlen` bits.
pub fn bits2int(data: &[u8], qlen: u64) -> BigUint {
    let x = BigUint::from_bytes_be(data);
    let l = data.len() as u64 * 8;
    if l > qlen {
        x >> (l - qlen)
    } else {
        x
    }
}

/// Reduces a digest modulo `order` and encodes it at the order's byte length.
fn bits2octets(data: &[u8], order: &BigUint, rolen: usize) -> Vec<u8> {
    let z1 = bits2int(data, order.bits());
    let z2 = if &z1 >= order { z1 - order } else { z1 };
    to_be_fixed(&z2, rolen).expect("value below order")
}

/// HMAC_DRBG stream of nonce candidates.
pub struct NonceGenerator {
    hash: HashAlgorithm,
    order: BigUint,
    qlen: u64,
    rolen: usize,
    k: Zeroizing<Vec<u8>>,
    v: Zeroizing<Vec<u8>>,
    started: bool,
}

impl NonceGenerator {
    /// Seeds the generator with the secret exponent, the message digest and optional
    /// additional data (section 3.6).
    pub fn new(
        order: &BigUint,
        secret: &BigUint,
        hash: HashAlgorithm,
        digest: &[u8],
        extra_entropy: &[u8],
    ) -> Self {
        let qlen = order.bits();
        let rolen = qlen.div_ceil(8) as usize;
        let x = Zeroizing::new(to_be_fixed(&(secret % order), rolen).expect("value below order"));
        let h = bits2octets(digest, order, rolen);

        let holen = hash.output_len();
        let v = vec![0x01u8; holen];
        let k = vec![0x00u8; holen];
        let k = hash.hmac(&k, &[&v, &[0x00u8], &x, &h, extra_entropy]);
        let v = hash.hmac(&k, &[&v]);
        let k = hash.hmac(&k, &[&v, &[0x01u8], &x, &h, extra_entropy]);
        let v = hash.hmac(&k, &[&v]);
        Self {
            hash,
            order: order.clone(),
            qlen,
            rolen,
            k: Zeroizing::new(k),
            v: Zeroizing::new(v),
            started: false,
        }
    }

    fn candidate(&mut self) -> BigUint {
        let mut t = Zeroizing::new(Vec::with_capacity(self.rolen));
        while t.len() < self.rolen {
            self.v = Zeroizing::new(self.hash.hmac(&self.k, &[&self.v]));
            t.extend_from_slice(&self.v);
        }
        bits2int(&t, self.qlen)
    }

    fn reseed(&mut self) {
        self.k = Zeroizing::new(self.hash.hmac(&self.k, &[&self.v, &[0x00u8]]));
        self.v = Zeroizing::new(self.hash.hmac(&self.k, &[&self.v]));
    }
}

impl Iterator for NonceGenerator {
    type Item = BigUint;

    fn next(&mut self) -> Option<BigUint> {
        loop {
            if self.started {
                self.reseed();
            }
            self.started = true;
            let k = self.candidate();
            if !k.is_zero() && k < self.order {
                return Some(k);
            }
        }
    }
}
