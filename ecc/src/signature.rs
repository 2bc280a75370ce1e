//! ECDSA signature codec.
//!
//! A [Signature] is the integer pair `(r, s)`. It can be moved between three encodings:
//!
//! - [Encoding::Raw]: `r || s`, each big-endian and left-padded to the byte length of the
//!   curve order.
//! - [Encoding::Der]: `SEQUENCE { INTEGER r, INTEGER s }` with minimal integer and length
//!   encodings. Decoding is strict and rejects anything a canonical encoder would not emit.
//! - [Encoding::Strings]: `r` and `s` as two separate fixed-width big-endian strings.

use crate::{
    utils::{hex, to_be_fixed},
    Error,
};
use num_bigint::BigUint;

const TAG_INTEGER: u8 = 0x02;
const TAG_SEQUENCE: u8 = 0x30;

/// Selects a signature encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    Raw,
    Der,
    Strings,
}

/// An encoded signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Encoded {
    Raw(Vec<u8>),
    Der(Vec<u8>),
    Strings(Vec<u8>, Vec<u8>),
}

impl Encoded {
    /// Returns the encoding this value is in.
    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Raw(_) => Encoding::Raw,
            Self::Der(_) => Encoding::Der,
            Self::Strings(..) => Encoding::Strings,
        }
    }
}

/// An ECDSA signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> &BigUint {
        &self.r
    }

    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Encodes the signature. `order_len` is the byte length of the curve order.
    pub fn encode(&self, encoding: Encoding, order_len: usize) -> Result<Encoded, Error> {
        match encoding {
            Encoding::Raw => {
                let mut out = fixed(&self.r, order_len, "r")?;
                out.extend_from_slice(&fixed(&self.s, order_len, "s")?);
                Ok(Encoded::Raw(out))
            }
            Encoding::Der => Ok(Encoded::Der(self.to_der())),
            Encoding::Strings => Ok(Encoded::Strings(
                fixed(&self.r, order_len, "r")?,
                fixed(&self.s, order_len, "s")?,
            )),
        }
    }

    /// Decodes a signature in any encoding. `order_len` is the byte length of the curve order.
    pub fn decode(encoded: &Encoded, order_len: usize) -> Result<Self, Error> {
        match encoded {
            Encoded::Raw(bytes) => Self::from_raw(bytes, order_len),
            Encoded::Der(bytes) => Self::from_der(bytes, order_len),
            Encoded::Strings(r, s) => Self::from_strings(r, s, order_len),
        }
    }

    /// Decodes `r || s`.
    pub fn from_raw(bytes: &[u8], order_len: usize) -> Result<Self, Error> {
        if bytes.len() != 2 * order_len {
            return Err(Error::malformed(format!(
                "invalid length of signature: expected {} bytes, got {}",
                2 * order_len,
                bytes.len()
            )));
        }
        let (r, s) = bytes.split_at(order_len);
        Ok(Self::new(
            BigUint::from_bytes_be(r),
            BigUint::from_bytes_be(s),
        ))
    }

    /// Decodes the pair of fixed-width strings.
    pub fn from_strings(r: &[u8], s: &[u8], order_len: usize) -> Result<Self, Error> {
        for (name, part) in [("r", r), ("s", s)] {
            if part.len() != order_len {
                return Err(Error::malformed(format!(
                    "invalid length of {name}: expected {order_len} bytes, got {}",
                    part.len()
                )));
            }
        }
        Ok(Self::new(
            BigUint::from_bytes_be(r),
            BigUint::from_bytes_be(s),
        ))
    }

    /// Encodes `SEQUENCE { INTEGER r, INTEGER s }`.
    pub fn to_der(&self) -> Vec<u8> {
        let mut body = der_integer(&self.r);
        body.extend_from_slice(&der_integer(&self.s));
        let mut out = vec![TAG_SEQUENCE];
        out.extend_from_slice(&der_length(body.len()));
        out.extend_from_slice(&body);
        out
    }

    /// Strictly decodes `SEQUENCE { INTEGER r, INTEGER s }`.
    ///
    /// Integers must fit in `order_len` bytes, not counting a leading sign byte.
    pub fn from_der(bytes: &[u8], order_len: usize) -> Result<Self, Error> {
        let (body, rest) = read_element(bytes, TAG_SEQUENCE, "sequence")?;
        if !rest.is_empty() {
            return Err(Error::encoding(format!(
                "trailing junk after DER signature: {}",
                hex(rest)
            )));
        }
        let (r, body) = read_integer(body, order_len)?;
        let (s, body) = read_integer(body, order_len)?;
        if !body.is_empty() {
            return Err(Error::encoding(format!(
                "trailing junk after DER numbers: {}",
                hex(body)
            )));
        }
        Ok(Self::new(r, s))
    }
}

fn fixed(value: &BigUint, len: usize, name: &str) -> Result<Vec<u8>, Error> {
    to_be_fixed(value, len)
        .ok_or_else(|| Error::malformed(format!("{name} does not fit in {len} bytes")))
}

fn der_integer(value: &BigUint) -> Vec<u8> {
    let mut content = value.to_bytes_be();
    if content[0] & 0x80 != 0 {
        content.insert(0, 0x00);
    }
    let mut out = vec![TAG_INTEGER];
    out.extend_from_slice(&der_length(content.len()));
    out.extend_from_slice(&content);
    out
}

fn der_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let mut out = vec![0x80 | (bytes.len() - skip) as u8];
    out.extend_from_slice(&bytes[skip..]);
    out
}

/// Reads a definite, minimally encoded length. Returns the length and the bytes it used.
fn read_length(bytes: &[u8]) -> Result<(usize, usize), Error> {
    let first = *bytes
        .first()
        .ok_or_else(|| Error::encoding("missing length"))?;
    if first < 0x80 {
        return Ok((first as usize, 1));
    }
    let count = (first & 0x7f) as usize;
    if count == 0 {
        return Err(Error::encoding("indefinite length encoding is not allowed"));
    }
    if count > std::mem::size_of::<usize>() {
        return Err(Error::encoding("length is too large"));
    }
    let encoded = bytes
        .get(1..1 + count)
        .ok_or_else(|| Error::encoding("length longer than the provided buffer"))?;
    if encoded[0] == 0 {
        return Err(Error::encoding("non-minimal encoding of length"));
    }
    let len = encoded
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | *b as usize);
    if len < 0x80 {
        return Err(Error::encoding("non-minimal encoding of length"));
    }
    Ok((len, 1 + count))
}

/// Reads one TLV element with the expected tag. Returns its contents and the remaining input.
fn read_element<'a>(bytes: &'a [u8], tag: u8, name: &str) -> Result<(&'a [u8], &'a [u8]), Error> {
    let first = *bytes
        .first()
        .ok_or_else(|| Error::encoding(format!("empty string, wanted type '{name}'")))?;
    if first != tag {
        return Err(Error::encoding(format!(
            "wanted type '{name}' ({tag:#04x}), got {first:#04x}"
        )));
    }
    let (len, used) = read_length(&bytes[1..])?;
    let rest = &bytes[1 + used..];
    if len > rest.len() {
        return Err(Error::encoding(format!(
            "length of {name} ({len}) longer than the provided buffer ({})",
            rest.len()
        )));
    }
    Ok(rest.split_at(len))
}

fn read_integer(bytes: &[u8], max: usize) -> Result<(BigUint, &[u8]), Error> {
    let (content, rest) = read_element(bytes, TAG_INTEGER, "integer")?;
    match content {
        [] => return Err(Error::encoding("integer with no content")),
        [first, ..] if first & 0x80 != 0 => {
            return Err(Error::encoding("negative integers are not supported"))
        }
        [0x00, second, ..] if second & 0x80 == 0 => {
            return Err(Error::encoding("non-minimal encoding of integer"))
        }
        _ => {}
    }
    let value = content.strip_prefix(&[0x00]).unwrap_or(content);
    if value.len() > max {
        return Err(Error::encoding(format!(
            "integer of {} bytes is longer than the order allows ({max})",
            value.len()
        )));
    }
    Ok((BigUint::from_bytes_be(content), rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::from_hex_formatted;
    use num_bigint::RandBigInt;
    use rand::{rngs::StdRng, SeedableRng};
    use test_case::test_case;

    fn sig(r: u64, s: u64) -> Signature {
        Signature::new(BigUint::from(r), BigUint::from(s))
    }

    fn der(hex: &str) -> Vec<u8> {
        from_hex_formatted(hex).unwrap()
    }

    #[test]
    fn test_der_known_encodings() {
        assert_eq!(sig(1, 1).to_der(), der("3006 020101 020101"));
        assert_eq!(sig(0, 0x80).to_der(), der("3007 020100 0202 0080"));
        assert_eq!(sig(0x7f, 0x0100).to_der(), der("3007 02017f 0202 0100"));
    }

    #[test]
    fn test_der_long_form_length() {
        // Two 66-byte integers with the high bit set: body of 2 * (2 + 67) = 138 bytes
        let big = (BigUint::from(1u32) << 527u32) + 1u32;
        let encoded = Signature::new(big.clone(), big.clone()).to_der();
        assert_eq!(&encoded[..3], &[0x30, 0x81, 138]);
        let decoded = Signature::from_der(&encoded, 66).unwrap();
        assert_eq!(decoded.r(), &big);
    }

    #[test_case(Encoding::Raw; "raw")]
    #[test_case(Encoding::Der; "der")]
    #[test_case(Encoding::Strings; "strings")]
    fn test_round_trip(encoding: Encoding) {
        let mut rng = StdRng::seed_from_u64(0);
        let order = BigUint::from_bytes_be(&[0xff; 32]);
        for _ in 0..32 {
            let s = Signature::new(
                rng.gen_biguint_below(&order),
                rng.gen_biguint_below(&order),
            );
            let encoded = s.encode(encoding, 32).unwrap();
            assert_eq!(encoded.encoding(), encoding);
            assert_eq!(Signature::decode(&encoded, 32).unwrap(), s);
        }
        let small = sig(0, 1);
        let encoded = small.encode(encoding, 32).unwrap();
        assert_eq!(Signature::decode(&encoded, 32).unwrap(), small);
    }

    #[test]
    fn test_fixed_width_encodings() {
        let s = sig(0x0102, 0x03);
        assert_eq!(
            s.encode(Encoding::Raw, 2).unwrap(),
            Encoded::Raw(vec![0x01, 0x02, 0x00, 0x03])
        );
        assert_eq!(
            s.encode(Encoding::Strings, 2).unwrap(),
            Encoded::Strings(vec![0x01, 0x02], vec![0x00, 0x03])
        );
        assert!(s.encode(Encoding::Raw, 1).is_err());
    }

    #[test]
    fn test_fixed_width_rejects_lengths() {
        assert!(matches!(
            Signature::from_raw(&[0; 3], 2),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            Signature::from_strings(&[0; 2], &[0; 3], 2),
            Err(Error::MalformedInput(_))
        ));
        assert!(Signature::from_strings(&[0; 2], &[0; 2], 2).is_ok());
    }

    #[test_case("", "empty"; "empty")]
    #[test_case("3106020101020101", "wanted type 'sequence'"; "wrong sequence tag")]
    #[test_case("3006030101020101", "wanted type 'integer'"; "wrong integer tag")]
    #[test_case("3080020101020101", "indefinite"; "indefinite length")]
    #[test_case("308106020101020101", "non-minimal encoding of length"; "long form short length")]
    #[test_case("30820006020101020101", "non-minimal encoding of length"; "padded length")]
    #[test_case("3007020101020101", "longer than the provided buffer"; "truncated")]
    #[test_case("300602010102010100", "trailing junk after DER signature"; "junk after sequence")]
    #[test_case("3009020101020101020101", "trailing junk after DER numbers"; "junk inside sequence")]
    #[test_case("3006020181020101", "negative"; "negative integer")]
    #[test_case("30050200020101", "no content"; "empty integer")]
    #[test_case("300702020001020101", "non-minimal encoding of integer"; "padded integer")]
    #[test_case("3009020401020304020101", "longer than the order"; "oversized integer")]
    #[test_case("30080203010203020101", "longer than the order"; "one byte too wide")]
    fn test_der_rejects(encoded: &str, message: &str) {
        let bytes = der(encoded);
        match Signature::from_der(&bytes, 2) {
            Err(Error::UnexpectedEncoding(msg)) => {
                assert!(msg.contains(message), "{msg}")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_der_accepts_sign_byte() {
        // 0x00 0x80 is the minimal encoding of 128
        let decoded = Signature::from_der(&der("3007 0202 0080 020101"), 1).unwrap();
        assert_eq!(decoded, sig(0x80, 1));
    }
}
