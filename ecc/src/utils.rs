//! Utility functions for encoding integers and bytes.

use num_bigint::BigUint;

/// Converts a byte slice to a hexadecimal string.
pub fn hex(bytes: &[u8]) -> String {
    let mut hex = String::new();
    for byte in bytes.iter() {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// Converts a hexadecimal string to bytes.
pub fn from_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| match u8::from_str_radix(hex.get(i..i + 2)?, 16) {
            Ok(byte) => Some(byte),
            Err(_) => None,
        })
        .collect()
}

/// Converts a hexadecimal string to bytes, stripping whitespace and/or a `0x` prefix. Commonly used
/// in testing to encode external test vectors without modification.
pub fn from_hex_formatted(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.replace(['\t', '\n', '\r', ' '], "");
    let res = hex.strip_prefix("0x").unwrap_or(&hex);
    from_hex(res)
}

/// Number of bytes needed to hold any value below `modulus` (at least one).
pub fn byte_length(modulus: &BigUint) -> usize {
    (modulus.bits().max(1) as usize).div_ceil(8)
}

/// Big-endian encoding of `value` left-padded with zeros to `len` bytes.
///
/// Returns `None` if `value` does not fit.
pub fn to_be_fixed(value: &BigUint, len: usize) -> Option<Vec<u8>> {
    let raw = value.to_bytes_be();
    let raw: &[u8] = if raw == [0] { &[] } else { &raw };
    if raw.len() > len {
        return None;
    }
    let mut out = vec![0u8; len - raw.len()];
    out.extend_from_slice(raw);
    Some(out)
}

/// Little-endian encoding of `value` right-padded with zeros to `len` bytes.
///
/// Returns `None` if `value` does not fit.
pub fn to_le_fixed(value: &BigUint, len: usize) -> Option<Vec<u8>> {
    let mut out = to_be_fixed(value, len)?;
    out.reverse();
    Some(out)
}
