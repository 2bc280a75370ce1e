#![no_main]

use arbitrary::Arbitrary;
use commonware_ecc::{curve, Config, PointEncoding, VerifyingKey};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    curve: u8,
    encodings: [bool; 4],
    bytes: Vec<u8>,
}

fn fuzz(input: FuzzInput) {
    let curves = curve::catalogue();
    let curve = &curves[input.curve as usize % curves.len()];
    let enabled: Vec<PointEncoding> = PointEncoding::ALL
        .into_iter()
        .zip(input.encodings)
        .filter_map(|(encoding, on)| on.then_some(encoding))
        .collect();
    let config = Config::default().with_point_encodings(&enabled);
    let Ok(key) = VerifyingKey::from_bytes_with_config(&input.bytes, curve, &config) else {
        return;
    };

    // Every encoding of a decoded key decodes back to the same key
    for encoding in PointEncoding::ALL {
        let encoded = key.to_bytes(encoding);
        assert_eq!(VerifyingKey::from_bytes(&encoded, curve).unwrap(), key);
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
