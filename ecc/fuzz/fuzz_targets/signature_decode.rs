#![no_main]

use arbitrary::Arbitrary;
use commonware_ecc::{Encoded, Encoding, Signature};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Input {
    Raw(Vec<u8>),
    Der(Vec<u8>),
    Strings(Vec<u8>, Vec<u8>),
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    order_len: u8,
    input: Input,
}

fn fuzz(input: FuzzInput) {
    let order_len = input.order_len.max(1) as usize;
    let encoded = match input.input {
        Input::Raw(bytes) => Encoded::Raw(bytes),
        Input::Der(bytes) => Encoded::Der(bytes),
        Input::Strings(r, s) => Encoded::Strings(r, s),
    };
    let Ok(signature) = Signature::decode(&encoded, order_len) else {
        return;
    };

    // Anything accepted must re-encode and decode to the same values
    for encoding in [Encoding::Raw, Encoding::Der, Encoding::Strings] {
        let reencoded = signature.encode(encoding, order_len).unwrap();
        assert_eq!(Signature::decode(&reencoded, order_len).unwrap(), signature);
    }

    // DER is canonical
    if let Encoded::Der(bytes) = &encoded {
        assert_eq!(&signature.to_der(), bytes);
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
