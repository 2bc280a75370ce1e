#![no_main]

use arbitrary::Arbitrary;
use commonware_ecc::{curve, Encoded, Encoding, SigningKey, VerifyingKey};
use libfuzzer_sys::fuzz_target;
use rand::{rngs::StdRng, SeedableRng};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    seed: u64,
    curve: bool,
    message: Vec<u8>,
    tamper: Option<(usize, u8)>,
}

fn fuzz(input: FuzzInput) {
    let curve = if input.curve {
        curve::secp256k1()
    } else {
        curve::ed25519()
    };
    let mut rng = StdRng::seed_from_u64(input.seed);
    let signer = SigningKey::generate(&curve, &mut rng).unwrap();
    let signature = signer
        .sign_deterministic(&input.message, Encoding::Raw, &[])
        .unwrap();
    let verifier = signer.verifying_key();
    verifier.verify(&signature, &input.message).unwrap();

    // Recovered candidates always include the signer
    if !curve.is_edwards() {
        let candidates = VerifyingKey::from_public_key_recovery(
            &signature,
            &input.message,
            &curve,
            signer.hash(),
        )
        .unwrap();
        assert!(candidates.contains(verifier));
    }

    // Tampered signatures never verify
    let Some((index, mask)) = input.tamper else {
        return;
    };
    let Encoded::Raw(mut bytes) = signature else {
        unreachable!();
    };
    if mask == 0 || bytes.is_empty() {
        return;
    }
    let index = index % bytes.len();
    bytes[index] ^= mask;
    assert!(verifier.verify(&Encoded::Raw(bytes), &input.message).is_err());
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
