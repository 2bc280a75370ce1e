use commonware_ecc::{curve, Encoding, SigningKey};
use criterion::{criterion_group, BatchSize, Criterion};
use rand::{thread_rng, Rng};
use std::hint::black_box;

fn benchmark_signature_verification(c: &mut Criterion) {
    let mut msg = [0u8; 32];
    thread_rng().fill(&mut msg);
    let curve = curve::nist_p256();
    for precompute in [false, true] {
        c.bench_function(
            &format!(
                "{}/curve={} precompute={} msg_len={}",
                module_path!(),
                curve,
                precompute,
                msg.len()
            ),
            |b| {
                b.iter_batched(
                    || {
                        let signer = SigningKey::generate(&curve, &mut thread_rng()).unwrap();
                        let signature = signer
                            .sign_deterministic(&msg, Encoding::Der, &[])
                            .unwrap();
                        let verifier = signer.verifying_key().clone();
                        if precompute {
                            verifier.precompute(false);
                        }
                        (verifier, signature)
                    },
                    |(verifier, signature)| {
                        black_box(verifier.verify(&signature, &msg).is_ok());
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark_signature_verification
}
