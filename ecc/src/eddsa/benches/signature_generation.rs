use commonware_ecc::{curve, Encoding, SigningKey};
use criterion::{criterion_group, BatchSize, Criterion};
use rand::{thread_rng, Rng};
use std::hint::black_box;

fn benchmark_signature_generation(c: &mut Criterion) {
    let mut msg = [0u8; 32];
    thread_rng().fill(&mut msg);
    for curve in [curve::ed25519(), curve::ed448()] {
        c.bench_function(
            &format!("{}/curve={} msg_len={}", module_path!(), curve, msg.len()),
            |b| {
                b.iter_batched(
                    || SigningKey::generate(&curve, &mut thread_rng()).unwrap(),
                    |signer| {
                        black_box(signer.sign_deterministic(&msg, Encoding::Raw, &[]).unwrap());
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
    targets = benchmark_signature_generation
}
