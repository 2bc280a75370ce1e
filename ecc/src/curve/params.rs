//! Parameters of the named curves.

use super::{Curve, EdwardsParameters, ExplicitParameters};
use crate::hash::EdwardsHash;
use num_bigint::BigUint;
use num_traits::One;

fn hex(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 16).expect("valid hex constant")
}

fn dec(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 10).expect("valid decimal constant")
}

fn weierstrass(name: &str, oid: &[u64], params: ExplicitParameters) -> Curve {
    Curve::weierstrass(name, params)
        .expect("valid curve parameters")
        .with_oid(oid)
}

fn edwards(name: &str, oid: &[u64], params: EdwardsParameters) -> Curve {
    Curve::edwards(name, params)
        .expect("valid curve parameters")
        .with_oid(oid)
}

/// NIST P-curves use `a = -3`.
fn minus_three(p: &BigUint) -> BigUint {
    p - 3u32
}

pub(super) fn nist_p192() -> Curve {
    let p = hex("fffffffffffffffffffffffffffffffeffffffffffffffff");
    weierstrass(
        "NIST192p",
        &[1, 2, 840, 10045, 3, 1, 1],
        ExplicitParameters {
            a: minus_three(&p),
            b: hex("64210519e59c80e70fa7e9ab72243049feb8deecc146b9b1"),
            gx: hex("188da80eb03090f67cbf20eb43a18800f4ff0afd82ff1012"),
            gy: hex("07192b95ffc8da78631011ed6b24cdd573f977a11e794811"),
            order: hex("ffffffffffffffffffffffff99def836146bc9b1b4d22831"),
            cofactor: BigUint::one(),
            p,
        },
    )
}

pub(super) fn nist_p224() -> Curve {
    let p = hex("ffffffffffffffffffffffffffffffff000000000000000000000001");
    weierstrass(
        "NIST224p",
        &[1, 3, 132, 0, 33],
        ExplicitParameters {
            a: minus_three(&p),
            b: hex("b4050a850c04b3abf54132565044b0b7d7bfd8ba270b39432355ffb4"),
            gx: hex("b70e0cbd6bb4bf7f321390b94a03c1d356c21122343280d6115c1d21"),
            gy: hex("bd376388b5f723fb4c22dfe6cd4375a05a07476444d5819985007e34"),
            order: hex("ffffffffffffffffffffffffffff16a2e0b8f03e13dd29455c5c2a3d"),
            cofactor: BigUint::one(),
            p,
        },
    )
}

pub(super) fn nist_p256() -> Curve {
    let p = hex("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff");
    weierstrass(
        "NIST256p",
        &[1, 2, 840, 10045, 3, 1, 7],
        ExplicitParameters {
            a: minus_three(&p),
            b: hex("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b"),
            gx: hex("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"),
            gy: hex("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5"),
            order: hex("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551"),
            cofactor: BigUint::one(),
            p,
        },
    )
}

pub(super) fn nist_p384() -> Curve {
    let p = hex(concat!(
        "ffffffffffffffffffffffffffffffffffffffffffffffff",
        "fffffffffffffffeffffffff0000000000000000ffffffff"
    ));
    weierstrass(
        "NIST384p",
        &[1, 3, 132, 0, 34],
        ExplicitParameters {
            a: minus_three(&p),
            b: hex(concat!(
                "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe814112",
                "0314088f5013875ac656398d8a2ed19d2a85c8edd3ec2aef"
            )),
            gx: hex(concat!(
                "aa87ca22be8b05378eb1c71ef320ad746e1d3b628ba79b98",
                "59f741e082542a385502f25dbf55296c3a545e3872760ab7"
            )),
            gy: hex(concat!(
                "3617de4a96262c6f5d9e98bf9292dc29f8f41dbd289a147c",
                "e9da3113b5f0b8c00a60b1ce1d7e819d7a431d7c90ea0e5f"
            )),
            order: hex(concat!(
                "ffffffffffffffffffffffffffffffffffffffffffffffff",
                "c7634d81f4372ddf581a0db248b0a77aecec196accc52973"
            )),
            cofactor: BigUint::one(),
            p,
        },
    )
}

pub(super) fn nist_p521() -> Curve {
    let p = (BigUint::one() << 521u32) - 1u32;
    weierstrass(
        "NIST521p",
        &[1, 3, 132, 0, 35],
        ExplicitParameters {
            a: minus_three(&p),
            b: hex(concat!(
                "0051953eb9618e1c9a1f929a21a0b68540eea2da725b99b315f3b8b489918ef1",
                "09e156193951ec7e937b1652c0bd3bb1bf073573df883d2c34f1ef451fd46b503f00"
            )),
            gx: hex(concat!(
                "00c6858e06b70404e9cd9e3ecb662395b4429c648139053fb521f828af606b4d",
                "3dbaa14b5e77efe75928fe1dc127a2ffa8de3348b3c1856a429bf97e7e31c2e5bd66"
            )),
            gy: hex(concat!(
                "011839296a789a3bc0045c8a5fb42c7d1bd998f54449579b446817afbd17273e",
                "662c97ee72995ef42640c550b9013fad0761353c7086a272c24088be94769fd16650"
            )),
            order: hex(concat!(
                "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
                "fffa51868783bf2f966b7fcc0148f709a5d03bb5c9b8899c47aebb6fb71e91386409"
            )),
            cofactor: BigUint::one(),
            p,
        },
    )
}

pub(super) fn secp256k1() -> Curve {
    weierstrass(
        "SECP256k1",
        &[1, 3, 132, 0, 10],
        ExplicitParameters {
            p: hex("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f"),
            a: BigUint::from(0u32),
            b: BigUint::from(7u32),
            gx: hex("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"),
            gy: hex("483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"),
            order: hex("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"),
            cofactor: BigUint::one(),
        },
    )
}

pub(super) fn brainpool_p160r1() -> Curve {
    weierstrass(
        "BRAINPOOLP160r1",
        &[1, 3, 36, 3, 3, 2, 8, 1, 1, 1],
        ExplicitParameters {
            p: hex("e95e4a5f737059dc60dfc7ad95b3d8139515620f"),
            a: hex("340e7be2a280eb74e2be61bada745d97e8f7c300"),
            b: hex("1e589a8595423412134faa2dbdec95c8d8675e58"),
            gx: hex("bed5af16ea3f6a4f62938c4631eb5af7bdbcdbc3"),
            gy: hex("1667cb477a1a8ec338f94741669c976316da6321"),
            order: hex("e95e4a5f737059dc60df5991d45029409e60fc09"),
            cofactor: BigUint::one(),
        },
    )
}

pub(super) fn brainpool_p256r1() -> Curve {
    weierstrass(
        "BRAINPOOLP256r1",
        &[1, 3, 36, 3, 3, 2, 8, 1, 1, 7],
        ExplicitParameters {
            p: hex("a9fb57dba1eea9bc3e660a909d838d726e3bf623d52620282013481d1f6e5377"),
            a: hex("7d5a0975fc2c3057eef67530417affe7fb8055c126dc5c6ce94a4b44f330b5d9"),
            b: hex("26dc5c6ce94a4b44f330b5d9bbd77cbf958416295cf7e1ce6bccdc18ff8c07b6"),
            gx: hex("8bd2aeb9cb7e57cb2c4b482ffc81b7afb9de27e1e3bd23c23a4453bd9ace3262"),
            gy: hex("547ef835c3dac4fd97f8461a14611dc9c27745132ded8e545c1d54c72f046997"),
            order: hex("a9fb57dba1eea9bc3e660a909d838d718c397aa3b561a6f7901e0e82974856a7"),
            cofactor: BigUint::one(),
        },
    )
}

pub(super) fn ed25519() -> Curve {
    let p = (BigUint::one() << 255u32) - 19u32;
    edwards(
        "Ed25519",
        &[1, 3, 101, 112],
        EdwardsParameters {
            a: &p - 1u32,
            d: dec("37095705934669439343138083508754565189542113879843219016388785533085940283555"),
            gx: dec("15112221349535400772501151409588531511454012693041857206046113283949847762202"),
            gy: dec("46316835694926478169428394003475163141307993866256225615783033603165251855960"),
            order: (BigUint::one() << 252u32) + dec("27742317777372353535851937790883648493"),
            cofactor: BigUint::from(8u32),
            hash: EdwardsHash::Sha512,
            p,
        },
    )
}

pub(super) fn ed448() -> Curve {
    let p = (BigUint::one() << 448u32) - (BigUint::one() << 224u32) - 1u32;
    edwards(
        "Ed448",
        &[1, 3, 101, 113],
        EdwardsParameters {
            a: BigUint::one(),
            d: &p - 39081u32,
            gx: dec(concat!(
                "22458004029592430018760433409989603624678964163256413424612546168695",
                "0415467406032909029192869357953282578032075146446173674602635247710"
            )),
            gy: dec(concat!(
                "29881921007848149267601793044393067343754404015408024209592824137233",
                "1506189835876003536878655418784733982303233503462500531545062832660"
            )),
            order: (BigUint::one() << 446u32)
                - dec("13818066809895115352007386748515426880336692474882178609894547503885"),
            cofactor: BigUint::from(4u32),
            hash: EdwardsHash::Shake256,
            p,
        },
    )
}

/// Curve over GF(163) with a generator of prime order 167.
///
/// Small enough that nonces hitting `r = 0` and `s = 0` are easy to find.
#[cfg(test)]
pub(crate) fn toy() -> Curve {
    Curve::weierstrass(
        "toy",
        ExplicitParameters {
            p: BigUint::from(163u32),
            a: BigUint::from(84u32),
            b: BigUint::from(58u32),
            gx: BigUint::from(2u32),
            gy: BigUint::from(87u32),
            order: BigUint::from(167u32),
            cofactor: BigUint::one(),
        },
    )
    .expect("valid curve parameters")
}
