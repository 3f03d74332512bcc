//! RFC 3394 section 4 AES key wrap test vectors.

use symcrypt_core::{unwrap, wrap, Software, WrapAlgorithm};

fn h(s: &str) -> Vec<u8> {
    hex::decode(s).expect("test vector hex should be valid")
}

fn check(kek: &str, key: &str, wrapped: &str) {
    let out = wrap(&Software, WrapAlgorithm::Aes, None, &h(kek), &h(key))
        .expect("wrap should succeed");
    assert_eq!(hex::encode_upper(&out), wrapped);

    let raw = unwrap(&Software, WrapAlgorithm::Aes, None, &h(kek), &out)
        .expect("unwrap should succeed");
    assert_eq!(hex::encode_upper(raw.expose()), key);
}

/// 4.1 Wrap 128 bits of key data with a 128-bit KEK.
#[test]
fn wrap_128_with_128() {
    check(
        "000102030405060708090A0B0C0D0E0F",
        "00112233445566778899AABBCCDDEEFF",
        "1FA68B0A8112B447AEF34BD8FB5A7B829D3E862371D2CFE5",
    );
}

/// 4.2 Wrap 128 bits of key data with a 192-bit KEK.
#[test]
fn wrap_128_with_192() {
    check(
        "000102030405060708090A0B0C0D0E0F1011121314151617",
        "00112233445566778899AABBCCDDEEFF",
        "96778B25AE6CA435F92B5B97C050AED2468AB8A17AD84E5D",
    );
}

/// 4.3 Wrap 128 bits of key data with a 256-bit KEK.
#[test]
fn wrap_128_with_256() {
    check(
        "000102030405060708090A0B0C0D0E0F101112131415161718191A1B1C1D1E1F",
        "00112233445566778899AABBCCDDEEFF",
        "64E8C3F9CE0F5BA263E9777905818A2A93C8191E7D6E8AE7",
    );
}

/// 4.6 Wrap 256 bits of key data with a 256-bit KEK.
#[test]
fn wrap_256_with_256() {
    check(
        "000102030405060708090A0B0C0D0E0F101112131415161718191A1B1C1D1E1F",
        "00112233445566778899AABBCCDDEEFF000102030405060708090A0B0C0D0E0F",
        "28C9F404C4B810F4CBCCB35CFB87F8263F5786E2D80ED326CBC7F0E71A99F43BFB988B9B7A02DD21",
    );
}
