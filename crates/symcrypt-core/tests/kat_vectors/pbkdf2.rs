//! PBKDF2 known-answer vectors.
//!
//! HMAC-SHA-1 cases are RFC 6070. HMAC-SHA-256 cases are the widely
//! published companion set for the same inputs.

use std::num::{NonZeroU32, NonZeroUsize};

use symcrypt_core::{derive, Pbkdf, Prf, Software};

fn check(prf: Prf, password: &[u8], salt: &[u8], rounds: u32, expected: &str) {
    let key = derive(
        &Software,
        Pbkdf::Pbkdf2,
        password,
        Some(salt),
        prf,
        NonZeroU32::new(rounds).unwrap(),
        NonZeroUsize::new(expected.len() / 2),
    )
    .expect("derivation should succeed");
    assert_eq!(hex::encode(key.expose()), expected, "{prf:?} c={rounds}");
}

#[test]
fn rfc6070_sha1_c1() {
    check(Prf::HmacSha1, b"password", b"salt", 1, "0c60c80f961f0e71f3a9b524af6012062fe037a6");
}

#[test]
fn rfc6070_sha1_c2() {
    check(Prf::HmacSha1, b"password", b"salt", 2, "ea6c014dc72d6f8ccd1ed92ace1d41f0d8de8957");
}

#[test]
fn rfc6070_sha1_c4096() {
    check(Prf::HmacSha1, b"password", b"salt", 4096, "4b007901b765489abead49d926f721d065a429c1");
}

#[test]
fn rfc6070_sha1_long_inputs() {
    check(
        Prf::HmacSha1,
        b"passwordPASSWORDpassword",
        b"saltSALTsaltSALTsaltSALTsaltSALTsalt",
        4096,
        "3d2eec4fe41c849b80c8d83662c0e44a8b291a964cf2f07038",
    );
}

#[test]
fn rfc6070_sha1_embedded_nul() {
    check(Prf::HmacSha1, b"pass\0word", b"sa\0lt", 4096, "56fa6aa75548099dcc37d7f03425e0c3");
}

#[test]
fn sha256_c1() {
    check(
        Prf::HmacSha256,
        b"password",
        b"salt",
        1,
        "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b",
    );
}

#[test]
fn sha256_c2() {
    check(
        Prf::HmacSha256,
        b"password",
        b"salt",
        2,
        "ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43",
    );
}

/// An absent salt is the empty salt.
#[test]
fn missing_salt_equals_empty_salt() {
    let one = NonZeroU32::new(1).unwrap();
    let absent = derive(&Software, Pbkdf::Pbkdf2, b"pw", None, Prf::HmacSha256, one, None)
        .expect("derivation should succeed");
    let empty = derive(&Software, Pbkdf::Pbkdf2, b"pw", Some(b"".as_slice()), Prf::HmacSha256, one, None)
        .expect("derivation should succeed");
    assert_eq!(absent.expose(), empty.expose());
}
