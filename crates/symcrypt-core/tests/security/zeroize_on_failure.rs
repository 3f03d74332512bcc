//! Failed operations must leave no plaintext, ciphertext or key bytes in
//! the buffers they used.
//!
//! The negotiator zeroes the whole allocation (spare capacity included)
//! before emptying a failed buffer, so the backing memory can be inspected
//! without touching freed memory.

use symcrypt_core::negotiate::negotiate_into;
use symcrypt_core::{
    encrypt, wrap, Algorithm, CipherProvider, CryptoError, Cryptor, KeyWrapProvider, Operation,
    Options, Software, StatusCode, WrapAlgorithm, RFC3394_IV,
};

/// Every byte of `buffer`'s allocation.
///
/// Only valid after the buffer was zeroized, which initialises all of its
/// capacity.
fn allocation(buffer: &Vec<u8>) -> &[u8] {
    // SAFETY: `Vec::zeroize` wrote every byte of capacity and the vector is
    // not mutated while the slice lives.
    unsafe { std::slice::from_raw_parts(buffer.as_ptr(), buffer.capacity()) }
}

#[test]
fn bad_padding_leaves_no_partial_plaintext() {
    let key = [0x4Bu8; 16];
    // Three blocks of plaintext with no padding; decrypting them with
    // padding writes two blocks before the last one fails to unpad.
    let ciphertext = encrypt(&Software, Algorithm::Aes, Options::empty(), &key, None, &[0x11u8; 48])
        .expect("encryption should succeed");

    let mut buffer = Vec::new();
    let err = negotiate_into(&mut buffer, ciphertext.len() + 16, |out| {
        Software.one_shot_crypt(
            Operation::Decrypt,
            Algorithm::Aes,
            Options::PKCS7_PADDING,
            &key,
            None,
            &ciphertext,
            out,
        )
    })
    .expect_err("bad padding must fail");

    assert_eq!(err.status(), Some(StatusCode::DecodeError));
    assert!(buffer.is_empty());
    assert!(buffer.capacity() >= 64);
    assert!(allocation(&buffer).iter().all(|&b| b == 0));
}

#[test]
fn failed_unwrap_leaves_no_key_material() {
    let kek = [0x01u8; 32];
    let wrapped = wrap(&Software, WrapAlgorithm::Aes, None, &kek, &[0xC7u8; 32])
        .expect("wrap should succeed");

    let mut buffer = Vec::new();
    let err = negotiate_into(&mut buffer, 32, |out| {
        Software.unwrap_key(WrapAlgorithm::Aes, &RFC3394_IV, &[0x02u8; 32], &wrapped, out)
    })
    .expect_err("wrong KEK must fail");

    assert_eq!(err.status(), Some(StatusCode::DecodeError));
    assert!(buffer.is_empty());
    assert!(allocation(&buffer).iter().all(|&b| b == 0));
}

#[test]
fn failed_hosted_creation_wipes_caller_memory() {
    let mut memory = Vec::with_capacity(512);
    memory.extend_from_slice(&[0xDDu8; 300]);

    let result = Cryptor::with_memory(
        &Software,
        Operation::Encrypt,
        Algorithm::Aes,
        Options::PKCS7_PADDING,
        &[0x99u8; 20],
        None,
        &mut memory,
    );
    assert!(matches!(
        result,
        Err(CryptoError::ContextCreation(StatusCode::ParameterError))
    ));
    drop(result);

    assert!(memory.is_empty());
    assert!(allocation(&memory).iter().all(|&b| b == 0));
}

#[test]
fn hosted_memory_is_released_after_drop() {
    let mut memory = Vec::new();
    {
        let mut cryptor = Cryptor::with_memory(
            &Software,
            Operation::Encrypt,
            Algorithm::Rc2,
            Options::PKCS7_PADDING,
            &[0xABu8; 128],
            None,
            &mut memory,
        )
        .expect("hosted creation should succeed");
        cryptor.process(b"payload").expect("process should succeed");
    }
    assert!(memory.is_empty());
    assert_eq!(memory.capacity(), 0);
}

#[test]
fn failed_operations_return_no_output() {
    let result = encrypt(&Software, Algorithm::Des, Options::empty(), &[1u8; 8], None, &[0u8; 9]);
    assert_eq!(result, Err(CryptoError::Status(StatusCode::AlignmentError)));

    let result = wrap(&Software, WrapAlgorithm::Aes, None, &[1u8; 16], &[2u8; 12]);
    assert_eq!(result, Err(CryptoError::Status(StatusCode::ParameterError)));
}
