//! One-shot symmetric encryption and decryption.
//!
//! Output is sized at `input.len() + block_size` up front, which covers any
//! padding; a provider that needs more gets one retry at its reported size.
//! Results are bit-identical to streaming the same input through a
//! [`crate::Cryptor`] in any chunking.

use tracing::debug;

use crate::algorithm::{Algorithm, Operation, Options};
use crate::error::CryptoError;
use crate::negotiate::negotiate;
use crate::provider::CipherProvider;

/// Create a context, process all of `input` and finalize in one call.
///
/// # Errors
///
/// Returns the provider's status: `ParameterError` for bad key or IV
/// lengths, `AlignmentError` for unaligned input without padding,
/// `DecodeError` for bad padding on decrypt. No partial output survives.
pub fn crypt<P: CipherProvider>(
    provider: &P,
    operation: Operation,
    algorithm: Algorithm,
    options: Options,
    key: &[u8],
    iv: Option<&[u8]>,
    input: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let capacity = input.len().saturating_add(algorithm.block_size());
    let result = negotiate(capacity, |output| {
        provider.one_shot_crypt(operation, algorithm, options, key, iv, input, output)
    });
    if let Err(err) = &result {
        debug!(?operation, ?algorithm, %err, "one-shot crypt failed");
    }
    result
}

/// Encrypt `plaintext` in one call. See [`crypt`].
///
/// # Errors
///
/// See [`crypt`].
pub fn encrypt<P: CipherProvider>(
    provider: &P,
    algorithm: Algorithm,
    options: Options,
    key: &[u8],
    iv: Option<&[u8]>,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    crypt(provider, Operation::Encrypt, algorithm, options, key, iv, plaintext)
}

/// Decrypt `ciphertext` in one call. See [`crypt`].
///
/// # Errors
///
/// See [`crypt`].
pub fn decrypt<P: CipherProvider>(
    provider: &P,
    algorithm: Algorithm,
    options: Options,
    key: &[u8],
    iv: Option<&[u8]>,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    crypt(provider, Operation::Decrypt, algorithm, options, key, iv, ciphertext)
}
