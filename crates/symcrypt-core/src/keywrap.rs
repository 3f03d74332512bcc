//! Symmetric key wrapping (RFC 3394).
//!
//! Output capacity starts at the provider's length formula and still goes
//! through the single-retry negotiation, in case the provider disagrees
//! with its own formula. Unwrapped keys come back as [`SecretBuffer`].

use crate::algorithm::WrapAlgorithm;
use crate::error::CryptoError;
use crate::memory::SecretBuffer;
use crate::negotiate::negotiate;
use crate::provider::KeyWrapProvider;

/// Default IV for AES key wrap (RFC 3394 section 2.2.3.1).
pub const RFC3394_IV: [u8; 8] = [0xA6; 8];

impl WrapAlgorithm {
    /// Wrapped length for a raw key of `raw_len` bytes, per `provider`.
    #[must_use]
    pub fn wrapped_key_len<P: KeyWrapProvider>(self, provider: &P, raw_len: usize) -> usize {
        provider.wrapped_length(self, raw_len)
    }

    /// Raw length for a wrapped key of `wrapped_len` bytes, per `provider`.
    #[must_use]
    pub fn unwrapped_key_len<P: KeyWrapProvider>(self, provider: &P, wrapped_len: usize) -> usize {
        provider.unwrapped_length(self, wrapped_len)
    }
}

/// Wrap `raw_key` under `kek`. `iv` defaults to [`RFC3394_IV`].
///
/// # Errors
///
/// `ParameterError` for illegal KEK or key lengths, `Unimplemented` for an
/// IV the provider does not support, or any other provider status.
pub fn wrap<P: KeyWrapProvider>(
    provider: &P,
    algorithm: WrapAlgorithm,
    iv: Option<&[u8]>,
    kek: &[u8],
    raw_key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let iv = iv.unwrap_or(&RFC3394_IV);
    let capacity = provider.wrapped_length(algorithm, raw_key.len());
    negotiate(capacity, |output| {
        provider.wrap_key(algorithm, iv, kek, raw_key, output)
    })
}

/// Unwrap `wrapped_key` under `kek`. `iv` defaults to [`RFC3394_IV`].
///
/// # Errors
///
/// `DecodeError` when the integrity check fails (wrong KEK or tampered
/// input), plus the same statuses as [`wrap`].
pub fn unwrap<P: KeyWrapProvider>(
    provider: &P,
    algorithm: WrapAlgorithm,
    iv: Option<&[u8]>,
    kek: &[u8],
    wrapped_key: &[u8],
) -> Result<SecretBuffer, CryptoError> {
    let iv = iv.unwrap_or(&RFC3394_IV);
    let capacity = provider.unwrapped_length(algorithm, wrapped_key.len());
    negotiate(capacity, |output| {
        provider.unwrap_key(algorithm, iv, kek, wrapped_key, output)
    })
    .map(SecretBuffer::from_vec)
}
