//! Cryptographically secure random bytes.

use tracing::warn;
use zeroize::Zeroize;

use crate::algorithm::Algorithm;
use crate::error::{CryptoError, StatusCode};
use crate::provider::RandomProvider;

/// Return exactly `len` random bytes from `provider`.
///
/// `len == 0` succeeds with an empty vector.
///
/// # Errors
///
/// Any provider failure is reported as
/// [`StatusCode::RandomGeneratorFailure`]; no partial bytes are returned.
pub fn random_bytes<P: RandomProvider>(provider: &P, len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut bytes = vec![0u8; len];
    let status = StatusCode::classify(provider.secure_random_bytes(&mut bytes));
    if status == StatusCode::Success {
        return Ok(bytes);
    }

    warn!(?status, len, "secure random generation failed");
    bytes.zeroize();
    Err(CryptoError::Status(StatusCode::RandomGeneratorFailure))
}

impl Algorithm {
    /// A random IV of one block, or `None` for stream ciphers.
    ///
    /// # Errors
    ///
    /// Propagates [`random_bytes`] failures.
    pub fn random_iv<P: RandomProvider>(self, provider: &P) -> Result<Option<Vec<u8>>, CryptoError> {
        if self.is_stream() {
            return Ok(None);
        }
        random_bytes(provider, self.block_size()).map(Some)
    }
}
