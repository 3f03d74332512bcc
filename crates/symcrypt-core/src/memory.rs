//! Secret output container.
//!
//! Derived keys and unwrapped keys are handed back as [`SecretBuffer`]:
//! - zeroed on drop (via `secrecy`'s built-in `Zeroize`)
//! - masked in `Debug`/`Display`
//! - exact-size allocation, so no stale copy is left behind by a realloc

use std::fmt;

use secrecy::{ExposeSecret, SecretSlice};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::provider::RandomProvider;
use crate::random;

/// Variable-length buffer for sensitive bytes.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
}

impl SecretBuffer {
    /// Copy `data` into a new exact-size secret allocation.
    ///
    /// The caller should zeroize the source afterwards.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            inner: data.to_vec().into(),
        }
    }

    /// Move `data` into a secret buffer, zeroing the original allocation.
    #[must_use]
    pub fn from_vec(mut data: Vec<u8>) -> Self {
        let result = Self::new(&data);
        data.zeroize();
        result
    }

    /// Fill a new buffer with `len` bytes from `provider`'s CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns a `RandomGeneratorFailure` status error if generation fails.
    pub fn random<P: RandomProvider>(provider: &P, len: usize) -> Result<Self, CryptoError> {
        random::random_bytes(provider, len).map(Self::from_vec)
    }

    /// Expose the underlying bytes. Keep the borrow short.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Number of bytes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    /// Returns `true` if the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}
