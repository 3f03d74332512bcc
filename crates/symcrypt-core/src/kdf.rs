//! Password-based key derivation with timing calibration.
//!
//! This module provides:
//! - [`derive`]: PBKDF2 over a chosen PRF, fixed-size output, no negotiation
//! - [`calibrate`]: round count that takes roughly a target duration here
//! - [`derive_for_duration`]: calibrate, then derive
//! - [`DerivationParams`]: serializable parameter set to store next to the salt
//!
//! Zero rounds and zero-length output are unrepresentable (`NonZeroU32`,
//! `NonZeroUsize`), so the provider is never called with them.

use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroize;

use crate::algorithm::{Pbkdf, Prf};
use crate::error::{CryptoError, StatusCode};
use crate::memory::SecretBuffer;
use crate::provider::KdfProvider;

const NANOS_PER_MILLI: u128 = 1_000_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// PBKDF parameter set. Store it alongside the salt to re-derive later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationParams {
    /// Key derivation function.
    pub algorithm: Pbkdf,
    /// Pseudorandom function iterated by the KDF.
    pub prf: Prf,
    /// Iteration count.
    pub rounds: NonZeroU32,
    /// Derived key length in bytes.
    pub key_len: NonZeroUsize,
}

impl DerivationParams {
    /// PBKDF2 with `prf`, `rounds` and the PRF's default key length.
    #[must_use]
    pub fn new(prf: Prf, rounds: NonZeroU32) -> Self {
        Self {
            algorithm: Pbkdf::Pbkdf2,
            prf,
            rounds,
            key_len: default_key_len(prf),
        }
    }

    /// Same parameters with an explicit key length.
    #[must_use]
    pub const fn with_key_len(mut self, key_len: NonZeroUsize) -> Self {
        self.key_len = key_len;
        self
    }

    /// PBKDF2 parameters calibrated to `target` on this machine.
    #[must_use]
    pub fn calibrated<P: KdfProvider>(
        provider: &P,
        prf: Prf,
        password: &[u8],
        salt: Option<&[u8]>,
        target: Duration,
    ) -> Self {
        let rounds = calibrate(provider, Pbkdf::Pbkdf2, password, salt, prf, target, None);
        Self::new(prf, rounds)
    }

    /// Derive a key with these parameters.
    ///
    /// # Errors
    ///
    /// See [`derive`].
    pub fn derive<P: KdfProvider>(
        &self,
        provider: &P,
        password: &[u8],
        salt: Option<&[u8]>,
    ) -> Result<SecretBuffer, CryptoError> {
        derive(
            provider,
            self.algorithm,
            password,
            salt,
            self.prf,
            self.rounds,
            Some(self.key_len),
        )
    }
}

fn default_key_len(prf: Prf) -> NonZeroUsize {
    NonZeroUsize::new(prf.default_key_len()).unwrap_or(NonZeroUsize::MIN)
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive a key from `password` and optional `salt`.
///
/// `key_len` defaults to the PRF's digest length (see
/// [`Prf::default_key_len`]). The result lives in a [`SecretBuffer`]; the
/// scratch buffer is zeroized on every path.
///
/// # Errors
///
/// Returns the provider's status; no key material survives a failure.
pub fn derive<P: KdfProvider>(
    provider: &P,
    algorithm: Pbkdf,
    password: &[u8],
    salt: Option<&[u8]>,
    prf: Prf,
    rounds: NonZeroU32,
    key_len: Option<NonZeroUsize>,
) -> Result<SecretBuffer, CryptoError> {
    let key_len = key_len.unwrap_or_else(|| default_key_len(prf));
    let mut output = vec![0u8; key_len.get()];

    let status = StatusCode::classify(provider.derive_key(
        algorithm,
        password,
        salt,
        prf,
        rounds.get(),
        &mut output,
    ));
    if let Err(err) = status.check() {
        output.zeroize();
        return Err(err);
    }
    Ok(SecretBuffer::from_vec(output))
}

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

/// Rounds that take roughly `target` for these inputs on this machine.
///
/// Purely advisory. Only the lengths of `password` and `salt` reach the
/// provider. Sub-millisecond targets round up to one millisecond, and the
/// result is never zero.
#[must_use]
pub fn calibrate<P: KdfProvider>(
    provider: &P,
    algorithm: Pbkdf,
    password: &[u8],
    salt: Option<&[u8]>,
    prf: Prf,
    target: Duration,
    key_len: Option<NonZeroUsize>,
) -> NonZeroU32 {
    let key_len = key_len.unwrap_or_else(|| default_key_len(prf));
    let millis = target_millis(target);
    let rounds = provider.calibrate_rounds(
        algorithm,
        password.len(),
        salt.map_or(0, <[u8]>::len),
        prf,
        key_len.get(),
        millis,
    );
    let rounds = NonZeroU32::new(rounds).unwrap_or(NonZeroU32::MIN);
    debug!(?algorithm, ?prf, target_ms = millis, rounds = rounds.get(), "pbkdf calibrated");
    rounds
}

/// Calibrate for `target`, then derive with the resulting round count.
///
/// Returns the key together with the parameters needed to derive it again.
///
/// # Errors
///
/// See [`derive`].
pub fn derive_for_duration<P: KdfProvider>(
    provider: &P,
    algorithm: Pbkdf,
    password: &[u8],
    salt: Option<&[u8]>,
    prf: Prf,
    target: Duration,
    key_len: Option<NonZeroUsize>,
) -> Result<(SecretBuffer, DerivationParams), CryptoError> {
    let rounds = calibrate(provider, algorithm, password, salt, prf, target, key_len);
    let params = DerivationParams {
        algorithm,
        prf,
        rounds,
        key_len: key_len.unwrap_or_else(|| default_key_len(prf)),
    };
    let key = params.derive(provider, password, salt)?;
    Ok((key, params))
}

fn target_millis(target: Duration) -> u32 {
    let millis = target.as_nanos().div_ceil(NANOS_PER_MILLI);
    u32::try_from(millis).unwrap_or(u32::MAX).max(1)
}
