//! Capability traits for the native primitive provider.
//!
//! The crate never implements a cipher, digest or PBKDF itself. It drives a
//! provider through these traits and owns everything around the calls:
//! buffer sizing, the single `BufferTooSmall` retry, status mapping and
//! zeroing. [`crate::software::Software`] is the bundled implementation.
//!
//! Status-returning methods use the raw numbering in [`raw`]. Methods that
//! write output return a [`NativeOutput`]; on `BufferTooSmall` its `len`
//! is the capacity the provider needs, and the provider must not have
//! advanced any context state.

use crate::algorithm::{Algorithm, Mode, Operation, Options, Padding, Pbkdf, Prf, WrapAlgorithm};

/// Raw status value as reported by a provider.
pub type RawStatus = i32;

/// Raw status values.
pub mod raw {
    use super::RawStatus;

    /// Operation completed normally.
    pub const SUCCESS: RawStatus = 0;
    /// Illegal parameter value.
    pub const PARAM_ERROR: RawStatus = -4300;
    /// Insufficient buffer provided.
    pub const BUFFER_TOO_SMALL: RawStatus = -4301;
    /// Memory allocation failure.
    pub const MEMORY_FAILURE: RawStatus = -4302;
    /// Input size was not aligned properly.
    pub const ALIGNMENT_ERROR: RawStatus = -4303;
    /// Input did not decode or decrypt properly.
    pub const DECODE_ERROR: RawStatus = -4304;
    /// Not implemented for the current algorithm.
    pub const UNIMPLEMENTED: RawStatus = -4305;
    /// Arithmetic overflow.
    pub const OVERFLOW: RawStatus = -4306;
    /// Random number generator failure.
    pub const RNG_FAILURE: RawStatus = -4307;
    /// Placeholder for statuses with no known meaning.
    pub const UNKNOWN: RawStatus = i32::MAX;
}

/// Result of a provider call that writes into a caller buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeOutput {
    /// Raw status of the call.
    pub status: RawStatus,
    /// Bytes written on success; required capacity on `BufferTooSmall`.
    pub len: usize,
}

impl NativeOutput {
    /// Successful call that wrote `len` bytes.
    #[must_use]
    pub const fn written(len: usize) -> Self {
        Self {
            status: raw::SUCCESS,
            len,
        }
    }

    /// `BufferTooSmall` carrying the capacity the provider needs.
    #[must_use]
    pub const fn too_small(required: usize) -> Self {
        Self {
            status: raw::BUFFER_TOO_SMALL,
            len: required,
        }
    }

    /// Any other failure; nothing was written.
    #[must_use]
    pub const fn failed(status: RawStatus) -> Self {
        Self { status, len: 0 }
    }
}

/// Result of creating a context inside caller-supplied memory.
#[derive(Debug)]
pub struct ContextInMemory<C> {
    /// The context, or the raw failure status.
    pub context: Result<C, RawStatus>,
    /// Bytes of memory used on success; required size on `BufferTooSmall`.
    pub used: usize,
}

/// Stateful and one-shot symmetric cipher capability.
pub trait CipherProvider {
    /// Opaque per-stream cipher state.
    type Context;

    /// Create a context whose memory the provider manages.
    ///
    /// # Errors
    ///
    /// Returns the raw failure status when no context could be created.
    fn create_context(
        &self,
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<Self::Context, RawStatus>;

    /// Create a context hosted in `memory`.
    fn create_context_in_memory(
        &self,
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: Option<&[u8]>,
        memory: &mut [u8],
    ) -> ContextInMemory<Self::Context>;

    /// Create a context for an explicit mode of operation.
    ///
    /// `tweak` is only read by tweakable modes. `rounds` of `0` selects the
    /// algorithm's standard round count. Providers without mode support keep
    /// this default, which reports `Unimplemented`.
    ///
    /// # Errors
    ///
    /// Returns the raw failure status when no context could be created.
    #[allow(clippy::too_many_arguments)]
    fn create_context_with_mode(
        &self,
        _operation: Operation,
        _mode: Mode,
        _algorithm: Algorithm,
        _padding: Padding,
        _key: &[u8],
        _iv: Option<&[u8]>,
        _tweak: &[u8],
        _rounds: u32,
    ) -> Result<Self::Context, RawStatus> {
        Err(raw::UNIMPLEMENTED)
    }

    /// Process one chunk of input.
    fn update_context(
        &self,
        context: &mut Self::Context,
        input: &[u8],
        output: &mut [u8],
    ) -> NativeOutput;

    /// Flush buffered input and apply or strip padding.
    fn finalize_context(&self, context: &mut Self::Context, output: &mut [u8]) -> NativeOutput;

    /// Re-prime the context with a new (or absent) IV, keeping the key.
    fn reset_context(&self, context: &mut Self::Context, iv: Option<&[u8]>) -> RawStatus;

    /// Release everything the context holds. Called exactly once.
    fn release_context(&self, context: &mut Self::Context);

    /// Upper bound on output for `input_len` more bytes.
    fn output_size_estimate(&self, context: &Self::Context, input_len: usize, is_final: bool)
        -> usize;

    /// Create, update and finalize in a single call.
    #[allow(clippy::too_many_arguments)]
    fn one_shot_crypt(
        &self,
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: Option<&[u8]>,
        input: &[u8],
        output: &mut [u8],
    ) -> NativeOutput;
}

/// Password-based key derivation capability.
pub trait KdfProvider {
    /// Fill `output` with a key derived from `password` and `salt`.
    fn derive_key(
        &self,
        algorithm: Pbkdf,
        password: &[u8],
        salt: Option<&[u8]>,
        prf: Prf,
        rounds: u32,
        output: &mut [u8],
    ) -> RawStatus;

    /// Rounds that take roughly `target_millis` on this machine.
    fn calibrate_rounds(
        &self,
        algorithm: Pbkdf,
        password_len: usize,
        salt_len: usize,
        prf: Prf,
        derived_key_len: usize,
        target_millis: u32,
    ) -> u32;
}

/// Symmetric key wrapping capability.
pub trait KeyWrapProvider {
    /// Wrap `raw_key` under `kek`.
    fn wrap_key(
        &self,
        algorithm: WrapAlgorithm,
        iv: &[u8],
        kek: &[u8],
        raw_key: &[u8],
        output: &mut [u8],
    ) -> NativeOutput;

    /// Unwrap `wrapped_key` under `kek`.
    fn unwrap_key(
        &self,
        algorithm: WrapAlgorithm,
        iv: &[u8],
        kek: &[u8],
        wrapped_key: &[u8],
        output: &mut [u8],
    ) -> NativeOutput;

    /// Expected wrapped length for a raw key of `raw_len` bytes.
    fn wrapped_length(&self, algorithm: WrapAlgorithm, raw_len: usize) -> usize;

    /// Expected raw length for a wrapped key of `wrapped_len` bytes.
    fn unwrapped_length(&self, algorithm: WrapAlgorithm, wrapped_len: usize) -> usize;
}

/// Cryptographically secure random byte source.
pub trait RandomProvider {
    /// Fill `output` entirely with random bytes.
    fn secure_random_bytes(&self, output: &mut [u8]) -> RawStatus;
}
