//! Pure-Rust provider backed by the RustCrypto crates.
//!
//! [`Software`] implements every provider trait:
//! - ciphers: AES, DES, 3DES, CAST-128, RC2, Blowfish and RC4
//! - modes: ECB, CBC, CFB, CFB8, CTR and OFB (XTS, F8 and LRW report
//!   `Unimplemented`)
//! - PBKDF2 over HMAC-SHA-1/224/256/384/512
//! - AES key wrap (RFC 3394)
//! - OS randomness through `rand::rngs::OsRng`
//!
//! Caller-hosted contexts record their parameter block (header, key, IV)
//! in the supplied memory. The memory must hold the algorithm's context
//! size or the parameter block, whichever is larger; a shorter region gets
//! `BufferTooSmall` with the exact requirement.

mod context;

use std::time::{Duration, Instant};

use aes_kw::{KekAes128, KekAes192, KekAes256};
use cipher::generic_array::GenericArray;
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use zeroize::Zeroize;

pub use context::SoftContext;

use crate::algorithm::{Algorithm, Mode, Operation, Options, Padding, Pbkdf, Prf, WrapAlgorithm};
use crate::keywrap::RFC3394_IV;
use crate::provider::{
    raw, CipherProvider, ContextInMemory, KdfProvider, KeyWrapProvider, NativeOutput,
    RandomProvider, RawStatus,
};

/// Bytes of the parameter header written ahead of the key in hosted memory.
const PARAM_HEADER: usize = 8;

/// AES key wrap works in 64-bit semiblocks.
const SEMIBLOCK: usize = 8;

/// Shortest key RFC 3394 wraps: two semiblocks.
const MIN_RAW_KEY: usize = 16;

/// Shortest wrapped key: the integrity semiblock plus two key semiblocks.
const MIN_WRAPPED_KEY: usize = 24;

/// PBKDF2 rounds timed per calibration sample.
const CALIBRATION_SAMPLE_ROUNDS: u32 = 1_000;

/// Samples taken; the fastest wins.
const CALIBRATION_SAMPLES: usize = 3;

/// Software provider. Stateless; copy it freely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Software;

impl Software {
    /// Whether this provider can key `algorithm` with a `len`-byte key.
    ///
    /// Narrower than [`Algorithm::key_sizes`] for RC4, where only lengths
    /// 1 to 32, 64, 128 and 256 are wired to a backend.
    #[must_use]
    pub fn accepts_key(algorithm: Algorithm, len: usize) -> bool {
        context::supported_key_len(algorithm, len)
    }
}

// ---------------------------------------------------------------------------
// Ciphers
// ---------------------------------------------------------------------------

impl CipherProvider for Software {
    type Context = SoftContext;

    fn create_context(
        &self,
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<SoftContext, RawStatus> {
        SoftContext::new(operation, algorithm, options, key, iv)
    }

    fn create_context_with_mode(
        &self,
        operation: Operation,
        mode: Mode,
        algorithm: Algorithm,
        padding: Padding,
        key: &[u8],
        iv: Option<&[u8]>,
        _tweak: &[u8],
        rounds: u32,
    ) -> Result<SoftContext, RawStatus> {
        // Round counts are fixed by the backends.
        if rounds != 0 {
            return Err(raw::UNIMPLEMENTED);
        }
        SoftContext::with_mode(operation, mode, algorithm, padding, key, iv)
    }

    fn create_context_in_memory(
        &self,
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: Option<&[u8]>,
        memory: &mut [u8],
    ) -> ContextInMemory<SoftContext> {
        let context = match SoftContext::new(operation, algorithm, options, key, iv) {
            Ok(context) => context,
            Err(status) => {
                return ContextInMemory {
                    context: Err(status),
                    used: 0,
                }
            }
        };

        let block_size = algorithm.block_size();
        let required = PARAM_HEADER
            .saturating_add(key.len())
            .saturating_add(block_size)
            .max(algorithm.context_size());
        let Some(region) = memory.get_mut(..required) else {
            return ContextInMemory {
                context: Err(raw::BUFFER_TOO_SMALL),
                used: required,
            };
        };
        let Ok(key_len) = u16::try_from(key.len()) else {
            return ContextInMemory {
                context: Err(raw::PARAM_ERROR),
                used: 0,
            };
        };

        region.fill(0);
        let (header, rest) = region.split_at_mut(PARAM_HEADER);
        header[..4].copy_from_slice(&algorithm.info().native_id.to_le_bytes());
        header[4] = operation.native_id().to_le_bytes()[0];
        header[5] = options.bits().to_le_bytes()[0];
        header[6..].copy_from_slice(&key_len.to_le_bytes());
        let (key_area, iv_area) = rest.split_at_mut(key.len());
        key_area.copy_from_slice(key);
        if let Some(iv) = iv.filter(|iv| iv.len() == block_size) {
            iv_area[..block_size].copy_from_slice(iv);
        }

        ContextInMemory {
            context: Ok(context),
            used: required,
        }
    }

    fn update_context(
        &self,
        context: &mut SoftContext,
        input: &[u8],
        output: &mut [u8],
    ) -> NativeOutput {
        context.update(input, output)
    }

    fn finalize_context(&self, context: &mut SoftContext, output: &mut [u8]) -> NativeOutput {
        context.finalize(output)
    }

    fn reset_context(&self, context: &mut SoftContext, iv: Option<&[u8]>) -> RawStatus {
        context.reset(iv)
    }

    fn release_context(&self, context: &mut SoftContext) {
        context.release();
    }

    fn output_size_estimate(&self, context: &SoftContext, input_len: usize, is_final: bool) -> usize {
        context.output_len(input_len, is_final)
    }

    fn one_shot_crypt(
        &self,
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: Option<&[u8]>,
        input: &[u8],
        output: &mut [u8],
    ) -> NativeOutput {
        let mut context = match SoftContext::new(operation, algorithm, options, key, iv) {
            Ok(context) => context,
            Err(status) => return NativeOutput::failed(status),
        };
        let result = one_shot_with(&mut context, input, output);
        context.release();
        result
    }
}

fn one_shot_with(context: &mut SoftContext, input: &[u8], output: &mut [u8]) -> NativeOutput {
    let required = context.output_len(input.len(), true);
    if output.len() < required {
        return NativeOutput::too_small(required);
    }

    let head = context.update(input, output);
    if head.status != raw::SUCCESS {
        return head;
    }
    let tail = context.finalize(&mut output[head.len..]);
    if tail.status != raw::SUCCESS {
        return NativeOutput::failed(tail.status);
    }
    NativeOutput::written(head.len.saturating_add(tail.len))
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

impl KdfProvider for Software {
    fn derive_key(
        &self,
        algorithm: Pbkdf,
        password: &[u8],
        salt: Option<&[u8]>,
        prf: Prf,
        rounds: u32,
        output: &mut [u8],
    ) -> RawStatus {
        if rounds == 0 || output.is_empty() {
            return raw::PARAM_ERROR;
        }
        let salt = salt.unwrap_or_default();
        match algorithm {
            Pbkdf::Pbkdf2 => match prf {
                Prf::HmacSha1 => pbkdf2::pbkdf2_hmac::<Sha1>(password, salt, rounds, output),
                Prf::HmacSha224 => pbkdf2::pbkdf2_hmac::<Sha224>(password, salt, rounds, output),
                Prf::HmacSha256 => pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, output),
                Prf::HmacSha384 => pbkdf2::pbkdf2_hmac::<Sha384>(password, salt, rounds, output),
                Prf::HmacSha512 => pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, rounds, output),
            },
        }
        raw::SUCCESS
    }

    fn calibrate_rounds(
        &self,
        algorithm: Pbkdf,
        password_len: usize,
        salt_len: usize,
        prf: Prf,
        derived_key_len: usize,
        target_millis: u32,
    ) -> u32 {
        let password = vec![0x61u8; password_len];
        let salt = vec![0u8; salt_len];
        let mut output = vec![0u8; derived_key_len.max(1)];

        let mut fastest = Duration::MAX;
        for _ in 0..CALIBRATION_SAMPLES {
            let started = Instant::now();
            self.derive_key(
                algorithm,
                &password,
                Some(&salt),
                prf,
                CALIBRATION_SAMPLE_ROUNDS,
                &mut output,
            );
            fastest = fastest.min(started.elapsed());
        }
        output.zeroize();

        let sample_nanos = fastest.as_nanos().max(1);
        let target_nanos = u128::from(target_millis).saturating_mul(1_000_000);
        let rounds = u128::from(CALIBRATION_SAMPLE_ROUNDS)
            .saturating_mul(target_nanos)
            .checked_div(sample_nanos)
            .unwrap_or(1);
        u32::try_from(rounds).unwrap_or(u32::MAX).max(1)
    }
}

// ---------------------------------------------------------------------------
// Key wrapping
// ---------------------------------------------------------------------------

/// Validate the IV shared by wrap and unwrap.
fn check_wrap_iv(iv: &[u8]) -> Result<(), RawStatus> {
    if iv.len() != RFC3394_IV.len() {
        return Err(raw::PARAM_ERROR);
    }
    if iv != RFC3394_IV {
        return Err(raw::UNIMPLEMENTED);
    }
    Ok(())
}

fn kw_status(err: aes_kw::Error) -> NativeOutput {
    match err {
        aes_kw::Error::IntegrityCheckFailed => NativeOutput::failed(raw::DECODE_ERROR),
        aes_kw::Error::InvalidOutputSize { expected } => NativeOutput::too_small(expected),
        _ => NativeOutput::failed(raw::PARAM_ERROR),
    }
}

fn whole_semiblocks(data: &[u8], min: usize) -> bool {
    data.len() >= min && data.len().checked_rem(SEMIBLOCK) == Some(0)
}

#[derive(Clone, Copy)]
enum Direction {
    Wrap,
    Unwrap,
}

fn run_kw(direction: Direction, kek: &[u8], input: &[u8], out: &mut [u8]) -> NativeOutput {
    macro_rules! with_kek {
        ($kek:ty) => {{
            let kek = <$kek>::new(GenericArray::from_slice(kek));
            match direction {
                Direction::Wrap => kek.wrap(input, out),
                Direction::Unwrap => kek.unwrap(input, out),
            }
        }};
    }

    let result = match kek.len() {
        16 => with_kek!(KekAes128),
        24 => with_kek!(KekAes192),
        32 => with_kek!(KekAes256),
        _ => return NativeOutput::failed(raw::PARAM_ERROR),
    };
    match result {
        Ok(()) => NativeOutput::written(out.len()),
        Err(err) => kw_status(err),
    }
}

impl KeyWrapProvider for Software {
    fn wrap_key(
        &self,
        algorithm: WrapAlgorithm,
        iv: &[u8],
        kek: &[u8],
        raw_key: &[u8],
        output: &mut [u8],
    ) -> NativeOutput {
        if let Err(status) = check_wrap_iv(iv) {
            return NativeOutput::failed(status);
        }
        if !whole_semiblocks(raw_key, MIN_RAW_KEY) {
            return NativeOutput::failed(raw::PARAM_ERROR);
        }
        let required = self.wrapped_length(algorithm, raw_key.len());
        match output.get_mut(..required) {
            Some(out) => run_kw(Direction::Wrap, kek, raw_key, out),
            None => NativeOutput::too_small(required),
        }
    }

    fn unwrap_key(
        &self,
        algorithm: WrapAlgorithm,
        iv: &[u8],
        kek: &[u8],
        wrapped_key: &[u8],
        output: &mut [u8],
    ) -> NativeOutput {
        if let Err(status) = check_wrap_iv(iv) {
            return NativeOutput::failed(status);
        }
        if !whole_semiblocks(wrapped_key, MIN_WRAPPED_KEY) {
            return NativeOutput::failed(raw::PARAM_ERROR);
        }
        let required = self.unwrapped_length(algorithm, wrapped_key.len());
        match output.get_mut(..required) {
            Some(out) => run_kw(Direction::Unwrap, kek, wrapped_key, out),
            None => NativeOutput::too_small(required),
        }
    }

    fn wrapped_length(&self, algorithm: WrapAlgorithm, raw_len: usize) -> usize {
        match algorithm {
            WrapAlgorithm::Aes => raw_len.saturating_add(SEMIBLOCK),
        }
    }

    fn unwrapped_length(&self, algorithm: WrapAlgorithm, wrapped_len: usize) -> usize {
        match algorithm {
            WrapAlgorithm::Aes => wrapped_len.saturating_sub(SEMIBLOCK),
        }
    }
}

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

impl RandomProvider for Software {
    fn secure_random_bytes(&self, output: &mut [u8]) -> RawStatus {
        match OsRng.try_fill_bytes(output) {
            Ok(()) => raw::SUCCESS,
            Err(_) => raw::RNG_FAILURE,
        }
    }
}
