//! Cipher contexts for the software provider.
//!
//! Block ciphers in ECB, CBC or CFB8 go through a block engine that keeps
//! at most two blocks of pending input between calls and applies PKCS7 when
//! asked. CFB, CTR, OFB and RC4 are plain keystreams. Every write checks
//! capacity first and returns `BufferTooSmall` without touching state, so a
//! retried call sees the context exactly as before.

use cipher::consts::{
    U1, U10, U11, U12, U128, U13, U14, U15, U16, U17, U18, U19, U2, U20, U21, U22, U23, U24,
    U25, U256, U26, U27, U28, U29, U3, U30, U31, U32, U4, U5, U6, U64, U7, U8, U9,
};
use cipher::{
    Block, BlockCipher, BlockDecryptMut, BlockEncryptMut, InnerIvInit, KeyInit, StreamCipher,
    StreamCipherCoreWrapper,
};
use zeroize::{Zeroize, Zeroizing};

use crate::algorithm::{Algorithm, Mode, Operation, Options, Padding};
use crate::provider::{raw, NativeOutput, RawStatus};

/// Largest block size among the supported ciphers.
const MAX_BLOCK: usize = 16;

/// Object-safe single-block transform (one direction, one mode).
trait BlockMode: Send {
    fn process(&mut self, block: &mut [u8]);
}

struct Encrypting<M>(M);
struct Decrypting<M>(M);

impl<M: BlockEncryptMut + Send> BlockMode for Encrypting<M> {
    fn process(&mut self, block: &mut [u8]) {
        self.0.encrypt_block_mut(Block::<M>::from_mut_slice(block));
    }
}

impl<M: BlockDecryptMut + Send> BlockMode for Decrypting<M> {
    fn process(&mut self, block: &mut [u8]) {
        self.0.decrypt_block_mut(Block::<M>::from_mut_slice(block));
    }
}

/// Object-safe keystream over any length.
trait Keystream: Send {
    fn apply(&mut self, data: &mut [u8]);
}

struct Keyed<S>(S);

impl<S: StreamCipher + Send> Keystream for Keyed<S> {
    fn apply(&mut self, data: &mut [u8]) {
        self.0.apply_keystream(data);
    }
}

struct CfbEncrypting<C: BlockEncryptMut + BlockCipher>(cfb_mode::BufEncryptor<C>);
struct CfbDecrypting<C: BlockEncryptMut + BlockCipher>(cfb_mode::BufDecryptor<C>);

impl<C: BlockEncryptMut + BlockCipher + Send> Keystream for CfbEncrypting<C> {
    fn apply(&mut self, data: &mut [u8]) {
        self.0.encrypt(data);
    }
}

impl<C: BlockEncryptMut + BlockCipher + Send> Keystream for CfbDecrypting<C> {
    fn apply(&mut self, data: &mut [u8]) {
        self.0.decrypt(data);
    }
}

struct BlockEngine {
    mode: Box<dyn BlockMode>,
    block_size: usize,
    pending: Zeroizing<Vec<u8>>,
    encrypt: bool,
    padding: bool,
}

enum Engine {
    Block(BlockEngine),
    Stream(Box<dyn Keystream>),
    Released,
}

/// Software cipher context.
pub struct SoftContext {
    operation: Operation,
    algorithm: Algorithm,
    mode: Mode,
    padding: bool,
    key: Zeroizing<Vec<u8>>,
    engine: Engine,
}

impl SoftContext {
    /// Context from the option flags: CBC unless `ECB_MODE` is set, RC4 for
    /// the stream cipher.
    pub(crate) fn new(
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<Self, RawStatus> {
        let mode = if algorithm.is_stream() {
            Mode::Rc4
        } else if options.contains(Options::ECB_MODE) {
            Mode::Ecb
        } else {
            Mode::Cbc
        };
        let padding = if options.contains(Options::PKCS7_PADDING) {
            Padding::Pkcs7
        } else {
            Padding::None
        };
        Self::with_mode(operation, mode, algorithm, padding, key, iv)
    }

    /// Context for an explicit mode. Padding only applies to ECB and CBC.
    pub(crate) fn with_mode(
        operation: Operation,
        mode: Mode,
        algorithm: Algorithm,
        padding: Padding,
        key: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<Self, RawStatus> {
        if !supported_key_len(algorithm, key.len()) {
            return Err(raw::PARAM_ERROR);
        }
        let padding = mode.is_block_aligned() && padding == Padding::Pkcs7;
        let engine = keyed_engine(operation, algorithm, mode, padding, key, iv)?;
        Ok(Self {
            operation,
            algorithm,
            mode,
            padding,
            key: Zeroizing::new(key.to_vec()),
            engine,
        })
    }

    pub(crate) fn output_len(&self, input_len: usize, is_final: bool) -> usize {
        match &self.engine {
            Engine::Block(block) if is_final => block.total_len(input_len),
            Engine::Block(block) => block.update_len(input_len),
            Engine::Stream(_) => input_len,
            Engine::Released => 0,
        }
    }

    pub(crate) fn update(&mut self, input: &[u8], output: &mut [u8]) -> NativeOutput {
        match &mut self.engine {
            Engine::Block(block) => block.update(input, output),
            Engine::Stream(stream) => {
                let Some(out) = output.get_mut(..input.len()) else {
                    return NativeOutput::too_small(input.len());
                };
                out.copy_from_slice(input);
                stream.apply(out);
                NativeOutput::written(input.len())
            }
            Engine::Released => NativeOutput::failed(raw::PARAM_ERROR),
        }
    }

    pub(crate) fn finalize(&mut self, output: &mut [u8]) -> NativeOutput {
        match &mut self.engine {
            Engine::Block(block) => block.finalize(output),
            Engine::Stream(_) => NativeOutput::written(0),
            Engine::Released => NativeOutput::failed(raw::PARAM_ERROR),
        }
    }

    /// Re-key with a new IV. On failure the context is left as it was.
    pub(crate) fn reset(&mut self, iv: Option<&[u8]>) -> RawStatus {
        if matches!(self.engine, Engine::Released) {
            return raw::PARAM_ERROR;
        }
        match keyed_engine(
            self.operation,
            self.algorithm,
            self.mode,
            self.padding,
            &self.key,
            iv,
        ) {
            Ok(engine) => {
                self.engine = engine;
                raw::SUCCESS
            }
            Err(status) => status,
        }
    }

    pub(crate) fn release(&mut self) {
        self.key.zeroize();
        if let Engine::Block(block) = &mut self.engine {
            block.pending.zeroize();
        }
        self.engine = Engine::Released;
    }
}

/// Key lengths the software backends accept. RC4 key sizes are type-level
/// in its backend, so only the common lengths are wired up.
pub(crate) fn supported_key_len(algorithm: Algorithm, len: usize) -> bool {
    match algorithm {
        Algorithm::Rc4 => matches!(len, 1..=32 | 64 | 128 | 256),
        other => other.key_sizes().contains(len),
    }
}

impl BlockEngine {
    /// Bytes the next `update` emits: whole blocks only, and when decrypting
    /// with padding the last whole block stays behind for `finalize`.
    fn update_len(&self, input_len: usize) -> usize {
        let total = self.pending.len().saturating_add(input_len);
        let remainder = total.checked_rem(self.block_size).unwrap_or(0);
        let mut ready = total.saturating_sub(remainder);
        if !self.encrypt && self.padding && remainder == 0 {
            ready = ready.saturating_sub(self.block_size);
        }
        ready
    }

    /// Upper bound for `update(input_len)` followed by `finalize`.
    fn total_len(&self, input_len: usize) -> usize {
        let total = self.pending.len().saturating_add(input_len);
        if self.encrypt && self.padding {
            let remainder = total.checked_rem(self.block_size).unwrap_or(0);
            total
                .saturating_sub(remainder)
                .saturating_add(self.block_size)
        } else {
            total
        }
    }

    fn update(&mut self, input: &[u8], output: &mut [u8]) -> NativeOutput {
        let ready = self.update_len(input.len());
        let Some(out) = output.get_mut(..ready) else {
            return NativeOutput::too_small(ready);
        };

        let from_pending = ready.min(self.pending.len());
        let from_input = ready.saturating_sub(from_pending);
        out[..from_pending].copy_from_slice(&self.pending[..from_pending]);
        out[from_pending..].copy_from_slice(&input[..from_input]);

        self.pending.copy_within(from_pending.., 0);
        let kept = self.pending.len().saturating_sub(from_pending);
        self.pending[kept..].zeroize();
        self.pending.truncate(kept);
        self.pending.extend_from_slice(&input[from_input..]);

        for block in out.chunks_exact_mut(self.block_size) {
            self.mode.process(block);
        }
        NativeOutput::written(ready)
    }

    fn finalize(&mut self, output: &mut [u8]) -> NativeOutput {
        let pending = self.pending.len();
        let result = match (self.encrypt, self.padding) {
            (true, true) => self.pad_final(output),
            (false, true) => self.unpad_final(output),
            (_, false) if pending == 0 => NativeOutput::written(0),
            (_, false) => NativeOutput::failed(raw::ALIGNMENT_ERROR),
        };
        if result.status != raw::BUFFER_TOO_SMALL {
            self.pending.zeroize();
        }
        result
    }

    fn pad_final(&mut self, output: &mut [u8]) -> NativeOutput {
        let bs = self.block_size;
        let Some(out) = output.get_mut(..bs) else {
            return NativeOutput::too_small(bs);
        };
        let filled = self.pending.len();
        let Ok(pad) = u8::try_from(bs.saturating_sub(filled)) else {
            return NativeOutput::failed(raw::PARAM_ERROR);
        };
        out[..filled].copy_from_slice(&self.pending);
        out[filled..].fill(pad);
        self.mode.process(out);
        NativeOutput::written(bs)
    }

    fn unpad_final(&mut self, output: &mut [u8]) -> NativeOutput {
        let bs = self.block_size;
        match self.pending.len() {
            0 => return NativeOutput::failed(raw::DECODE_ERROR),
            len if len != bs => return NativeOutput::failed(raw::ALIGNMENT_ERROR),
            _ => {}
        }
        if output.len() < bs {
            return NativeOutput::too_small(bs);
        }

        let mut scratch = Zeroizing::new([0u8; MAX_BLOCK]);
        let block = &mut scratch[..bs];
        block.copy_from_slice(&self.pending);
        self.mode.process(block);

        let pad = usize::from(block[bs.saturating_sub(1)]);
        let keep = bs.saturating_sub(pad);
        let valid = (1..=bs).contains(&pad)
            && block[keep..]
                .iter()
                .all(|&b| usize::from(b) == pad);
        if !valid {
            return NativeOutput::failed(raw::DECODE_ERROR);
        }
        output[..keep].copy_from_slice(&block[..keep]);
        NativeOutput::written(keep)
    }
}

// ---------------------------------------------------------------------------
// Keying
// ---------------------------------------------------------------------------

fn keyed<C: KeyInit>(key: &[u8]) -> Result<C, RawStatus> {
    C::new_from_slice(key).map_err(|_| raw::PARAM_ERROR)
}

fn keystream<S: StreamCipher + Send + 'static>(cipher: S) -> Engine {
    Engine::Stream(Box::new(Keyed(cipher)))
}

/// Dispatch on the mode for one concrete block cipher. CTR and OFB are
/// built from their cores because the wrapper types have no inner-cipher
/// constructor.
macro_rules! mode_engine {
    ($setup:expr, $cipher:ty = $init:expr, $flavor:ident) => {{
        let setup: &ModeSetup = &$setup;
        let cipher: $cipher = $init;
        match setup.mode {
            Mode::Ctr => {
                ctr::CtrCore::<$cipher, ctr::flavors::$flavor>::inner_iv_slice_init(
                    cipher,
                    setup.iv(),
                )
                .map(|core| keystream(StreamCipherCoreWrapper::from_core(core)))
                .map_err(|_| raw::PARAM_ERROR)
            }
            Mode::Ofb => ofb::OfbCore::<$cipher>::inner_iv_slice_init(cipher, setup.iv())
                .map(|core| keystream(StreamCipherCoreWrapper::from_core(core)))
                .map_err(|_| raw::PARAM_ERROR),
            Mode::Cfb => setup.cfb(cipher),
            _ => setup.block(cipher),
        }
    }};
}

/// Pending input never exceeds two blocks, so its buffer is sized once
/// and never reallocated.
fn keyed_engine(
    operation: Operation,
    algorithm: Algorithm,
    mode: Mode,
    padding: bool,
    key: &[u8],
    iv: Option<&[u8]>,
) -> Result<Engine, RawStatus> {
    match mode {
        Mode::Xts | Mode::F8 | Mode::Lrw => return Err(raw::UNIMPLEMENTED),
        Mode::Rc4 if algorithm.is_stream() => return rc4_keystream(key),
        Mode::Rc4 => return Err(raw::PARAM_ERROR),
        _ if algorithm.is_stream() => return Err(raw::PARAM_ERROR),
        _ => {}
    }

    let setup = ModeSetup::new(operation, mode, algorithm.block_size(), padding, iv)?;
    match algorithm {
        Algorithm::Aes => match key.len() {
            16 => mode_engine!(setup, aes::Aes128 = keyed(key)?, Ctr128BE),
            24 => mode_engine!(setup, aes::Aes192 = keyed(key)?, Ctr128BE),
            32 => mode_engine!(setup, aes::Aes256 = keyed(key)?, Ctr128BE),
            _ => Err(raw::PARAM_ERROR),
        },
        Algorithm::Des => mode_engine!(setup, des::Des = keyed(key)?, Ctr64BE),
        Algorithm::TripleDes => mode_engine!(setup, des::TdesEde3 = keyed(key)?, Ctr64BE),
        Algorithm::Cast => mode_engine!(setup, cast5::Cast5 = keyed(key)?, Ctr64BE),
        Algorithm::Blowfish => mode_engine!(setup, blowfish::Blowfish = keyed(key)?, Ctr64BE),
        Algorithm::Rc2 => {
            let effective_bits = key.len().saturating_mul(8);
            mode_engine!(
                setup,
                rc2::Rc2 = rc2::Rc2::new_with_eff_key_len(key, effective_bits),
                Ctr64BE
            )
        }
        Algorithm::Rc4 => Err(raw::PARAM_ERROR),
    }
}

/// Mode, direction and resolved IV for one block-cipher context.
struct ModeSetup {
    operation: Operation,
    mode: Mode,
    block_size: usize,
    padding: bool,
    iv: [u8; MAX_BLOCK],
}

impl ModeSetup {
    /// An absent IV is all zeros; a present one must be exactly one block.
    /// ECB never reads it.
    fn new(
        operation: Operation,
        mode: Mode,
        block_size: usize,
        padding: bool,
        iv: Option<&[u8]>,
    ) -> Result<Self, RawStatus> {
        let mut block = [0u8; MAX_BLOCK];
        match iv {
            _ if mode == Mode::Ecb => {}
            Some(iv) if iv.len() == block_size && block_size <= MAX_BLOCK => {
                block[..block_size].copy_from_slice(iv);
            }
            Some(_) => return Err(raw::PARAM_ERROR),
            None => {}
        }
        Ok(Self {
            operation,
            mode,
            block_size,
            padding,
            iv: block,
        })
    }

    fn iv(&self) -> &[u8] {
        &self.iv[..self.block_size]
    }

    /// ECB, CBC or CFB8 through the block engine. CFB8 works on
    /// one-byte blocks.
    fn block<C>(&self, cipher: C) -> Result<Engine, RawStatus>
    where
        C: BlockCipher + BlockEncryptMut + BlockDecryptMut + Send + 'static,
    {
        let iv = self.iv();
        let mode: Box<dyn BlockMode> = match (self.mode, self.operation) {
            (Mode::Ecb, Operation::Encrypt) => Box::new(Encrypting(cipher)),
            (Mode::Ecb, Operation::Decrypt) => Box::new(Decrypting(cipher)),
            (Mode::Cfb8, Operation::Encrypt) => Box::new(Encrypting(
                cfb8::Encryptor::<C>::inner_iv_slice_init(cipher, iv)
                    .map_err(|_| raw::PARAM_ERROR)?,
            )),
            (Mode::Cfb8, Operation::Decrypt) => Box::new(Decrypting(
                cfb8::Decryptor::<C>::inner_iv_slice_init(cipher, iv)
                    .map_err(|_| raw::PARAM_ERROR)?,
            )),
            (_, Operation::Encrypt) => Box::new(Encrypting(
                cbc::Encryptor::<C>::inner_iv_slice_init(cipher, iv)
                    .map_err(|_| raw::PARAM_ERROR)?,
            )),
            (_, Operation::Decrypt) => Box::new(Decrypting(
                cbc::Decryptor::<C>::inner_iv_slice_init(cipher, iv)
                    .map_err(|_| raw::PARAM_ERROR)?,
            )),
        };
        let block_size = if self.mode == Mode::Cfb8 {
            1
        } else {
            self.block_size
        };
        Ok(Engine::Block(BlockEngine {
            mode,
            block_size,
            pending: Zeroizing::new(Vec::with_capacity(block_size.saturating_mul(2))),
            encrypt: self.operation == Operation::Encrypt,
            padding: self.padding,
        }))
    }

    /// Full-block CFB over any length.
    fn cfb<C>(&self, cipher: C) -> Result<Engine, RawStatus>
    where
        C: BlockCipher + BlockEncryptMut + Send + 'static,
    {
        let stream: Box<dyn Keystream> = match self.operation {
            Operation::Encrypt => Box::new(CfbEncrypting(
                cfb_mode::BufEncryptor::<C>::inner_iv_slice_init(cipher, self.iv())
                    .map_err(|_| raw::PARAM_ERROR)?,
            )),
            Operation::Decrypt => Box::new(CfbDecrypting(
                cfb_mode::BufDecryptor::<C>::inner_iv_slice_init(cipher, self.iv())
                    .map_err(|_| raw::PARAM_ERROR)?,
            )),
        };
        Ok(Engine::Stream(stream))
    }
}

macro_rules! rc4_for_len {
    ($key:expr; $($len:literal => $size:ty),+ $(,)?) => {
        match $key.len() {
            $($len => keyed::<rc4::Rc4<$size>>($key).map(keystream),)+
            _ => Err(raw::PARAM_ERROR),
        }
    };
}

fn rc4_keystream(key: &[u8]) -> Result<Engine, RawStatus> {
    rc4_for_len!(key;
        1 => U1, 2 => U2, 3 => U3, 4 => U4, 5 => U5, 6 => U6, 7 => U7, 8 => U8,
        9 => U9, 10 => U10, 11 => U11, 12 => U12, 13 => U13, 14 => U14, 15 => U15, 16 => U16,
        17 => U17, 18 => U18, 19 => U19, 20 => U20, 21 => U21, 22 => U22, 23 => U23, 24 => U24,
        25 => U25, 26 => U26, 27 => U27, 28 => U28, 29 => U29, 30 => U30, 31 => U31, 32 => U32,
        64 => U64, 128 => U128, 256 => U256,
    )
}
