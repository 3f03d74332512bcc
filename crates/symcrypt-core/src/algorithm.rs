//! Static algorithm descriptors and the small value types passed to providers.
//!
//! All lookup data here is immutable: block sizes, context sizes, legal key
//! sizes and default derived-key lengths are `const` tables keyed by enum.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Direction of a cipher operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Symmetric encryption.
    Encrypt,
    /// Symmetric decryption.
    Decrypt,
}

impl Operation {
    /// Native operation id.
    #[must_use]
    pub const fn native_id(self) -> u32 {
        match self {
            Self::Encrypt => 0,
            Self::Decrypt => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

bitflags! {
    /// Cipher option set. Order is irrelevant and duplicates collapse.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Options: u32 {
        /// Perform PKCS7 padding.
        const PKCS7_PADDING = 0x0001;
        /// Electronic Code Book mode. The default mode is CBC.
        const ECB_MODE = 0x0002;
    }
}

// ---------------------------------------------------------------------------
// Modes of operation
// ---------------------------------------------------------------------------

/// Mode of operation for the mode-based cryptor constructor.
///
/// Stream ciphers take [`Mode::Rc4`]; every other mode needs a block cipher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Electronic Code Book.
    Ecb,
    /// Cipher Block Chaining.
    Cbc,
    /// Cipher Feedback, one block per round.
    Cfb,
    /// Counter, big-endian counter over the whole block.
    Ctr,
    /// F8.
    F8,
    /// Liskov-Rivest-Wagner tweakable narrow-block.
    Lrw,
    /// Output Feedback.
    Ofb,
    /// XEX-based tweaked codebook with ciphertext stealing.
    Xts,
    /// RC4 as a stream cipher.
    Rc4,
    /// Cipher Feedback, eight bits per round.
    Cfb8,
}

impl Mode {
    /// Every mode, in native id order.
    pub const ALL: [Self; 10] = [
        Self::Ecb,
        Self::Cbc,
        Self::Cfb,
        Self::Ctr,
        Self::F8,
        Self::Lrw,
        Self::Ofb,
        Self::Xts,
        Self::Rc4,
        Self::Cfb8,
    ];

    /// Native mode id.
    #[must_use]
    pub const fn native_id(self) -> u32 {
        match self {
            Self::Ecb => 1,
            Self::Cbc => 2,
            Self::Cfb => 3,
            Self::Ctr => 4,
            Self::F8 => 5,
            Self::Lrw => 6,
            Self::Ofb => 7,
            Self::Xts => 8,
            Self::Rc4 => 9,
            Self::Cfb8 => 10,
        }
    }

    /// Look up a mode by native id.
    #[must_use]
    pub fn from_native(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.native_id() == id)
    }

    /// Returns `true` for modes that process whole blocks and so honour
    /// [`Padding`]. The feedback and counter modes are length preserving.
    #[must_use]
    pub const fn is_block_aligned(self) -> bool {
        matches!(self, Self::Ecb | Self::Cbc)
    }
}

/// Padding for the block-aligned modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Padding {
    /// No padding; input must be block aligned at finalize.
    #[default]
    None,
    /// PKCS7 padding.
    Pkcs7,
}

impl Padding {
    /// Native padding id.
    #[must_use]
    pub const fn native_id(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Pkcs7 => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Cipher algorithms
// ---------------------------------------------------------------------------

/// Legal key lengths (in bytes) for an algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySizes {
    /// One of a fixed set of lengths.
    Fixed(&'static [usize]),
    /// Any length in `min..=max`.
    Range {
        /// Smallest accepted key length.
        min: usize,
        /// Largest accepted key length.
        max: usize,
    },
}

impl KeySizes {
    /// Returns `true` if `len` is an accepted key length.
    #[must_use]
    pub fn contains(&self, len: usize) -> bool {
        match self {
            Self::Fixed(sizes) => sizes.contains(&len),
            Self::Range { min, max } => (*min..=*max).contains(&len),
        }
    }

    /// The smallest accepted key length.
    #[must_use]
    pub fn min(&self) -> usize {
        match self {
            Self::Fixed(sizes) => sizes.iter().copied().min().unwrap_or(0),
            Self::Range { min, .. } => *min,
        }
    }

    /// The largest accepted key length.
    #[must_use]
    pub fn max(&self) -> usize {
        match self {
            Self::Fixed(sizes) => sizes.iter().copied().max().unwrap_or(0),
            Self::Range { max, .. } => *max,
        }
    }
}

/// Immutable descriptor for a cipher algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlgorithmInfo {
    /// Native algorithm id.
    pub native_id: u32,
    /// Block size in bytes; `0` for stream ciphers (no IV is meaningful).
    pub block_size: usize,
    /// Minimum memory, in bytes, for a caller-hosted context.
    pub context_size: usize,
    /// Key lengths the algorithm defines, in bytes.
    ///
    /// These are the algorithm's own limits. A provider may implement only
    /// part of the range; see `Software::accepts_key` for the bundled one.
    pub key_sizes: KeySizes,
}

/// Symmetric cipher algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Advanced Encryption Standard, 128-bit block; 128/192/256-bit keys.
    Aes,
    /// Data Encryption Standard.
    Des,
    /// Triple-DES, three key, EDE configuration.
    TripleDes,
    /// CAST-128.
    Cast,
    /// RC4 stream cipher.
    Rc4,
    /// RC2 block cipher.
    Rc2,
    /// Blowfish block cipher.
    Blowfish,
}

const AES_INFO: AlgorithmInfo = AlgorithmInfo {
    native_id: 0,
    block_size: 16,
    context_size: 404,
    key_sizes: KeySizes::Fixed(&[16, 24, 32]),
};

const DES_INFO: AlgorithmInfo = AlgorithmInfo {
    native_id: 1,
    block_size: 8,
    context_size: 240,
    key_sizes: KeySizes::Fixed(&[8]),
};

const TRIPLE_DES_INFO: AlgorithmInfo = AlgorithmInfo {
    native_id: 2,
    block_size: 8,
    context_size: 496,
    key_sizes: KeySizes::Fixed(&[24]),
};

const CAST_INFO: AlgorithmInfo = AlgorithmInfo {
    native_id: 3,
    block_size: 8,
    context_size: 240,
    key_sizes: KeySizes::Range { min: 5, max: 16 },
};

const RC4_INFO: AlgorithmInfo = AlgorithmInfo {
    native_id: 4,
    block_size: 0,
    context_size: 1072,
    key_sizes: KeySizes::Range { min: 1, max: 512 },
};

const RC2_INFO: AlgorithmInfo = AlgorithmInfo {
    native_id: 5,
    block_size: 8,
    context_size: 128,
    key_sizes: KeySizes::Range { min: 1, max: 128 },
};

const BLOWFISH_INFO: AlgorithmInfo = AlgorithmInfo {
    native_id: 6,
    block_size: 8,
    context_size: 128,
    key_sizes: KeySizes::Range { min: 8, max: 56 },
};

impl Algorithm {
    /// Legacy name for AES; 128-bit blocks are part of the standard.
    pub const AES128: Self = Self::Aes;

    /// Every algorithm, in native id order.
    pub const ALL: [Self; 7] = [
        Self::Aes,
        Self::Des,
        Self::TripleDes,
        Self::Cast,
        Self::Rc4,
        Self::Rc2,
        Self::Blowfish,
    ];

    /// Descriptor for this algorithm.
    #[must_use]
    pub const fn info(self) -> &'static AlgorithmInfo {
        match self {
            Self::Aes => &AES_INFO,
            Self::Des => &DES_INFO,
            Self::TripleDes => &TRIPLE_DES_INFO,
            Self::Cast => &CAST_INFO,
            Self::Rc4 => &RC4_INFO,
            Self::Rc2 => &RC2_INFO,
            Self::Blowfish => &BLOWFISH_INFO,
        }
    }

    /// Look up an algorithm by native id.
    #[must_use]
    pub fn from_native(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.info().native_id == id)
    }

    /// Block size in bytes; `0` for stream ciphers.
    #[must_use]
    pub const fn block_size(self) -> usize {
        self.info().block_size
    }

    /// Minimum memory, in bytes, for a caller-hosted context.
    #[must_use]
    pub const fn context_size(self) -> usize {
        self.info().context_size
    }

    /// Key lengths the algorithm defines. Providers may accept fewer.
    #[must_use]
    pub const fn key_sizes(self) -> KeySizes {
        self.info().key_sizes
    }

    /// Returns `true` for stream ciphers, which take no IV.
    #[must_use]
    pub const fn is_stream(self) -> bool {
        self.block_size() == 0
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Password-based key derivation functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pbkdf {
    /// PBKDF2 (RFC 8018).
    Pbkdf2,
}

impl Pbkdf {
    /// Native PBKDF id.
    #[must_use]
    pub const fn native_id(self) -> u32 {
        match self {
            Self::Pbkdf2 => 2,
        }
    }
}

/// Pseudorandom functions used for PBKDF iterations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prf {
    /// HMAC-SHA-1.
    HmacSha1,
    /// HMAC-SHA-224.
    HmacSha224,
    /// HMAC-SHA-256.
    HmacSha256,
    /// HMAC-SHA-384.
    HmacSha384,
    /// HMAC-SHA-512.
    HmacSha512,
}

impl Prf {
    /// Every PRF, in native id order.
    pub const ALL: [Self; 5] = [
        Self::HmacSha1,
        Self::HmacSha224,
        Self::HmacSha256,
        Self::HmacSha384,
        Self::HmacSha512,
    ];

    /// Native PRF id.
    #[must_use]
    pub const fn native_id(self) -> u32 {
        match self {
            Self::HmacSha1 => 1,
            Self::HmacSha224 => 2,
            Self::HmacSha256 => 3,
            Self::HmacSha384 => 4,
            Self::HmacSha512 => 5,
        }
    }

    /// Look up a PRF by native id.
    #[must_use]
    pub fn from_native(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|prf| prf.native_id() == id)
    }

    /// Derived key length used when the caller does not pick one: the
    /// digest length of the underlying hash.
    #[must_use]
    pub const fn default_key_len(self) -> usize {
        default_derived_key_len(self.native_id())
    }
}

/// Default derived key length for a native PRF id; unrecognised ids get 16.
#[must_use]
pub const fn default_derived_key_len(native_prf: u32) -> usize {
    match native_prf {
        1 => 20,
        2 => 28,
        3 => 32,
        4 => 48,
        5 => 64,
        _ => 16,
    }
}

// ---------------------------------------------------------------------------
// Key wrapping
// ---------------------------------------------------------------------------

/// Key wrapping algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapAlgorithm {
    /// AES key wrap (RFC 3394).
    Aes,
}

impl WrapAlgorithm {
    /// Native wrapping algorithm id.
    #[must_use]
    pub const fn native_id(self) -> u32 {
        match self {
            Self::Aes => 1,
        }
    }
}
