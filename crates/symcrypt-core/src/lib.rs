//! `symcrypt-core`: misuse-resistant access to symmetric primitives.
//!
//! The crate drives a primitive provider (ciphers, PBKDF, key wrap, CSPRNG)
//! and owns everything around each call: output sizing with a single bounded
//! retry, status classification, and zeroing of every buffer that may hold
//! secrets. [`Software`] is the bundled pure-Rust provider.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod algorithm;
pub mod error;
pub mod provider;

pub mod memory;
pub mod negotiate;
pub mod random;

pub mod cryptor;
pub mod symmetric;

pub mod kdf;

pub mod keywrap;

pub mod software;

pub use algorithm::{
    default_derived_key_len, Algorithm, AlgorithmInfo, KeySizes, Mode, Operation, Options, Padding,
    Pbkdf, Prf, WrapAlgorithm,
};
pub use cryptor::Cryptor;
pub use error::{CryptoError, StatusCode};
pub use kdf::{calibrate, derive, derive_for_duration, DerivationParams};
pub use keywrap::{unwrap, wrap, RFC3394_IV};
pub use memory::SecretBuffer;
pub use provider::{
    CipherProvider, ContextInMemory, KdfProvider, KeyWrapProvider, NativeOutput, RandomProvider,
    RawStatus,
};
pub use random::random_bytes;
pub use software::Software;
pub use symmetric::{crypt, decrypt, encrypt};
