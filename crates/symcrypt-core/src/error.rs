//! Status classification and error types for `symcrypt-core`.
//!
//! Every provider call reports a raw `i32` status. [`StatusCode::classify`]
//! turns that into a closed set of kinds, and [`StatusCode::to_error`] turns
//! any non-success kind into a [`CryptoError`].

use std::fmt;

use thiserror::Error;

use crate::provider::{raw, RawStatus};

/// Outcome kind of a single provider call.
///
/// Exactly one value is produced per call. [`StatusCode::BufferTooSmall`] is
/// the only kind the crate ever retries, and it is retried at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Operation completed normally.
    Success,
    /// Illegal parameter value.
    ParameterError,
    /// Insufficient buffer provided for the operation.
    BufferTooSmall,
    /// Memory allocation failure.
    MemoryFailure,
    /// Input size was not aligned properly.
    AlignmentError,
    /// Input data did not decode or decrypt properly.
    DecodeError,
    /// Function not implemented for the current algorithm.
    Unimplemented,
    /// Arithmetic overflow inside the provider.
    Overflow,
    /// The random number generator failed.
    RandomGeneratorFailure,
    /// Any status the crate does not recognise.
    Unknown,
}

impl StatusCode {
    /// Classify a raw provider status. Total: unrecognised codes map to
    /// [`StatusCode::Unknown`].
    #[must_use]
    pub const fn classify(status: RawStatus) -> Self {
        match status {
            raw::SUCCESS => Self::Success,
            raw::PARAM_ERROR => Self::ParameterError,
            raw::BUFFER_TOO_SMALL => Self::BufferTooSmall,
            raw::MEMORY_FAILURE => Self::MemoryFailure,
            raw::ALIGNMENT_ERROR => Self::AlignmentError,
            raw::DECODE_ERROR => Self::DecodeError,
            raw::UNIMPLEMENTED => Self::Unimplemented,
            raw::OVERFLOW => Self::Overflow,
            raw::RNG_FAILURE => Self::RandomGeneratorFailure,
            _ => Self::Unknown,
        }
    }

    /// The raw provider value for this kind.
    #[must_use]
    pub const fn raw(self) -> RawStatus {
        match self {
            Self::Success => raw::SUCCESS,
            Self::ParameterError => raw::PARAM_ERROR,
            Self::BufferTooSmall => raw::BUFFER_TOO_SMALL,
            Self::MemoryFailure => raw::MEMORY_FAILURE,
            Self::AlignmentError => raw::ALIGNMENT_ERROR,
            Self::DecodeError => raw::DECODE_ERROR,
            Self::Unimplemented => raw::UNIMPLEMENTED,
            Self::Overflow => raw::OVERFLOW,
            Self::RandomGeneratorFailure => raw::RNG_FAILURE,
            Self::Unknown => raw::UNKNOWN,
        }
    }

    /// Fixed human-readable description for this kind.
    ///
    /// `None` for [`StatusCode::Success`] and for the kinds where the
    /// provider gives no further detail (overflow, RNG failure, unknown).
    #[must_use]
    pub const fn message(self) -> Option<&'static str> {
        match self {
            Self::ParameterError => Some("Illegal parameter value."),
            Self::BufferTooSmall => Some("Insufficient buffer provided for specified operation."),
            Self::MemoryFailure => Some("Memory allocation failure."),
            Self::AlignmentError => Some("Input size was not aligned properly."),
            Self::DecodeError => Some("Input data did not decode or decrypt properly."),
            Self::Unimplemented => Some("Function not implemented for the current algorithm."),
            Self::Success | Self::Overflow | Self::RandomGeneratorFailure | Self::Unknown => None,
        }
    }

    /// Returns `true` for the single retryable kind.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::BufferTooSmall)
    }

    /// `None` for success, otherwise the matching [`CryptoError`].
    #[must_use]
    pub const fn to_error(self) -> Option<CryptoError> {
        match self {
            Self::Success => None,
            other => Some(CryptoError::Status(other)),
        }
    }

    /// `Ok(())` for success, otherwise the matching [`CryptoError`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Status`] for every kind except success.
    pub fn check(self) -> Result<(), CryptoError> {
        match self.to_error() {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ParameterError => "parameter error",
            Self::BufferTooSmall => "buffer too small",
            Self::MemoryFailure => "memory failure",
            Self::AlignmentError => "alignment error",
            Self::DecodeError => "decode error",
            Self::Unimplemented => "unimplemented",
            Self::Overflow => "overflow",
            Self::RandomGeneratorFailure => "random generator failure",
            Self::Unknown => "unknown status",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{}: {message}", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Errors produced by `symcrypt-core` operations.
///
/// A failed operation never returns output alongside the error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The provider reported a non-success status. Never holds
    /// [`StatusCode::Success`] when produced by this crate.
    #[error("{0}")]
    Status(StatusCode),

    /// The provider refused to create a cipher context.
    #[error("cipher context creation failed: {0}")]
    ContextCreation(StatusCode),

    /// `update` or `finalize` was called on a finalized cryptor.
    #[error("cryptor already finalized; reset it before further use")]
    Finalized,
}

impl CryptoError {
    /// The provider status behind this error, if there is one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(status) | Self::ContextCreation(status) => Some(*status),
            Self::Finalized => None,
        }
    }

    /// The fixed description attached to the status, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self.status() {
            Some(status) => status.message(),
            None => None,
        }
    }
}
