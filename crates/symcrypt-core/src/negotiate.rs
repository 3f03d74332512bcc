//! Output buffer negotiation with a single bounded retry.
//!
//! Every variable-length provider call goes through [`negotiate`]:
//!
//! 1. allocate `initial_capacity` bytes and call the provider;
//! 2. on success, truncate to the bytes written;
//! 3. on `BufferTooSmall`, resize to the size the provider reported and call
//!    it exactly once more;
//! 4. on any other failure (including a second `BufferTooSmall`) zero the
//!    buffer and return the error.
//!
//! Allocations are fallible: a size the allocator cannot satisfy is reported
//! as `MemoryFailure` instead of aborting.
//!
//! A provider that asks for more room twice for the same logical call is
//! treated as malfunctioning. The buffer is never grown in a loop.

use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::error::{CryptoError, StatusCode};
use crate::provider::NativeOutput;

/// Outcome of one provider attempt.
enum Attempt {
    Done(usize),
    TooSmall(usize),
    Failed(StatusCode),
}

/// Run `operation` against a fresh buffer, retrying once on `BufferTooSmall`.
///
/// `operation` receives the whole buffer as its output region and reports
/// what it wrote through a [`NativeOutput`].
///
/// # Errors
///
/// Returns [`CryptoError::Status`] with the terminal status when the
/// provider fails, or fails again after the retry. No output survives.
pub fn negotiate<F>(initial_capacity: usize, operation: F) -> Result<Vec<u8>, CryptoError>
where
    F: FnMut(&mut [u8]) -> NativeOutput,
{
    let mut buffer = Vec::new();
    negotiate_into(&mut buffer, initial_capacity, operation)?;
    Ok(buffer)
}

/// Same protocol as [`negotiate`], but in caller-owned memory.
///
/// Any existing contents of `buffer` are zeroed before it is sized to
/// `initial_capacity`. On success it holds exactly the bytes written and
/// that length is returned. On failure it is zeroed (including spare
/// capacity) and left empty.
///
/// # Errors
///
/// See [`negotiate`].
pub fn negotiate_into<F>(
    buffer: &mut Vec<u8>,
    initial_capacity: usize,
    mut operation: F,
) -> Result<usize, CryptoError>
where
    F: FnMut(&mut [u8]) -> NativeOutput,
{
    size_buffer(buffer, initial_capacity)?;

    let required = match attempt(buffer, &mut operation) {
        Attempt::Done(len) => return Ok(len),
        Attempt::Failed(status) => return Err(discard(buffer, status)),
        Attempt::TooSmall(required) => required,
    };

    debug!(
        capacity = initial_capacity,
        required, "output buffer too small; retrying once"
    );
    size_buffer(buffer, required)?;

    match attempt(buffer, &mut operation) {
        Attempt::Done(len) => Ok(len),
        Attempt::TooSmall(again) => {
            warn!(
                capacity = required,
                required = again,
                "provider reported a too-small buffer twice"
            );
            Err(discard(buffer, StatusCode::BufferTooSmall))
        }
        Attempt::Failed(status) => Err(discard(buffer, status)),
    }
}

/// Zero `buffer` and resize it to `len` zero bytes.
fn size_buffer(buffer: &mut Vec<u8>, len: usize) -> Result<(), CryptoError> {
    buffer.zeroize();
    if buffer.try_reserve_exact(len).is_err() {
        warn!(len, "output buffer allocation refused");
        return Err(discard(buffer, StatusCode::MemoryFailure));
    }
    buffer.resize(len, 0);
    Ok(())
}

fn attempt<F>(buffer: &mut Vec<u8>, operation: &mut F) -> Attempt
where
    F: FnMut(&mut [u8]) -> NativeOutput,
{
    let capacity = buffer.len();
    let outcome = operation(buffer.as_mut_slice());

    match StatusCode::classify(outcome.status) {
        StatusCode::Success if outcome.len <= capacity => {
            buffer[outcome.len..].zeroize();
            buffer.truncate(outcome.len);
            Attempt::Done(outcome.len)
        }
        StatusCode::Success => {
            warn!(
                capacity,
                written = outcome.len,
                "provider reported more bytes than the buffer holds"
            );
            Attempt::Failed(StatusCode::Overflow)
        }
        StatusCode::BufferTooSmall => Attempt::TooSmall(outcome.len),
        other => Attempt::Failed(other),
    }
}

fn discard(buffer: &mut Vec<u8>, status: StatusCode) -> CryptoError {
    buffer.zeroize();
    CryptoError::Status(status)
}
