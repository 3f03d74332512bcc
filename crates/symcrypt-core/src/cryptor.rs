//! Stateful streaming cipher.
//!
//! A [`Cryptor`] owns one provider context from creation to drop:
//! - [`Cryptor::update`] may be called any number of times
//! - [`Cryptor::finalize`] flushes buffered input and applies or strips padding
//! - after `finalize` the cryptor refuses work until [`Cryptor::reset`]
//! - dropping it releases the context exactly once
//!
//! [`Cryptor::with_mode`] names the mode of operation explicitly instead of
//! deriving CBC or ECB from option flags.
//!
//! With [`Cryptor::with_memory`] the provider hosts the context in a
//! caller-owned buffer. That buffer is zeroed on construction failure and
//! zeroed and emptied when the cryptor is dropped.

use tracing::{debug, trace};
use zeroize::Zeroize;

use crate::algorithm::{Algorithm, Mode, Operation, Options, Padding};
use crate::error::{CryptoError, StatusCode};
use crate::negotiate::{negotiate, negotiate_into};
use crate::provider::{CipherProvider, NativeOutput, RawStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Ready,
    Finalized,
}

/// Streaming encryptor or decryptor bound to a provider context.
pub struct Cryptor<'a, P: CipherProvider> {
    provider: &'a P,
    context: P::Context,
    memory: Option<&'a mut Vec<u8>>,
    operation: Operation,
    algorithm: Algorithm,
    state: State,
}

impl<'a, P: CipherProvider> Cryptor<'a, P> {
    /// Create a cryptor whose context memory the provider manages.
    ///
    /// `iv` is ignored by stream ciphers and ECB; `None` means an all-zero IV.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::ContextCreation`] with the provider's status,
    /// e.g. `ParameterError` for an illegal key length.
    pub fn new(
        provider: &'a P,
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<Self, CryptoError> {
        let context = provider
            .create_context(operation, algorithm, options, key, iv)
            .map_err(creation_error)?;
        debug!(?operation, ?algorithm, ?options, "cryptor created");
        Ok(Self {
            provider,
            context,
            memory: None,
            operation,
            algorithm,
            state: State::Ready,
        })
    }

    /// Create a cryptor for an explicit mode of operation.
    ///
    /// `padding` only affects ECB and CBC. `tweak` is for tweakable modes;
    /// `rounds` of `0` keeps the algorithm's standard round count.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::ContextCreation`] with the provider's status:
    /// `Unimplemented` for modes the provider lacks, `ParameterError` for a
    /// mode the algorithm cannot run in or a bad key or IV length.
    #[allow(clippy::too_many_arguments)]
    pub fn with_mode(
        provider: &'a P,
        operation: Operation,
        mode: Mode,
        algorithm: Algorithm,
        padding: Padding,
        key: &[u8],
        iv: Option<&[u8]>,
        tweak: &[u8],
        rounds: u32,
    ) -> Result<Self, CryptoError> {
        let context = provider
            .create_context_with_mode(operation, mode, algorithm, padding, key, iv, tweak, rounds)
            .map_err(creation_error)?;
        debug!(?operation, ?mode, ?algorithm, ?padding, "cryptor created");
        Ok(Self {
            provider,
            context,
            memory: None,
            operation,
            algorithm,
            state: State::Ready,
        })
    }

    /// Create a cryptor hosted in `memory`.
    ///
    /// Existing contents of `memory` are zeroed first. It starts at the
    /// algorithm's context size and grows once if the provider asks for
    /// more. The buffer stays borrowed for the cryptor's lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::ContextCreation`]; `memory` is zeroed and
    /// empty afterwards.
    pub fn with_memory(
        provider: &'a P,
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: Option<&[u8]>,
        memory: &'a mut Vec<u8>,
    ) -> Result<Self, CryptoError> {
        let mut created = None;
        let outcome = negotiate_into(memory, algorithm.context_size(), |region| {
            let attempt =
                provider.create_context_in_memory(operation, algorithm, options, key, iv, region);
            match attempt.context {
                Ok(context) => {
                    created = Some(context);
                    NativeOutput::written(attempt.used)
                }
                Err(status) => NativeOutput {
                    status,
                    len: attempt.used,
                },
            }
        });

        let context = match (outcome, created) {
            (Ok(_), Some(context)) => context,
            (Ok(_), None) => {
                memory.zeroize();
                return Err(CryptoError::ContextCreation(StatusCode::Unknown));
            }
            (Err(err), created) => {
                if let Some(mut orphan) = created {
                    provider.release_context(&mut orphan);
                }
                let status = err.status().unwrap_or(StatusCode::Unknown);
                return Err(CryptoError::ContextCreation(status));
            }
        };

        debug!(
            ?operation,
            ?algorithm,
            ?options,
            memory = memory.len(),
            "cryptor created in caller memory"
        );
        Ok(Self {
            provider,
            context,
            memory: Some(memory),
            operation,
            algorithm,
            state: State::Ready,
        })
    }

    /// Process one chunk of input and return whatever output is ready.
    ///
    /// Block ciphers emit whole blocks only, so the result may be shorter
    /// than `input` (or empty).
    ///
    /// # Errors
    ///
    /// [`CryptoError::Finalized`] after `finalize`, otherwise the provider's
    /// status. Output from a failed call is never returned.
    pub fn update(&mut self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.ensure_ready()?;
        let provider = self.provider;
        let context = &mut self.context;
        let capacity = provider.output_size_estimate(context, input.len(), false);
        negotiate(capacity, |output| provider.update_context(context, input, output))
    }

    /// Flush buffered input and finish the stream.
    ///
    /// The cryptor is finalized afterwards even if this call fails.
    ///
    /// # Errors
    ///
    /// [`CryptoError::Finalized`] on a second call, `AlignmentError` for
    /// unaligned input without padding, `DecodeError` for bad padding.
    pub fn finalize(&mut self) -> Result<Vec<u8>, CryptoError> {
        self.ensure_ready()?;
        self.state = State::Finalized;
        let provider = self.provider;
        let context = &mut self.context;
        let capacity = provider.output_size_estimate(context, 0, true);
        negotiate(capacity, |output| provider.finalize_context(context, output))
    }

    /// Feed `input` and finalize in one step.
    ///
    /// # Errors
    ///
    /// Same as [`Cryptor::update`] followed by [`Cryptor::finalize`].
    pub fn process(&mut self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut output = self.update(input)?;
        let mut tail = match self.finalize() {
            Ok(tail) => tail,
            Err(err) => {
                output.zeroize();
                return Err(err);
            }
        };
        output.extend_from_slice(&tail);
        tail.zeroize();
        Ok(output)
    }

    /// Re-prime the context with a new IV, keeping the key, and make the
    /// cryptor usable again.
    ///
    /// # Errors
    ///
    /// Returns the provider's status; the cryptor state is left unchanged.
    pub fn reset(&mut self, iv: Option<&[u8]>) -> Result<(), CryptoError> {
        StatusCode::classify(self.provider.reset_context(&mut self.context, iv)).check()?;
        self.state = State::Ready;
        debug!(algorithm = ?self.algorithm, "cryptor reset");
        Ok(())
    }

    /// Direction this cryptor was created for.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Algorithm this cryptor was created for.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns `true` once `finalize` has run and no `reset` followed.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        matches!(self.state, State::Finalized)
    }

    fn ensure_ready(&self) -> Result<(), CryptoError> {
        match self.state {
            State::Ready => Ok(()),
            State::Finalized => Err(CryptoError::Finalized),
        }
    }
}

impl<P: CipherProvider> Drop for Cryptor<'_, P> {
    fn drop(&mut self) {
        self.provider.release_context(&mut self.context);
        if let Some(memory) = self.memory.as_mut() {
            memory.zeroize();
            memory.shrink_to_fit();
        }
        trace!(algorithm = ?self.algorithm, "cryptor released");
    }
}

fn creation_error(status: RawStatus) -> CryptoError {
    CryptoError::ContextCreation(StatusCode::classify(status))
}
