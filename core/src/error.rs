//! Error types for request building and execution.
//!
//! # Design
//! Every failure a `perform` call can end with is a `NetworkError` variant.
//! Validator rejection is not here: it only moves the pipeline to the
//! restore stage. A missing restorer is not here either; it surfaces as
//! `Ok(None)` because it means "nothing to deliver", not "something broke".
//!
//! Collaborator failures (transport, restorer, codecs) are boxed so callers
//! can plug in any implementation without widening this enum.

use thiserror::Error;

/// Boxed error produced by pluggable collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The transport could not complete the exchange (connectivity, timeout,
/// malformed request). Never retried by the pipeline.
#[derive(Debug, Error)]
#[error("transport failed: {0}")]
pub struct TransportError(#[source] pub BoxError);

impl TransportError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

/// A caller payload could not be serialized into a request body.
#[derive(Debug, Error)]
#[error("failed to encode request body: {0}")]
pub struct EncodeError(#[source] pub BoxError);

impl EncodeError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

/// A response body did not match the expected type.
#[derive(Debug, Error)]
#[error("failed to decode response body: {0}")]
pub struct DecodeError(#[source] pub BoxError);

impl DecodeError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

/// Terminal failure of a `perform` call.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The restorer ran after a rejected response and failed; no retry was
    /// attempted.
    #[error("request restore failed: {0}")]
    RestoreFailed(#[source] BoxError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
