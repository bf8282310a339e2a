//! Error types for the Truth Chain Core.

use thiserror::Error;

use crate::crypto::{Fingerprint, Identity};

/// Core errors from signature checks and encoding.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signed intent does not match the requested operation")]
    IntentMismatch,

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Input validation failures. Rejected before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be exactly 32 bytes, got {len}")]
    InvalidFingerprintLength { field: &'static str, len: usize },

    #[error("{field} is {len} bytes, maximum is {max}")]
    MetadataTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{field} is not valid hex: {reason}")]
    InvalidHex { field: &'static str, reason: String },
}

/// A state transition on a record was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("unauthorized: caller {caller} is not the controlling authority {required}")]
    Unauthorized { caller: Identity, required: Identity },

    #[error("no change detected: {fingerprint} already has current hash {current}")]
    NoChangeDetected {
        fingerprint: Fingerprint,
        current: Fingerprint,
    },

    #[error("counter overflow: {counter}")]
    CounterOverflow { counter: &'static str },
}
