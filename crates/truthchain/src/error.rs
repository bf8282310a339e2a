//! Error types for registry operations.

use thiserror::Error;

use truthchain_core::{CoreError, Fingerprint, Identity, TransitionError, ValidationError};
use truthchain_store::StoreError;

/// Broad classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The target state does not allow the operation.
    Precondition,
    /// The caller is not the permitted identity.
    Authorization,
    /// Caller input was rejected before touching state.
    Validation,
    /// A bounded counter would overflow.
    ResourceExhaustion,
    /// A signature or signed intent failed to check out.
    Authentication,
    /// The storage layer failed.
    Storage,
    /// The registry configuration is unusable.
    Configuration,
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry is already initialized")]
    AlreadyInitialized,

    #[error("registry is not initialized")]
    RegistryNotInitialized,

    #[error("document {fingerprint} is already registered")]
    DuplicateDocument { fingerprint: Fingerprint },

    #[error("document {fingerprint} not found")]
    DocumentNotFound { fingerprint: Fingerprint },

    #[error("unauthorized: caller {caller} is not {required}")]
    Unauthorized { caller: Identity, required: Identity },

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

    #[error("no change detected: {fingerprint} already has current hash {current}")]
    NoChangeDetected {
        fingerprint: Fingerprint,
        current: Fingerprint,
    },

    #[error("counter overflow: {counter}")]
    CounterOverflow { counter: &'static str },

    /// Signature or intent check failed.
    #[error("authentication failed: {0}")]
    Authentication(#[from] CoreError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// The taxonomy bucket this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RegistryError::AlreadyInitialized
            | RegistryError::RegistryNotInitialized
            | RegistryError::DuplicateDocument { .. }
            | RegistryError::DocumentNotFound { .. } => ErrorCategory::Precondition,
            RegistryError::Unauthorized { .. } => ErrorCategory::Authorization,
            RegistryError::InvalidFingerprintLength { .. }
            | RegistryError::MetadataTooLong { .. }
            | RegistryError::InvalidHex { .. }
            | RegistryError::NoChangeDetected { .. } => ErrorCategory::Validation,
            RegistryError::CounterOverflow { .. } => ErrorCategory::ResourceExhaustion,
            RegistryError::Authentication(_) => ErrorCategory::Authentication,
            RegistryError::Store(_) => ErrorCategory::Storage,
            RegistryError::Config(_) => ErrorCategory::Configuration,
        }
    }
}

impl From<ValidationError> for RegistryError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidFingerprintLength { field, len } => {
                RegistryError::InvalidFingerprintLength { field, len }
            }
            ValidationError::MetadataTooLong { field, len, max } => {
                RegistryError::MetadataTooLong { field, len, max }
            }
            ValidationError::InvalidHex { field, reason } => {
                RegistryError::InvalidHex { field, reason }
            }
        }
    }
}

impl From<TransitionError> for RegistryError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Unauthorized { caller, required } => {
                RegistryError::Unauthorized { caller, required }
            }
            TransitionError::NoChangeDetected {
                fingerprint,
                current,
            } => RegistryError::NoChangeDetected {
                fingerprint,
                current,
            },
            TransitionError::CounterOverflow { counter } => {
                RegistryError::CounterOverflow { counter }
            }
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
