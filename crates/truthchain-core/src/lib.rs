//! # Truth Chain Core
//!
//! Pure primitives for the Truth Chain registry: fingerprints, identities,
//! deterministic addresses, and the registry/document records.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over the registry's data structures and the state transitions they allow.
//!
//! ## Key Types
//!
//! - [`Fingerprint`] - 32-byte content digest identifying a document
//! - [`Address`] - Storage location derived from a namespace tag and key bytes
//! - [`Registry`] - The singleton registry record
//! - [`DocumentRecord`] - Per-fingerprint record with one-level hash history
//! - [`Caller`] - An authenticated identity presenting an operation
//!
//! ## Canonicalization
//!
//! Operation intents are signed over deterministic CBOR. See [`canonical`] module.

pub mod address;
pub mod authority;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod record;
pub mod validation;

pub use address::{Address, Namespace};
pub use authority::{AuthorityPolicy, Caller, OperationIntent, RegistrationPolicy};
pub use canonical::{intent_bytes, signed_message};
pub use crypto::{Ed25519Signature, Fingerprint, Identity, Keypair};
pub use error::{CoreError, TransitionError, ValidationError};
pub use record::{DocumentMetadata, DocumentRecord, Registry};
pub use validation::{parse_fingerprint, validate_metadata};
