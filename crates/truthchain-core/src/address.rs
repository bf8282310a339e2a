//! Address derivation: where registry state lives.
//!
//! Every account in the store sits at an address computed from a namespace tag
//! and key bytes. Callers never choose addresses, so the same fingerprint always
//! lands on the same record and a second registration collides with the first.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Fingerprint;

/// Domain prefix mixed into every derivation.
const ADDRESS_DOMAIN: &[u8] = b"truthchain-address-v0:";

/// The namespace an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    /// The registry singleton. Takes no key material.
    Registry,
    /// A document record, keyed by its registration fingerprint.
    Document,
}

impl Namespace {
    /// The tag hashed into the address.
    pub const fn tag(self) -> &'static str {
        match self {
            Namespace::Registry => "registry",
            Namespace::Document => "document",
        }
    }

    /// Parse a tag back into a namespace.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "registry" => Some(Namespace::Registry),
            "document" => Some(Namespace::Document),
            _ => None,
        }
    }
}

/// A 32-byte storage address.
///
/// Derived from Blake3(domain || tag || ":" || key).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Derive an address from a namespace and key bytes.
    pub fn derive(namespace: Namespace, key: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ADDRESS_DOMAIN);
        hasher.update(namespace.tag().as_bytes());
        hasher.update(b":");
        hasher.update(key);
        Self(*hasher.finalize().as_bytes())
    }

    /// The registry singleton's address.
    pub fn registry() -> Self {
        Self::derive(Namespace::Registry, &[])
    }

    /// The address of the record registered under `fingerprint`.
    pub fn document(fingerprint: &Fingerprint) -> Self {
        Self::derive(Namespace::Document, fingerprint.as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
