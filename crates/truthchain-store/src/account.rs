//! Accounts: the values stored at addresses.

use serde::{Deserialize, Serialize};

use truthchain_core::{DocumentRecord, Namespace, Registry};

use crate::error::{Result, StoreError};

/// What lives at an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Account {
    Registry(Registry),
    Document(DocumentRecord),
}

impl Account {
    /// The namespace this account belongs in.
    pub fn namespace(&self) -> Namespace {
        match self {
            Account::Registry(_) => Namespace::Registry,
            Account::Document(_) => Namespace::Document,
        }
    }

    /// Unwrap a registry account.
    pub fn into_registry(self) -> Result<Registry> {
        match self {
            Account::Registry(registry) => Ok(registry),
            Account::Document(doc) => Err(StoreError::InvalidData(format!(
                "expected registry account, found document {}",
                doc.fingerprint
            ))),
        }
    }

    /// Unwrap a document account.
    pub fn into_document(self) -> Result<DocumentRecord> {
        match self {
            Account::Document(doc) => Ok(doc),
            Account::Registry(_) => Err(StoreError::InvalidData(
                "expected document account, found registry".into(),
            )),
        }
    }

    /// Encode for persistence.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from persisted bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// A stored value together with its write version.
///
/// Versions start at 1 on create and increase by one on every applied transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

impl<T> Versioned<T> {
    /// Transform the value fallibly, keeping the version.
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<Versioned<U>> {
        Ok(Versioned {
            version: self.version,
            value: f(self.value)?,
        })
    }
}
