//! Registry events and query results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use truthchain_core::{DocumentRecord, Fingerprint, Identity};

/// Emitted after each successful registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    RegistryInitialized {
        authority: Identity,
    },
    DocumentRegistered {
        fingerprint: Fingerprint,
        page_number: u32,
        registered_at: i64,
        registrar: Identity,
    },
    ModificationFlagged {
        fingerprint: Fingerprint,
        new_hash: Fingerprint,
        modification_count: u32,
        flagged_at: i64,
    },
    VerificationPerformed {
        fingerprint: Fingerprint,
        matches: bool,
        is_modified: bool,
    },
}

/// Aggregate view over all registered documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// The registry's registration counter.
    pub document_count: u64,
    /// Records flagged at least once.
    pub modified_count: u64,
    /// Distinct CATS numbers across all records.
    pub unique_cats: u64,
    /// Record count per document type.
    pub document_types: BTreeMap<String, u64>,
}

/// One page of a document listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPage {
    pub items: Vec<DocumentRecord>,
    /// Matching records across all pages.
    pub total: u64,
}
