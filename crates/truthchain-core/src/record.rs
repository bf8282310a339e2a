//! Registry and document records.
//!
//! A [`DocumentRecord`] is created once and never deleted. The only mutation it
//! accepts is [`DocumentRecord::flag_modification`], which rotates the current
//! hash into a one-level history slot.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::crypto::{Fingerprint, Identity};
use crate::error::TransitionError;

/// Maximum length of `document_type` in bytes (e.g. "FD-302", "Flight Log").
pub const MAX_DOCUMENT_TYPE_LEN: usize = 32;

/// Maximum length of `cats_number` in bytes.
pub const MAX_CATS_NUMBER_LEN: usize = 64;

/// Maximum length of `content_locator` in bytes (an IPFS CID fits comfortably).
pub const MAX_CONTENT_LOCATOR_LEN: usize = 64;

/// Maximum length of `title` in bytes.
pub const MAX_TITLE_LEN: usize = 128;

/// The registry singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Identity permitted to perform privileged actions.
    pub authority: Identity,

    /// Number of successful registrations. Never decreases.
    pub document_count: u64,

    /// When the registry was created (Unix ms).
    pub initialized_at: i64,
}

impl Registry {
    /// Create a fresh registry controlled by `authority`.
    pub fn new(authority: Identity, now: i64) -> Self {
        Self {
            authority,
            document_count: 0,
            initialized_at: now,
        }
    }

    /// The registry's storage address.
    pub fn address() -> Address {
        Address::registry()
    }

    /// Count one more registration.
    pub fn record_registration(&mut self) -> Result<(), TransitionError> {
        self.document_count =
            self.document_count
                .checked_add(1)
                .ok_or(TransitionError::CounterOverflow {
                    counter: "document_count",
                })?;
        Ok(())
    }
}

/// Descriptive metadata supplied at registration. Immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document type, e.g. "FD-302", "Deposition".
    pub document_type: String,

    /// Optional CATS (Consolidated Asset Tracking System) number.
    pub cats_number: Option<String>,

    /// Opaque reference into an external content store, e.g. an IPFS CID.
    pub content_locator: String,

    /// Page number in the overall document set.
    pub page_number: u32,

    /// Document title or description.
    pub title: String,
}

impl DocumentMetadata {
    /// Create metadata without a CATS number.
    pub fn new(
        document_type: impl Into<String>,
        content_locator: impl Into<String>,
        page_number: u32,
        title: impl Into<String>,
    ) -> Self {
        Self {
            document_type: document_type.into(),
            cats_number: None,
            content_locator: content_locator.into(),
            page_number,
            title: title.into(),
        }
    }

    /// Attach a CATS number.
    pub fn with_cats_number(mut self, cats_number: impl Into<String>) -> Self {
        self.cats_number = Some(cats_number.into());
        self
    }
}

/// Per-fingerprint record with a one-level modification history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Registration fingerprint. Immutable; the record's address is derived from it.
    pub fingerprint: Fingerprint,

    /// Latest known content fingerprint.
    pub current_hash: Fingerprint,

    /// The current hash before the most recent flagged modification.
    pub previous_hash: Option<Fingerprint>,

    /// Descriptive metadata.
    pub metadata: DocumentMetadata,

    /// Set by the first successful flag and never reset.
    pub is_modified: bool,

    /// Number of successful flags.
    pub modification_count: u32,

    /// Identity permitted to flag modifications on this record.
    pub controlling_authority: Identity,

    /// Identity that registered the record.
    pub registrar: Identity,

    /// When the record was registered (Unix ms).
    pub registered_at: i64,

    /// When the latest modification was flagged (Unix ms).
    pub last_modified_at: Option<i64>,
}

impl DocumentRecord {
    /// Create an unmodified record for `fingerprint`.
    pub fn new(
        fingerprint: Fingerprint,
        metadata: DocumentMetadata,
        registrar: Identity,
        controlling_authority: Identity,
        now: i64,
    ) -> Self {
        Self {
            fingerprint,
            current_hash: fingerprint,
            previous_hash: None,
            metadata,
            is_modified: false,
            modification_count: 0,
            controlling_authority,
            registrar,
            registered_at: now,
            last_modified_at: None,
        }
    }

    /// The record's storage address.
    pub fn address(&self) -> Address {
        Address::document(&self.fingerprint)
    }

    /// Whether `fingerprint` matches the live content hash.
    ///
    /// Compares against `current_hash`, never the immutable identity.
    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        self.current_hash == *fingerprint
    }

    /// Check that `caller` may flag this record.
    pub fn ensure_controller(&self, caller: &Identity) -> Result<(), TransitionError> {
        if *caller != self.controlling_authority {
            return Err(TransitionError::Unauthorized {
                caller: *caller,
                required: self.controlling_authority,
            });
        }
        Ok(())
    }

    /// Record a detected content change.
    ///
    /// All checks run before any field is written, so a refused flag leaves
    /// the record untouched.
    pub fn flag_modification(
        &mut self,
        new_hash: Fingerprint,
        now: i64,
    ) -> Result<(), TransitionError> {
        if new_hash == self.current_hash {
            return Err(TransitionError::NoChangeDetected {
                fingerprint: self.fingerprint,
                current: self.current_hash,
            });
        }

        let count = self
            .modification_count
            .checked_add(1)
            .ok_or(TransitionError::CounterOverflow {
                counter: "modification_count",
            })?;

        self.previous_hash = Some(self.current_hash);
        self.current_hash = new_hash;
        self.is_modified = true;
        self.modification_count = count;
        self.last_modified_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn make_record(data: &[u8]) -> (DocumentRecord, Identity) {
        let keypair = Keypair::from_seed(&[0x11; 32]);
        let identity = keypair.identity();
        let record = DocumentRecord::new(
            Fingerprint::digest(data),
            DocumentMetadata::new("FD-302", "bafy-test", 1, "T1"),
            identity,
            identity,
            1_000,
        );
        (record, identity)
    }

    #[test]
    fn test_new_record_is_unmodified() {
        let (record, _) = make_record(b"hello world");
        assert_eq!(record.current_hash, record.fingerprint);
        assert_eq!(record.previous_hash, None);
        assert!(!record.is_modified);
        assert_eq!(record.modification_count, 0);
        assert_eq!(record.last_modified_at, None);
        assert!(record.matches(&Fingerprint::digest(b"hello world")));
    }

    #[test]
    fn test_flag_rotates_one_level() {
        let (mut record, _) = make_record(b"hello world");
        let h0 = record.fingerprint;
        let h1 = Fingerprint::digest(b"goodbye");
        let h2 = Fingerprint::digest(b"again");

        record.flag_modification(h1, 2_000).unwrap();
        assert_eq!(record.current_hash, h1);
        assert_eq!(record.previous_hash, Some(h0));
        assert_eq!(record.modification_count, 1);
        assert!(record.is_modified);
        assert_eq!(record.last_modified_at, Some(2_000));
        assert!(!record.matches(&h0));

        record.flag_modification(h2, 3_000).unwrap();
        assert_eq!(record.current_hash, h2);
        assert_eq!(record.previous_hash, Some(h1));
        assert_eq!(record.modification_count, 2);
        // The identity never rotates.
        assert_eq!(record.fingerprint, h0);
    }

    #[test]
    fn test_flag_same_hash_is_refused() {
        let (mut record, _) = make_record(b"hello world");
        let before = record.clone();
        let err = record
            .flag_modification(record.current_hash, 2_000)
            .unwrap_err();
        assert!(matches!(err, TransitionError::NoChangeDetected { .. }));
        assert_eq!(record, before);
    }

    #[test]
    fn test_flag_overflow_leaves_record_unchanged() {
        let (mut record, _) = make_record(b"hello world");
        record.modification_count = u32::MAX;
        let before = record.clone();

        let err = record
            .flag_modification(Fingerprint::digest(b"next"), 2_000)
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::CounterOverflow {
                counter: "modification_count"
            }
        );
        assert_eq!(record, before);
    }

    #[test]
    fn test_flag_back_to_original_is_a_change() {
        let (mut record, _) = make_record(b"hello world");
        let h0 = record.fingerprint;
        record
            .flag_modification(Fingerprint::digest(b"x"), 2_000)
            .unwrap();
        record.flag_modification(h0, 3_000).unwrap();
        assert!(record.matches(&h0));
        assert!(record.is_modified);
        assert_eq!(record.modification_count, 2);
    }

    #[test]
    fn test_ensure_controller() {
        let (record, owner) = make_record(b"hello world");
        assert!(record.ensure_controller(&owner).is_ok());

        let stranger = Keypair::from_seed(&[0x22; 32]).identity();
        assert_eq!(
            record.ensure_controller(&stranger),
            Err(TransitionError::Unauthorized {
                caller: stranger,
                required: owner
            })
        );
    }

    #[test]
    fn test_registry_counter_overflow() {
        let mut registry = Registry::new(Identity::from_bytes([1; 32]), 0);
        registry.record_registration().unwrap();
        assert_eq!(registry.document_count, 1);

        registry.document_count = u64::MAX;
        assert!(registry.record_registration().is_err());
        assert_eq!(registry.document_count, u64::MAX);
    }

    #[test]
    fn test_record_address_uses_fingerprint() {
        let (mut record, _) = make_record(b"hello world");
        let addr = record.address();
        record
            .flag_modification(Fingerprint::digest(b"other"), 2_000)
            .unwrap();
        assert_eq!(record.address(), addr);
        assert_eq!(addr, Address::document(&record.fingerprint));
    }
}
