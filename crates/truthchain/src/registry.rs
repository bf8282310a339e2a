//! The document registry: registration, verification and modification flagging
//! on top of a [`Store`].
//!
//! Every write is one store commit. Counter bumps and hash rotations are
//! submitted as [`Transition`]s, which the store applies to the value it holds
//! at commit time, so concurrent writers never lose an increment and never
//! have to retry.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use truthchain_core::{
    parse_fingerprint, validate_metadata, Address, Caller, DocumentMetadata, DocumentRecord,
    Fingerprint, OperationIntent, Registry, TransitionError,
};
use truthchain_store::{
    Account, CommitResult, Store, StoreError, StoreExt, Transition, Versioned, WriteBatch,
};

use crate::clock::{Clock, SystemClock};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::events::{DocumentPage, RegistryEvent, RegistryStats};

/// The registry service.
///
/// Cheap to share: wrap it in an `Arc` and call it from as many tasks as
/// needed. The store serializes commits.
pub struct DocumentRegistry<S: Store> {
    store: Arc<S>,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<RegistryEvent>,
}

impl<S: Store> DocumentRegistry<S> {
    /// Create a registry service over `store`.
    pub fn new(store: S, config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(config.event_capacity);
        Ok(Self {
            store: Arc::new(store),
            config,
            clock: Arc::new(SystemClock),
            events,
        })
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The storage backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Subscribe to registry events.
    ///
    /// Only events emitted after subscribing are delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: RegistryEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create the registry singleton with `caller` as its authority.
    ///
    /// Not idempotent: a second call fails with `AlreadyInitialized`.
    pub async fn initialize_registry(&self, caller: &Caller) -> Result<Registry> {
        caller.ensure_permits(&OperationIntent::InitializeRegistry)?;

        let registry = Registry::new(caller.identity(), self.clock.now_millis());
        let batch = WriteBatch::new().create(Address::registry(), Account::Registry(registry.clone()));

        match self.store.commit(batch).await? {
            CommitResult::Committed { .. } => {
                info!(authority = %registry.authority, "registry initialized");
                self.emit(RegistryEvent::RegistryInitialized {
                    authority: registry.authority,
                });
                Ok(registry)
            }
            CommitResult::Occupied { .. } => Err(RegistryError::AlreadyInitialized),
            other => Err(unexpected(other)),
        }
    }

    /// Register a document under its fingerprint.
    ///
    /// Inputs are validated before any state is read. The record is created
    /// and the registry counter bumped in one atomic commit; the record
    /// address being occupied means the fingerprint was already registered.
    pub async fn register_document(
        &self,
        caller: &Caller,
        fingerprint: &[u8],
        metadata: DocumentMetadata,
    ) -> Result<DocumentRecord> {
        let fingerprint = parse_fingerprint("fingerprint", fingerprint)?;
        validate_metadata(&metadata)?;
        caller.ensure_permits(&OperationIntent::RegisterDocument {
            fingerprint,
            metadata: metadata.clone(),
        })?;

        let registrar = caller.identity();

        // The authority is fixed at initialization, so a snapshot is enough
        // for the policy checks. The counter is bumped by the store.
        let registry = self.registry().await?;
        if let Err(err) = self
            .config
            .registration
            .ensure_may_register(&registry, &registrar)
        {
            warn!(caller = %registrar, fingerprint = %fingerprint, "registration refused");
            return Err(err.into());
        }

        let controller = self
            .config
            .authority_policy
            .controlling_authority(&registry, &registrar);
        let record = DocumentRecord::new(
            fingerprint,
            metadata,
            registrar,
            controller,
            self.clock.now_millis(),
        );

        // Counter first: an exhausted counter is reported before a duplicate.
        let batch = WriteBatch::new()
            .apply(Address::registry(), Transition::RecordRegistration)
            .create(record.address(), Account::Document(record.clone()));

        match self.store.commit(batch).await? {
            CommitResult::Committed { .. } => {
                info!(
                    fingerprint = %fingerprint,
                    registrar = %registrar,
                    page = record.metadata.page_number,
                    "document registered"
                );
                self.emit(RegistryEvent::DocumentRegistered {
                    fingerprint,
                    page_number: record.metadata.page_number,
                    registered_at: record.registered_at,
                    registrar,
                });
                Ok(record)
            }
            CommitResult::Occupied { .. } => {
                debug!(fingerprint = %fingerprint, "already registered");
                Err(RegistryError::DuplicateDocument { fingerprint })
            }
            CommitResult::Missing { .. } => Err(RegistryError::RegistryNotInitialized),
            CommitResult::Refused { reason, .. } => {
                warn!(fingerprint = %fingerprint, %reason, "registration refused");
                Err(reason.into())
            }
        }
    }

    /// Record that the document registered under `fingerprint` now hashes to
    /// `new_hash`.
    ///
    /// Only the record's controlling authority may flag it. On success the
    /// old current hash moves to `previous_hash` and the count goes up by one.
    pub async fn flag_modification(
        &self,
        caller: &Caller,
        fingerprint: &[u8],
        new_hash: &[u8],
    ) -> Result<DocumentRecord> {
        let fingerprint = parse_fingerprint("fingerprint", fingerprint)?;
        let new_hash = parse_fingerprint("new_hash", new_hash)?;
        caller.ensure_permits(&OperationIntent::FlagModification {
            fingerprint,
            new_hash,
        })?;

        let now = self.clock.now_millis();
        let batch = WriteBatch::new().apply(
            Address::document(&fingerprint),
            Transition::FlagModification {
                caller: caller.identity(),
                new_hash,
                at: now,
            },
        );

        match self.store.commit(batch).await? {
            CommitResult::Committed { written } => {
                let record = single_document(written)?;
                info!(
                    fingerprint = %fingerprint,
                    new_hash = %new_hash,
                    count = record.modification_count,
                    "modification flagged"
                );
                self.emit(RegistryEvent::ModificationFlagged {
                    fingerprint,
                    new_hash,
                    modification_count: record.modification_count,
                    flagged_at: now,
                });
                Ok(record)
            }
            CommitResult::Missing { .. } => Err(RegistryError::DocumentNotFound { fingerprint }),
            CommitResult::Refused { reason, .. } => {
                if let TransitionError::Unauthorized { .. } = reason {
                    warn!(caller = %caller.identity(), fingerprint = %fingerprint, "flag refused");
                } else {
                    debug!(fingerprint = %fingerprint, %reason, "flag refused");
                }
                Err(reason.into())
            }
            other => Err(unexpected(other)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Check whether `fingerprint` matches the current content hash of the
    /// document registered under it.
    ///
    /// An unknown fingerprint is `DocumentNotFound`, never `false`.
    pub async fn verify_document(&self, fingerprint: &[u8]) -> Result<bool> {
        let fingerprint = parse_fingerprint("fingerprint", fingerprint)?;
        let record = self.document(&fingerprint).await?;
        let matches = record.matches(&fingerprint);

        debug!(fingerprint = %fingerprint, matches, modified = record.is_modified, "verified");
        self.emit(RegistryEvent::VerificationPerformed {
            fingerprint,
            matches,
            is_modified: record.is_modified,
        });
        Ok(matches)
    }

    /// Snapshot of the registry singleton.
    pub async fn registry(&self) -> Result<Registry> {
        self.store
            .load_registry()
            .await?
            .map(|v| v.value)
            .ok_or(RegistryError::RegistryNotInitialized)
    }

    /// Snapshot of the record registered under `fingerprint`.
    pub async fn document(&self, fingerprint: &Fingerprint) -> Result<DocumentRecord> {
        self.store
            .load_document(*fingerprint)
            .await?
            .map(|v| v.value)
            .ok_or(RegistryError::DocumentNotFound {
                fingerprint: *fingerprint,
            })
    }

    /// Records carrying exactly this CATS number, ordered by fingerprint.
    pub async fn documents_by_cats(&self, cats_number: &str) -> Result<Vec<DocumentRecord>> {
        let docs = self.store.scan_documents().await?;
        Ok(docs
            .into_iter()
            .filter(|doc| doc.metadata.cats_number.as_deref() == Some(cats_number))
            .collect())
    }

    /// One page of records, ordered by fingerprint.
    ///
    /// Pages are zero-based. `document_type`, when given, keeps only records
    /// of that type, compared case-insensitively; `total` counts every match.
    pub async fn documents(
        &self,
        page: usize,
        limit: usize,
        document_type: Option<&str>,
    ) -> Result<DocumentPage> {
        let wanted = document_type.map(str::to_lowercase);
        let matching: Vec<DocumentRecord> = self
            .store
            .scan_documents()
            .await?
            .into_iter()
            .filter(|doc| match wanted {
                Some(ref t) => doc.metadata.document_type.to_lowercase() == *t,
                None => true,
            })
            .collect();

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.saturating_mul(limit))
            .take(limit)
            .collect();
        Ok(DocumentPage { items, total })
    }

    /// Aggregate statistics over every registered document.
    pub async fn stats(&self) -> Result<RegistryStats> {
        let registry = self.registry().await?;
        let docs = self.store.scan_documents().await?;

        let mut cats = BTreeSet::new();
        let mut document_types: BTreeMap<String, u64> = BTreeMap::new();
        let mut modified_count = 0;

        for doc in &docs {
            if doc.is_modified {
                modified_count += 1;
            }
            if let Some(ref number) = doc.metadata.cats_number {
                cats.insert(number.as_str());
            }
            *document_types
                .entry(doc.metadata.document_type.clone())
                .or_default() += 1;
        }

        Ok(RegistryStats {
            document_count: registry.document_count,
            modified_count,
            unique_cats: cats.len() as u64,
            document_types,
        })
    }
}

/// The record written by a single-op flag commit.
fn single_document(written: Vec<Versioned<Account>>) -> Result<DocumentRecord> {
    let account = written
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::InvalidData("commit wrote nothing".into()))?;
    Ok(account.value.into_document()?)
}

/// A commit outcome the submitted batch cannot produce.
fn unexpected(result: CommitResult) -> RegistryError {
    RegistryError::Store(StoreError::InvalidData(format!(
        "unexpected commit result: {:?}",
        result
    )))
}
