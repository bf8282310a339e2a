//! Store trait: the abstract interface for registry persistence.
//!
//! This trait allows the registry to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use truthchain_core::{Address, DocumentRecord, Fingerprint, Namespace, Registry, TransitionError};

use crate::account::{Account, Versioned};
use crate::batch::WriteBatch;
use crate::error::Result;

/// Outcome of committing a batch.
///
/// Anything other than `Committed` means nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// Every op in the batch was applied. The written values, in op order.
    Committed { written: Vec<Versioned<Account>> },
    /// A `Create` targeted an address that already holds an account.
    Occupied { address: Address },
    /// An `Apply` targeted an empty address.
    Missing { address: Address },
    /// An `Apply` transition refused the stored account.
    Refused {
        address: Address,
        reason: TransitionError,
    },
}

impl CommitResult {
    /// Whether the batch was applied.
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitResult::Committed { .. })
    }
}

/// The Store trait: async interface for address-keyed account persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Atomicity
///
/// Each [`Store::commit`] is applied atomically: transitions are computed from
/// the stored values, preconditions are checked, and all writes are applied
/// under one lock (or one SQLite transaction). Concurrent commits touching the
/// same address are totally ordered.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load the account at `address`, with its version.
    async fn load(&self, address: &Address) -> Result<Option<Versioned<Account>>>;

    /// Apply a batch all-or-nothing.
    ///
    /// Returns `Err` only for storage failures or an invalid batch; failed
    /// preconditions are reported through [`CommitResult`].
    async fn commit(&self, batch: WriteBatch) -> Result<CommitResult>;

    /// All document records, ordered by registration fingerprint.
    async fn scan_documents(&self) -> Result<Vec<DocumentRecord>>;

    /// Number of accounts in a namespace.
    async fn count(&self, namespace: Namespace) -> Result<u64>;
}

/// Typed loads on top of [`Store`].
pub trait StoreExt: Store {
    /// Load the registry singleton.
    fn load_registry(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<Versioned<Registry>>>> + Send;

    /// Load the record registered under `fingerprint`.
    fn load_document(
        &self,
        fingerprint: Fingerprint,
    ) -> impl std::future::Future<Output = Result<Option<Versioned<DocumentRecord>>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn load_registry(&self) -> Result<Option<Versioned<Registry>>> {
        self.load(&Address::registry())
            .await?
            .map(|v| v.try_map(Account::into_registry))
            .transpose()
    }

    async fn load_document(
        &self,
        fingerprint: Fingerprint,
    ) -> Result<Option<Versioned<DocumentRecord>>> {
        self.load(&Address::document(&fingerprint))
            .await?
            .map(|v| v.try_map(Account::into_document))
            .transpose()
    }
}
