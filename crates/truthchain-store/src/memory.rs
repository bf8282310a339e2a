//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use truthchain_core::{Address, DocumentRecord, Namespace};

use crate::account::{Account, Versioned};
use crate::batch::{Resolution, WriteBatch};
use crate::error::{Result, StoreError};
use crate::traits::{CommitResult, Store};

type Accounts = HashMap<Address, Versioned<Account>>;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    accounts: RwLock<Accounts>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Accounts>> {
        self.accounts
            .read()
            .map_err(|e| StoreError::Task(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Accounts>> {
        self.accounts
            .write()
            .map_err(|e| StoreError::Task(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self, address: &Address) -> Result<Option<Versioned<Account>>> {
        let accounts = self.read()?;
        Ok(accounts.get(address).cloned())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitResult> {
        batch.validate()?;

        let mut accounts = self.write()?;

        let written = match batch.resolve(|address| Ok(accounts.get(address).cloned()))? {
            Resolution::Ready(written) => written,
            Resolution::Rejected(outcome) => return Ok(outcome),
        };

        for (op, value) in batch.ops().iter().zip(&written) {
            accounts.insert(*op.address(), value.clone());
        }

        Ok(CommitResult::Committed { written })
    }

    async fn scan_documents(&self) -> Result<Vec<DocumentRecord>> {
        let accounts = self.read()?;
        let mut docs: Vec<DocumentRecord> = accounts
            .values()
            .filter_map(|slot| match &slot.value {
                Account::Document(doc) => Some(doc.clone()),
                Account::Registry(_) => None,
            })
            .collect();
        docs.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));
        Ok(docs)
    }

    async fn count(&self, namespace: Namespace) -> Result<u64> {
        let accounts = self.read()?;
        Ok(accounts
            .values()
            .filter(|slot| slot.value.namespace() == namespace)
            .count() as u64)
    }
}
