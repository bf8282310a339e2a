//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for the registry. It uses rusqlite
//! with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::debug;

use truthchain_core::{Address, DocumentRecord, Namespace};

use crate::account::{Account, Versioned};
use crate::batch::{Resolution, WriteBatch, WriteOp};
use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{CommitResult, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn load_at(conn: &Connection, address: &Address) -> Result<Option<Versioned<Account>>> {
    let row: Option<(i64, Vec<u8>)> = conn
        .query_row(
            "SELECT version, body FROM accounts WHERE address = ?1",
            params![address.as_bytes().as_slice()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    row.map(|(version, body)| {
        Ok(Versioned {
            version: u64::try_from(version)
                .map_err(|_| StoreError::InvalidData(format!("negative version {}", version)))?,
            value: Account::from_bytes(&body)?,
        })
    })
    .transpose()
}

fn apply_batch(conn: &mut Connection, batch: &WriteBatch) -> Result<CommitResult> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let written = match batch.resolve(|address| load_at(&tx, address))? {
        Resolution::Ready(written) => written,
        // Dropping the transaction rolls it back.
        Resolution::Rejected(outcome) => return Ok(outcome),
    };

    let now = now_millis();
    for (op, value) in batch.ops().iter().zip(&written) {
        let body = value.value.to_bytes()?;
        let version = value.version as i64;
        match op {
            WriteOp::Create { address, .. } => {
                tx.execute(
                    "INSERT INTO accounts (address, namespace, version, body, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    params![
                        address.as_bytes().as_slice(),
                        value.value.namespace().tag(),
                        version,
                        body,
                        now
                    ],
                )?;
            }
            WriteOp::Apply { address, .. } => {
                tx.execute(
                    "UPDATE accounts SET version = ?2, body = ?3, updated_at = ?4
                     WHERE address = ?1",
                    params![address.as_bytes().as_slice(), version, body, now],
                )?;
            }
        }
    }

    tx.commit()?;
    debug!(ops = written.len(), "batch committed");
    Ok(CommitResult::Committed { written })
}

#[async_trait]
impl Store for SqliteStore {
    async fn load(&self, address: &Address) -> Result<Option<Versioned<Account>>> {
        let address = *address;
        self.run(move |conn| load_at(conn, &address)).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitResult> {
        batch.validate()?;
        self.run(move |conn| apply_batch(conn, &batch)).await
    }

    async fn scan_documents(&self) -> Result<Vec<DocumentRecord>> {
        let mut docs = self
            .run(|conn| {
                let mut stmt = conn.prepare("SELECT body FROM accounts WHERE namespace = ?1")?;
                let bodies = stmt
                    .query_map(params![Namespace::Document.tag()], |row| {
                        row.get::<_, Vec<u8>>(0)
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                bodies
                    .iter()
                    .map(|body| Account::from_bytes(body)?.into_document())
                    .collect::<Result<Vec<_>>>()
            })
            .await?;
        docs.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));
        Ok(docs)
    }

    async fn count(&self, namespace: Namespace) -> Result<u64> {
        self.run(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM accounts WHERE namespace = ?1",
                params![namespace.tag()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Transition;
    use crate::traits::StoreExt;
    use truthchain_core::{DocumentMetadata, Fingerprint, Identity, Registry, TransitionError};

    fn registry() -> Registry {
        Registry::new(Identity::from_bytes([1; 32]), 1_700_000_000)
    }

    fn owner() -> Identity {
        Identity::from_bytes([2; 32])
    }

    fn document(content: &[u8]) -> DocumentRecord {
        DocumentRecord::new(
            Fingerprint::digest(content),
            DocumentMetadata::new("Court Filing", "bafy", 4, "Filing").with_cats_number("CATS-1"),
            owner(),
            owner(),
            1_700_000_001,
        )
    }

    fn register(doc: &DocumentRecord) -> WriteBatch {
        WriteBatch::new()
            .apply(Address::registry(), Transition::RecordRegistration)
            .create(doc.address(), Account::Document(doc.clone()))
    }

    async fn initialized(store: &SqliteStore) {
        let batch = WriteBatch::new().create(Address::registry(), Account::Registry(registry()));
        assert!(store.commit(batch).await.unwrap().is_committed());
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let store = SqliteStore::open_memory().unwrap();
        initialized(&store).await;

        let loaded = store.load_registry().await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.value, registry());
    }

    #[tokio::test]
    async fn test_occupied_and_missing() {
        let store = SqliteStore::open_memory().unwrap();
        let doc = document(b"page");
        assert_eq!(
            store.commit(register(&doc)).await.unwrap(),
            CommitResult::Missing {
                address: Address::registry()
            }
        );

        initialized(&store).await;
        let create = WriteBatch::new().create(Address::registry(), Account::Registry(registry()));
        assert_eq!(
            store.commit(create).await.unwrap(),
            CommitResult::Occupied {
                address: Address::registry()
            }
        );
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let store = SqliteStore::open_memory().unwrap();
        initialized(&store).await;

        let doc = document(b"page");
        assert!(store.commit(register(&doc)).await.unwrap().is_committed());

        // The registry bump resolves fine, but the create does not, so the
        // bump must not land either.
        assert_eq!(
            store.commit(register(&doc)).await.unwrap(),
            CommitResult::Occupied {
                address: doc.address()
            }
        );

        let registry = store.load_registry().await.unwrap().unwrap();
        assert_eq!(registry.version, 2);
        assert_eq!(registry.value.document_count, 1);
    }

    #[tokio::test]
    async fn test_flag_transition_rotates_stored_record() {
        let store = SqliteStore::open_memory().unwrap();
        initialized(&store).await;
        let doc = document(b"page");
        store.commit(register(&doc)).await.unwrap();

        let edited = Fingerprint::digest(b"page, edited");
        let flag = |new_hash: Fingerprint| {
            WriteBatch::new().apply(
                doc.address(),
                Transition::FlagModification {
                    caller: owner(),
                    new_hash,
                    at: 9,
                },
            )
        };

        let written = match store.commit(flag(edited)).await.unwrap() {
            CommitResult::Committed { written } => written,
            other => panic!("unexpected outcome: {:?}", other),
        };
        let record = written[0].value.clone().into_document().unwrap();
        assert_eq!(written[0].version, 2);
        assert_eq!(record.previous_hash, Some(doc.fingerprint));
        assert_eq!(record.current_hash, edited);
        assert_eq!(record.last_modified_at, Some(9));

        assert_eq!(
            store.commit(flag(edited)).await.unwrap(),
            CommitResult::Refused {
                address: doc.address(),
                reason: TransitionError::NoChangeDetected {
                    fingerprint: doc.fingerprint,
                    current: edited,
                },
            }
        );
        assert_eq!(
            store.load_document(doc.fingerprint).await.unwrap().unwrap(),
            Versioned {
                version: 2,
                value: record,
            }
        );
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.db");
        let doc = document(b"persisted page");

        {
            let store = SqliteStore::open(&path).unwrap();
            initialized(&store).await;
            store.commit(register(&doc)).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.load_document(doc.fingerprint).await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.value, doc);
        assert_eq!(store.load_registry().await.unwrap().unwrap().value.document_count, 1);
        assert_eq!(store.scan_documents().await.unwrap(), vec![doc]);
        assert_eq!(store.count(Namespace::Document).await.unwrap(), 1);
        assert_eq!(store.count(Namespace::Registry).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_batch_is_an_error() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(matches!(
            store.commit(WriteBatch::new()).await,
            Err(StoreError::InvalidBatch(_))
        ));
    }
}
