//! # Truth Chain Store
//!
//! Storage abstraction for the Truth Chain registry. Registry state lives in
//! an address-keyed map of versioned accounts behind the [`Store`] trait.
//!
//! ## Overview
//!
//! The store does not decide who may register. It offers two
//! primitives that the registry builds on:
//!
//! - **Create-if-absent**: a [`WriteOp::Create`] fails with
//!   [`CommitResult::Occupied`] when the address already holds an account.
//! - **Transition**: a [`WriteOp::Apply`] computes the new value from the
//!   value stored at commit time, and fails with [`CommitResult::Refused`]
//!   when the [`Transition`] does not allow it.
//!
//! A [`WriteBatch`] groups operations on distinct addresses and commits them
//! all-or-nothing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`Account`] - What lives at an address
//!
//! ## Usage
//!
//! ```rust,no_run
//! use truthchain_core::{Address, Identity, Registry};
//! use truthchain_store::{Account, SqliteStore, Store, WriteBatch};
//!
//! async fn example() {
//!     let store = SqliteStore::open("registry.db").unwrap();
//!
//!     let registry = Registry::new(Identity::from_bytes([1; 32]), 0);
//!     let batch = WriteBatch::new().create(Address::registry(), Account::Registry(registry));
//!     let result = store.commit(batch).await.unwrap();
//!     assert!(result.is_committed());
//! }
//! ```

pub mod account;
pub mod batch;
pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use account::{Account, Versioned};
pub use batch::{Transition, WriteBatch, WriteOp};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CommitResult, Store, StoreExt};
