//! # Truth Chain
//!
//! The unified API for the Truth Chain document registry: tamper-evident
//! fingerprints for document pages.
//!
//! ## Overview
//!
//! Each page is registered once under its SHA-256 fingerprint. The registry
//! then answers one question: does this content still match what was
//! registered? When the content changes, its controlling authority flags the
//! record, rotating the old hash into `previous_hash` and counting the change.
//!
//! - **Registry**: a singleton holding the authority identity and a
//!   registration counter
//! - **DocumentRecord**: one per fingerprint, at an address derived from it
//! - **Caller**: an identity that proved possession of its key
//!
//! ## Usage
//!
//! ```rust,no_run
//! use truthchain::{Caller, DocumentMetadata, DocumentRegistry, Fingerprint, Keypair, RegistryConfig};
//! use truthchain::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("registry.db").unwrap();
//!     let registry = DocumentRegistry::new(store, RegistryConfig::default()).unwrap();
//!
//!     let admin = Caller::from_keypair(&Keypair::generate());
//!     registry.initialize_registry(&admin).await.unwrap();
//!
//!     let fingerprint = Fingerprint::digest(b"page 1 contents");
//!     let metadata = DocumentMetadata::new("Flight Log", "bafy...", 1, "Flight log, page 1");
//!     registry
//!         .register_document(&admin, fingerprint.as_bytes(), metadata)
//!         .await
//!         .unwrap();
//!
//!     assert!(registry.verify_document(fingerprint.as_bytes()).await.unwrap());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `truthchain::core` - Core primitives (Fingerprint, Address, records)
//! - `truthchain::store` - Storage abstraction and SQLite

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod registry;

// Re-export component crates
pub use truthchain_core as core;
pub use truthchain_store as store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::RegistryConfig;
pub use error::{ErrorCategory, RegistryError, Result};
pub use events::{DocumentPage, RegistryEvent, RegistryStats};
pub use registry::DocumentRegistry;

// Re-export commonly used core types
pub use truthchain_core::{
    Address, AuthorityPolicy, Caller, DocumentMetadata, DocumentRecord, Fingerprint, Identity,
    Keypair, OperationIntent, Registry, RegistrationPolicy,
};
