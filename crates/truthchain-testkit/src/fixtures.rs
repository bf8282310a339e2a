//! Test fixtures and helpers.
//!
//! Common setup code for integration tests and benchmarks.

use std::sync::Arc;

use truthchain::{DocumentRegistry, FixedClock, RegistryConfig, Result};
use truthchain_core::{Caller, DocumentMetadata, DocumentRecord, Fingerprint, Identity, Keypair};
use truthchain_store::MemoryStore;

/// Fixed start time for fixture clocks: 2025-01-14T16:00:00Z.
pub const FIXTURE_NOW: i64 = 1_736_870_400_000;

/// A registry over a memory store, with a deterministic authority and clock.
pub struct TestFixture {
    pub keypair: Keypair,
    pub clock: Arc<FixedClock>,
    pub registry: DocumentRegistry<MemoryStore>,
}

impl TestFixture {
    /// Create a fixture with the default config and authority seed `[0x42; 32]`.
    pub fn new() -> Self {
        Self::with_config([0x42; 32], RegistryConfig::default())
    }

    /// Create a fixture with a chosen authority seed and config.
    ///
    /// Panics if `config` is invalid.
    pub fn with_config(seed: [u8; 32], config: RegistryConfig) -> Self {
        let clock = Arc::new(FixedClock::new(FIXTURE_NOW));
        let registry = DocumentRegistry::new(MemoryStore::new(), config)
            .expect("fixture config must be valid")
            .with_clock(clock.clone());
        Self {
            keypair: Keypair::from_seed(&seed),
            clock,
            registry,
        }
    }

    /// A fixture whose registry is already initialized by [`TestFixture::caller`].
    pub async fn initialized() -> Self {
        Self::initialized_with(RegistryConfig::default()).await
    }

    /// Like [`TestFixture::initialized`], with a custom config.
    pub async fn initialized_with(config: RegistryConfig) -> Self {
        let fixture = Self::with_config([0x42; 32], config);
        fixture
            .registry
            .initialize_registry(&fixture.caller())
            .await
            .expect("fresh registry must initialize");
        fixture
    }

    /// The registry authority as a caller.
    pub fn caller(&self) -> Caller {
        Caller::from_keypair(&self.keypair)
    }

    /// The registry authority's identity.
    pub fn identity(&self) -> Identity {
        self.keypair.identity()
    }

    /// Register `content`'s fingerprint as the authority, with sample metadata.
    pub async fn register(&self, content: &[u8]) -> Result<DocumentRecord> {
        self.registry
            .register_document(
                &self.caller(),
                Fingerprint::digest(content).as_bytes(),
                sample_metadata(1),
            )
            .await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata for a page of a sample flight log.
pub fn sample_metadata(page_number: u32) -> DocumentMetadata {
    DocumentMetadata::new(
        "Flight Log",
        "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi",
        page_number,
        format!("Flight log, page {}", page_number),
    )
    .with_cats_number("CATS-LSJ-0001")
}

/// Deterministic callers for multi-party tests.
pub fn multi_party_callers(count: usize) -> Vec<Keypair> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = 0x10;
            seed[24..].copy_from_slice(&(i as u64).to_be_bytes());
            Keypair::from_seed(&seed)
        })
        .collect()
}
