//! # Truth Chain Testkit
//!
//! Testing utilities for the Truth Chain registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known fingerprints for cross-implementation verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A ready-made registry over a memory store with a fixed clock
//!
//! ## Golden Vectors
//!
//! ```rust
//! use truthchain_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, computed) in verify_all_vectors() {
//!     println!("{}: {} ({})", name, computed.fingerprint, matches);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use truthchain_testkit::generators::valid_metadata;
//!
//! proptest! {
//!     #[test]
//!     fn metadata_validates(m in valid_metadata()) {
//!         prop_assert!(truthchain_core::validate_metadata(&m).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use truthchain_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::initialized().await;
//! let record = fixture.register(b"page contents").await?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_callers, sample_metadata, TestFixture, FIXTURE_NOW};
pub use generators::DocumentParams;
pub use vectors::{all_vectors, compute, verify_all_vectors, ComputedVector, GoldenVector};
