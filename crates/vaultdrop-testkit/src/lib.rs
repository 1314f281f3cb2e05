//! # vaultdrop testkit
//!
//! Testing utilities for vaultdrop.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A fixed RSA test key pair and a memory-backed [`TestFixture`]
//! - **Golden vectors**: Envelopes from an independent implementation, with expected outcomes
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Golden Vectors
//!
//! ```rust
//! use vaultdrop_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, detail) in verify_all_vectors() {
//!     assert!(ok, "{name}: {detail}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use vaultdrop_testkit::generators::UploadParams;
//!
//! proptest! {
//!     #[test]
//!     fn roundtrip(params: UploadParams) {
//!         // seal params.file, store, fetch, open
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use vaultdrop_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let envelope = fixture.seal(b"hello");
//! assert_eq!(fixture.decryptor.decrypt_envelope(&envelope).unwrap(), b"hello");
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    other_private_key, test_private_key, test_public_key, TestFixture, OTHER_PRIVATE_KEY_HEX,
    OTHER_PUBLIC_KEY_HEX, TEST_PRIVATE_KEY_HEX, TEST_PUBLIC_KEY_HEX,
};
pub use generators::{caller_metadata, UploadParams};
pub use vectors::{all_vectors, verify_all_vectors, Expected, GoldenEnvelope};
