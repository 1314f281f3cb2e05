//! # vaultdrop store
//!
//! Storage abstraction for vaultdrop. Provides a trait-based interface for
//! persisting sealed envelopes with filesystem and in-memory implementations.
//!
//! ## Overview
//!
//! The store holds ciphertext blobs next to their metadata records and
//! assigns each a random [`FileId`]. It never sees a private key or a
//! plaintext content key and never inspects the blob. The primary
//! implementation is [`FsStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`FsStore`] - Directory-backed persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`FileRecord`] - The persisted metadata record
//! - [`CallerMetadata`] - Envelope fields plus caller extras, as submitted
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use vaultdrop_store::{CallerMetadata, FsStore, Store};
//!
//! async fn example(ciphertext: Vec<u8>, metadata: CallerMetadata) {
//!     let store = FsStore::new("./data");
//!     store.recover().await.unwrap();
//!
//!     let record = store.store(Bytes::from(ciphertext), "report.pdf", metadata).await.unwrap();
//!     let fetched = store.retrieve(&record.id).await.unwrap();
//!     assert_eq!(fetched.record, record);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Bearer ids**: Knowing an id is enough to fetch its blob
//! - **Atomic publish**: Blob first, record second; the record makes it visible
//! - **Lossy list**: Unreadable records are logged and skipped

pub mod error;
pub mod fs;
pub mod memory;
pub mod record;
pub mod traits;

pub use error::{Result, StoreError};
pub use fs::{FsStore, RecoveryReport};
pub use memory::MemoryStore;
pub use record::{blob_name, CallerMetadata, FileId, FileRecord, StoredBlob};
pub use traits::Store;
