//! Store trait: the abstract interface for envelope persistence.
//!
//! A store holds opaque blobs next to their metadata records. It never
//! receives a private key or a plaintext content key, and it never parses
//! the blob. Implementations include the filesystem (primary), in-memory
//! (for tests) and the HTTP client in the `vaultdrop` crate.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::record::{CallerMetadata, FileId, FileRecord, StoredBlob};

/// The Store trait: async interface for blob persistence.
///
/// # Design Notes
///
/// - **Fresh ids**: every `store` call allocates a new random id.
/// - **Atomic publish**: a blob and its record become visible together or
///   not at all. A failed or cancelled `store` leaves nothing a reader can see.
/// - **Not found is a value**: unknown ids and records whose blob is gone
///   both yield [`StoreError::NotFound`](crate::StoreError::NotFound).
#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a blob and return its record.
    ///
    /// `metadata.envelope` is validated for shape before anything is written.
    async fn store(
        &self,
        blob: Bytes,
        original_filename: &str,
        metadata: CallerMetadata,
    ) -> Result<FileRecord>;

    /// Fetch a blob and its record by id.
    async fn retrieve(&self, id: &FileId) -> Result<StoredBlob>;

    /// All records, without bodies. Not paginated.
    async fn list(&self) -> Result<Vec<FileRecord>>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn store(
        &self,
        blob: Bytes,
        original_filename: &str,
        metadata: CallerMetadata,
    ) -> Result<FileRecord> {
        (**self).store(blob, original_filename, metadata).await
    }

    async fn retrieve(&self, id: &FileId) -> Result<StoredBlob> {
        (**self).retrieve(id).await
    }

    async fn list(&self) -> Result<Vec<FileRecord>> {
        (**self).list().await
    }
}
