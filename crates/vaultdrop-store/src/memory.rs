//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as the
//! filesystem store but keeps everything in memory with no persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::record::{CallerMetadata, FileId, FileRecord, StoredBlob};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. A blob and its record are
/// inserted under one write lock, so readers see both or neither.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<FileId, StoredBlob>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    /// Drop a blob but keep its record, simulating a lost blob on disk.
    #[cfg(test)]
    async fn lose_blob(&self, id: &FileId) -> bool {
        let mut files = self.files.write().await;
        match files.get_mut(id) {
            Some(entry) => {
                entry.bytes = Bytes::new();
                entry.record.stored_name.clear();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn store(
        &self,
        blob: Bytes,
        original_filename: &str,
        metadata: CallerMetadata,
    ) -> Result<FileRecord> {
        metadata.validate()?;

        let mut files = self.files.write().await;
        let id = loop {
            let id = FileId::generate();
            if !files.contains_key(&id) {
                break id;
            }
        };

        let record = FileRecord::new(id, original_filename, metadata, Utc::now());
        debug!(%id, size = blob.len(), "stored blob");
        files.insert(
            id,
            StoredBlob {
                bytes: blob,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    async fn retrieve(&self, id: &FileId) -> Result<StoredBlob> {
        let files = self.files.read().await;
        match files.get(id) {
            Some(entry) if entry.record.stored_name.is_empty() => {
                warn!(%id, "record present but blob missing");
                Err(StoreError::NotFound(id.to_string()))
            }
            Some(entry) => Ok(entry.clone()),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn list(&self) -> Result<Vec<FileRecord>> {
        let files = self.files.read().await;
        let mut records: Vec<_> = files.values().map(|e| e.record.clone()).collect();
        records.sort_by(|a, b| a.upload_timestamp.cmp(&b.upload_timestamp));
        Ok(records)
    }
}
