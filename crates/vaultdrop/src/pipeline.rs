//! Send and fetch pipelines.
//!
//! Each pipeline is one fallible unit of work. A send either ends with a
//! stored record or with an error and nothing usable; a fetch either returns
//! the verified file or an error and no plaintext at all.
//!
//! RSA and the AEAD run on the blocking pool so large files do not stall
//! the runtime.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use vaultdrop_core::{
    CipherSuite, EnvelopeDecryptor, EnvelopeEncryptor, RecipientPrivateKey, RecipientPublicKey,
    Sha256Digest,
};
use vaultdrop_store::{CallerMetadata, FileId, FileRecord, Store};

use crate::error::Result;

/// Outcome of a successful send.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// Id to hand to the recipient. Anyone holding it can fetch the ciphertext.
    pub id: FileId,
    pub record: FileRecord,
    /// SHA-256 of the plaintext.
    pub digest: Sha256Digest,
}

/// A fetched and verified file.
#[derive(Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    pub filename: String,
    pub contents: Vec<u8>,
    pub record: FileRecord,
}

impl std::fmt::Debug for ReceivedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceivedFile")
            .field("filename", &self.filename)
            .field("len", &self.contents.len())
            .field("id", &self.record.id)
            .finish()
    }
}

/// Encrypts files for one recipient and puts them in a store.
pub struct Sender<S: Store> {
    encryptor: Arc<EnvelopeEncryptor>,
    store: S,
}

impl<S: Store> Sender<S> {
    pub fn new(recipient: RecipientPublicKey, store: S) -> Self {
        Self {
            encryptor: Arc::new(EnvelopeEncryptor::new(recipient)),
            store,
        }
    }

    /// Use a different body cipher for subsequent sends.
    pub fn with_suite(mut self, suite: CipherSuite) -> Self {
        let encryptor = EnvelopeEncryptor::clone(&self.encryptor).with_suite(suite);
        self.encryptor = Arc::new(encryptor);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encrypt `contents` and store the ciphertext under a fresh id.
    pub async fn send(&self, filename: &str, contents: Vec<u8>) -> Result<SendReceipt> {
        self.send_with(filename, contents, BTreeMap::new()).await
    }

    /// Read a local file and send it under its own file name.
    pub async fn send_path(&self, path: &Path) -> Result<SendReceipt> {
        let contents = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        self.send(&filename, contents).await
    }

    /// Like [`send`](Self::send), attaching extra metadata fields to the record.
    #[instrument(skip(self, contents, extra), fields(len = contents.len()))]
    pub async fn send_with(
        &self,
        filename: &str,
        contents: Vec<u8>,
        extra: BTreeMap<String, Value>,
    ) -> Result<SendReceipt> {
        let encryptor = Arc::clone(&self.encryptor);
        let envelope = tokio::task::spawn_blocking(move || encryptor.encrypt(&contents)).await??;

        let mut metadata = CallerMetadata::new(envelope.metadata());
        metadata.extra = extra;

        let record = self
            .store
            .store(Bytes::from(envelope.ciphertext), filename, metadata)
            .await?;
        debug!(id = %record.id, suite = %envelope.suite, "envelope sent");

        Ok(SendReceipt {
            id: record.id,
            record,
            digest: envelope.digest,
        })
    }
}

/// Fetches envelopes from a store and opens them with a private key.
pub struct Recipient<S: Store> {
    decryptor: Arc<EnvelopeDecryptor>,
    store: S,
}

impl<S: Store> Recipient<S> {
    pub fn new(private_key: RecipientPrivateKey, store: S) -> Self {
        Self {
            decryptor: Arc::new(EnvelopeDecryptor::new(private_key)),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Retrieve `id` and decrypt it.
    #[instrument(skip(self))]
    pub async fn fetch(&self, id: &FileId) -> Result<ReceivedFile> {
        let blob = self.store.retrieve(id).await?;
        let record = blob.record;

        let decryptor = Arc::clone(&self.decryptor);
        let envelope = record.envelope.clone();
        let ciphertext = blob.bytes;
        let contents = tokio::task::spawn_blocking(move || {
            decryptor.decrypt_with_metadata(&ciphertext, &envelope)
        })
        .await??;

        if Sha256Digest::hash(&contents).to_hex() != record.envelope.file_hash_hex.to_ascii_lowercase()
        {
            warn!(%id, "recorded fileHashHex does not match the decrypted file");
        }
        debug!(%id, len = contents.len(), "envelope opened");

        Ok(ReceivedFile {
            filename: record.original_filename.clone(),
            contents,
            record,
        })
    }

    /// Parse `id` and fetch it.
    pub async fn fetch_str(&self, id: &str) -> Result<ReceivedFile> {
        let id = FileId::parse(id)?;
        self.fetch(&id).await
    }

    /// All records in the store.
    pub async fn list(&self) -> Result<Vec<FileRecord>> {
        Ok(self.store.list().await?)
    }
}
