//! File ids and metadata records.
//!
//! A [`FileRecord`] is written once when a blob is stored and never changed
//! afterwards. Its JSON form is the stable schema shared with clients:
//!
//! ```json
//! {
//!   "id": "3f1c...",
//!   "originalFilename": "report.pdf",
//!   "storedName": "3f1c....bin",
//!   "wrappedKeyHex": "...",
//!   "ivHex": "...",
//!   "fileHashHex": "...",
//!   "uploadTimestamp": "2024-05-01T12:00:00Z"
//! }
//! ```
//!
//! Older records used `savedFilename` and `uploadTime`; both are accepted
//! on read. Any other caller-supplied fields are kept verbatim.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use vaultdrop_core::EnvelopeMetadata;

use crate::error::{Result, StoreError};

/// Field names owned by the store or the envelope. Caller extras using these
/// names are dropped.
const RESERVED_FIELDS: &[&str] = &[
    "id",
    "originalFilename",
    "storedName",
    "savedFilename",
    "uploadTimestamp",
    "uploadTime",
    "wrappedKeyHex",
    "encryptedAESKeyHex",
    "ivHex",
    "fileHashHex",
    "cipher",
];

/// Identifier of a stored file.
///
/// A random UUIDv4. Knowing the id is enough to fetch the ciphertext, so ids
/// are never derived from content or sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    /// Draw a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id, rejecting anything that is not a UUID.
    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| StoreError::InvalidId(s.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for FileId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for FileId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0.hyphenated())
    }
}

/// What a caller hands to [`Store::store`](crate::Store::store) besides the blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerMetadata {
    #[serde(flatten)]
    pub envelope: EnvelopeMetadata,

    /// Extra fields, stored verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CallerMetadata {
    pub fn new(envelope: EnvelopeMetadata) -> Self {
        Self {
            envelope,
            extra: BTreeMap::new(),
        }
    }

    /// Attach an extra field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Parse the JSON form sent by clients.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| StoreError::InvalidMetadata(e.to_string()))
    }

    /// Check the envelope fields are well-formed hex of the right lengths.
    ///
    /// The store never opens the envelope; this only rejects records that no
    /// recipient could ever decrypt.
    pub fn validate(&self) -> Result<()> {
        self.envelope
            .validate()
            .map_err(|e| StoreError::InvalidMetadata(e.to_string()))
    }
}

/// The persisted record for one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: FileId,

    pub original_filename: String,

    /// Name of the blob inside the store. Internal to the backend.
    #[serde(alias = "savedFilename")]
    pub stored_name: String,

    #[serde(flatten)]
    pub envelope: EnvelopeMetadata,

    #[serde(alias = "uploadTime")]
    pub upload_timestamp: DateTime<Utc>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FileRecord {
    /// Merge caller metadata with the system fields. System fields win.
    pub fn new(
        id: FileId,
        original_filename: impl Into<String>,
        metadata: CallerMetadata,
        upload_timestamp: DateTime<Utc>,
    ) -> Self {
        let mut extra = metadata.extra;
        extra.retain(|k, _| !RESERVED_FIELDS.contains(&k.as_str()));

        Self {
            id,
            original_filename: original_filename.into(),
            stored_name: blob_name(&id),
            envelope: metadata.envelope,
            upload_timestamp,
            extra,
        }
    }

    /// JSON bytes as written to disk.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| StoreError::Write(e.to_string()))
    }

    /// Decode a record read back from a backend.
    pub fn from_json(id: &str, json: &[u8]) -> Result<Self> {
        serde_json::from_slice(json).map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Default blob name for an id.
pub fn blob_name(id: &FileId) -> String {
    format!("{id}.bin")
}

/// A retrieved blob together with its record.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub bytes: Bytes,
    pub record: FileRecord,
}
