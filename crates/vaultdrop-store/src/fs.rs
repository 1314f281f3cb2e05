//! Filesystem implementation of the Store trait.
//!
//! This is the primary storage backend. Layout under the root directory:
//!
//! ```text
//! <root>/uploads/<id>.bin     ciphertext blobs
//! <root>/metadata/<id>.json   records
//! ```
//!
//! Every file is written to a dot-prefixed `.tmp` sibling, synced, then
//! renamed into place. The blob is published first and the record second;
//! the record rename is the point at which a stored file becomes visible.
//!
//! Both writes run as one task on the blocking pool. Dropping a `store`
//! future does not stop that task, so a cancelled store still ends with
//! both files published or with neither, and never leaves staging files.

use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::fs;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::record::{CallerMetadata, FileId, FileRecord, StoredBlob};
use crate::traits::Store;

const UPLOADS_DIR: &str = "uploads";
const METADATA_DIR: &str = "metadata";
const STAGING_SUFFIX: &str = ".tmp";

/// What [`FsStore::recover`] cleaned up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Leftover staging files removed.
    pub staging_removed: usize,
    /// Blobs with no record removed.
    pub orphans_removed: usize,
}

/// Filesystem-backed store.
///
/// Directories are created lazily on the first write. Safe to share across
/// tasks; concurrent stores never touch the same paths.
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    uploads: PathBuf,
    metadata: PathBuf,
    dirs_ready: OnceCell<()>,
}

impl FsStore {
    /// Open a store rooted at `root`. Nothing is touched until first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            uploads: root.join(UPLOADS_DIR),
            metadata: root.join(METADATA_DIR),
            root,
            dirs_ready: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove staging files and unreferenced blobs left by interrupted writes.
    ///
    /// Only call this when no `store` is in flight, e.g. at startup: a blob
    /// whose record is still being written looks like an orphan.
    pub async fn recover(&self) -> Result<RecoveryReport> {
        let mut report = RecoveryReport::default();

        for dir in [&self.uploads, &self.metadata] {
            for path in list_dir(dir).await? {
                if is_staging(&path) {
                    remove_if_present(&path).await?;
                    report.staging_removed += 1;
                }
            }
        }

        for path in list_dir(&self.uploads).await? {
            let Some(stem) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            if is_staging(&path) || path.extension() != Some(OsStr::new("bin")) {
                continue;
            }
            let Ok(id) = FileId::parse(stem) else {
                continue;
            };
            if !fs::try_exists(self.record_path(&id)).await? {
                warn!(%id, "removing blob with no record");
                remove_if_present(&path).await?;
                report.orphans_removed += 1;
            }
        }

        if report != RecoveryReport::default() {
            info!(
                staging = report.staging_removed,
                orphans = report.orphans_removed,
                root = %self.root.display(),
                "store recovery complete"
            );
        }
        Ok(report)
    }

    async fn ensure_dirs(&self) -> Result<()> {
        self.dirs_ready
            .get_or_try_init(|| async {
                fs::create_dir_all(&self.uploads).await?;
                fs::create_dir_all(&self.metadata).await?;
                debug!(root = %self.root.display(), "storage directories ready");
                Ok::<(), io::Error>(())
            })
            .await
            .map_err(|e| StoreError::Write(format!("create storage directories: {e}")))?;
        Ok(())
    }

    fn record_path(&self, id: &FileId) -> PathBuf {
        self.metadata.join(format!("{id}.json"))
    }

    /// Resolve a record's blob. Only bare file names inside `uploads/` are
    /// accepted.
    fn blob_path(&self, record: &FileRecord) -> Result<PathBuf> {
        let name = record.stored_name.as_str();
        let bare = Path::new(name).file_name() == Some(OsStr::new(name));
        if !bare || name.starts_with('.') {
            return Err(StoreError::Corrupt {
                id: record.id.to_string(),
                reason: format!("stored name {name:?} is not a plain file name"),
            });
        }
        Ok(self.uploads.join(name))
    }

    /// A random id with no existing record. Lookup errors surface later,
    /// when the record is written.
    async fn fresh_id(&self) -> FileId {
        loop {
            let id = FileId::generate();
            if !matches!(fs::try_exists(self.record_path(&id)).await, Ok(true)) {
                return id;
            }
        }
    }
}

#[async_trait]
impl Store for FsStore {
    async fn store(
        &self,
        blob: Bytes,
        original_filename: &str,
        metadata: CallerMetadata,
    ) -> Result<FileRecord> {
        metadata.validate()?;
        self.ensure_dirs().await?;

        let id = self.fresh_id().await;
        let record = FileRecord::new(id, original_filename, metadata, Utc::now());
        let json = record.to_json_pretty()?;
        let blob_path = self.blob_path(&record)?;
        let record_path = self.record_path(&id);
        let size = blob.len();

        tokio::task::spawn_blocking(move || publish(id, &blob_path, &blob, &record_path, &json))
            .await
            .map_err(|e| StoreError::Write(format!("publish task for {id}: {e}")))??;

        debug!(%id, size, "stored blob");
        Ok(record)
    }

    async fn retrieve(&self, id: &FileId) -> Result<StoredBlob> {
        let json = match fs::read(self.record_path(id)).await {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let record = FileRecord::from_json(&id.to_string(), &json)?;
        if record.id != *id {
            return Err(StoreError::Corrupt {
                id: id.to_string(),
                reason: format!("record carries id {}", record.id),
            });
        }

        let bytes = match fs::read(self.blob_path(&record)?).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(%id, stored_name = %record.stored_name, "record present but blob missing");
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        debug!(%id, size = bytes.len(), "retrieved blob");
        Ok(StoredBlob {
            bytes: Bytes::from(bytes),
            record,
        })
    }

    async fn list(&self) -> Result<Vec<FileRecord>> {
        let mut records = Vec::new();

        for path in list_dir(&self.metadata).await? {
            if is_staging(&path) || path.extension() != Some(OsStr::new("json")) {
                continue;
            }
            let name = path.display().to_string();
            let parsed = match fs::read(&path).await {
                Ok(json) => FileRecord::from_json(&name, &json),
                Err(e) => Err(StoreError::Io(e)),
            };
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %name, error = %e, "skipping unreadable record"),
            }
        }

        records.sort_by(|a, b| a.upload_timestamp.cmp(&b.upload_timestamp));
        Ok(records)
    }
}

/// Publish the blob, then the record. A failed record write removes the blob.
fn publish(
    id: FileId,
    blob_path: &Path,
    blob: &[u8],
    record_path: &Path,
    json: &[u8],
) -> Result<()> {
    write_staged(blob_path, blob).map_err(|e| StoreError::Write(format!("blob {id}: {e}")))?;

    if let Err(e) = write_staged(record_path, json) {
        warn!(%id, error = %e, "record write failed, rolling back blob");
        if let Err(cleanup) = discard(blob_path) {
            warn!(%id, error = %cleanup, "blob rollback failed");
        }
        return Err(StoreError::Write(format!("record {id}: {e}")));
    }
    Ok(())
}

/// Write `bytes` to `target` via a synced staging file and a rename.
///
/// Readers either see the complete file or no file. The staging file is
/// removed on every error path.
fn write_staged(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let (Some(dir), Some(name)) = (target.parent(), target.file_name().and_then(OsStr::to_str))
    else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("bad target path {}", target.display()),
        ));
    };
    let staging = dir.join(format!(".{name}.{}{STAGING_SUFFIX}", Uuid::new_v4().simple()));

    let result = (|| -> io::Result<()> {
        let mut file = std::fs::File::create(&staging)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&staging, target)
    })();

    if result.is_err() {
        let _ = discard(&staging);
    }
    result
}

fn discard(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn is_staging(path: &Path) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .map(|n| n.starts_with('.') && n.ends_with(STAGING_SUFFIX))
        .unwrap_or(false)
}

/// Entries of `dir`, or nothing if it does not exist yet.
async fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        paths.push(entry.path());
    }
    Ok(paths)
}

async fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
