//! HTTP client for a vaultdrop server.
//!
//! [`RemoteStore`] implements [`Store`] over the server's three routes, so
//! the pipelines run unchanged against a local or a remote store. Every
//! request is bounded by the client timeout; timeouts, connection failures
//! and 5xx answers surface as [`StoreError::Unavailable`].

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use vaultdrop_core::base64_decode;
use vaultdrop_store::{CallerMetadata, FileId, FileRecord, Result, Store, StoreError, StoredBlob};

use crate::config::ClientConfig;

/// Header carrying the base64 JSON record on `GET /file/:id`.
const METADATA_HEADER: &str = "x-metadata";

/// A [`Store`] backed by a vaultdrop server.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    metadata: FileRecord,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl RemoteStore {
    /// Build a client for `config.server_url` with `config.timeout`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("http client: {e}")))?;
        Ok(Self::with_client(client, &config.server_url))
    }

    /// Use an existing client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Store for RemoteStore {
    async fn store(
        &self,
        blob: Bytes,
        original_filename: &str,
        metadata: CallerMetadata,
    ) -> Result<FileRecord> {
        metadata.validate()?;
        let metadata = serde_json::to_string(&metadata)
            .map_err(|e| StoreError::InvalidMetadata(e.to_string()))?;

        let len = blob.len() as u64;
        let file = Part::stream_with_length(blob, len)
            .file_name(original_filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(transport)?;
        let form = Form::new().part("file", file).text("metadata", metadata);

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response, original_filename).await?;

        let body: UploadResponse = response.json().await.map_err(|e| StoreError::Corrupt {
            id: "upload response".into(),
            reason: e.to_string(),
        })?;
        debug!(id = %body.metadata.id, size = len, "uploaded to remote store");
        Ok(body.metadata)
    }

    async fn retrieve(&self, id: &FileId) -> Result<StoredBlob> {
        let key = id.to_string();
        let response = self
            .client
            .get(self.url(&format!("/file/{key}")))
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response, &key).await?;

        let header = response
            .headers()
            .get(METADATA_HEADER)
            .ok_or_else(|| corrupt(&key, "response has no X-Metadata header"))?;
        let text = header
            .to_str()
            .map_err(|e| corrupt(&key, &e.to_string()))?;
        let json = base64_decode(text).map_err(|e| corrupt(&key, &e.to_string()))?;
        let record = FileRecord::from_json(&key, &json)?;
        if record.id != *id {
            return Err(corrupt(&key, "server returned a record for a different id"));
        }

        let bytes = response.bytes().await.map_err(transport)?;
        debug!(%id, size = bytes.len(), "fetched from remote store");
        Ok(StoredBlob { bytes, record })
    }

    async fn list(&self) -> Result<Vec<FileRecord>> {
        let response = self
            .client
            .get(self.url("/list"))
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response, "list").await?;
        response
            .json()
            .await
            .map_err(|e| corrupt("list", &e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn corrupt(id: &str, reason: &str) -> StoreError {
    StoreError::Corrupt {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

/// Pass 2xx responses through; turn anything else into a store error.
async fn check_status(response: Response, subject: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.error)
        .unwrap_or(text);
    Err(status_error(status, subject, message))
}

fn status_error(status: StatusCode, subject: &str, message: String) -> StoreError {
    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(subject.to_string()),
        StatusCode::BAD_REQUEST if message.starts_with("Invalid file id") => {
            StoreError::InvalidId(subject.to_string())
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            StoreError::Unavailable(format!("{status}: {message}"))
        }
        s if s.is_client_error() => StoreError::InvalidMetadata(format!("{status}: {message}")),
        _ => StoreError::Unavailable(format!("{status}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::NOT_FOUND, "x", "File not found".into()).is_not_found());
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "x", "Invalid file id: x".into()),
            StoreError::InvalidId(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "x", "Invalid metadata JSON".into()),
            StoreError::InvalidMetadata(_)
        ));
        assert!(matches!(
            status_error(StatusCode::PAYLOAD_TOO_LARGE, "x", String::new()),
            StoreError::InvalidMetadata(_)
        ));
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::REQUEST_TIMEOUT,
        ] {
            assert!(status_error(status, "x", String::new()).is_transient());
        }
    }

    #[test]
    fn test_base_url_is_normalised() {
        let config = ClientConfig {
            server_url: "http://localhost:4000/".into(),
            ..ClientConfig::default()
        };
        let store = RemoteStore::new(&config).unwrap();
        assert_eq!(store.base_url(), "http://localhost:4000");
        assert_eq!(store.url("/list"), "http://localhost:4000/list");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transient() {
        // Port 9 (discard) on loopback is closed on test machines.
        let config = ClientConfig {
            server_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_secs(2),
            recipient_key: None,
        };
        let store = RemoteStore::new(&config).unwrap();
        let err = store.list().await.unwrap_err();
        assert!(err.is_transient(), "{err}");
    }
}
