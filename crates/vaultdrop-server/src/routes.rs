//! HTTP handlers for the envelope store.
//!
//! - `POST /upload`    - store a ciphertext blob with its envelope metadata
//! - `GET  /file/:id`  - fetch a blob; the record travels in `X-Metadata`
//! - `GET  /list`      - all records, no bodies

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use vaultdrop_store::{CallerMetadata, FileId, FileRecord, Store};

use crate::config::{AllowedOrigins, ServerConfig};
use crate::error::{ApiError, ConfigError};

/// Header carrying the base64 JSON record on `GET /file/:id`.
pub const METADATA_HEADER: &str = "x-metadata";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub id: FileId,
    pub metadata: FileRecord,
}

/// Build the application router with CORS, body limit, timeout and tracing.
pub fn router(store: Arc<dyn Store>, config: &ServerConfig) -> Result<Router, ConfigError> {
    let cors = CorsLayer::new()
        .allow_origin(allow_origin(&config.allowed_origins)?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(METADATA_HEADER)]);

    Ok(Router::new()
        .route("/upload", post(upload))
        .route("/file/:id", get(fetch_file))
        .route("/list", get(list_files))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(store)))
}

fn allow_origin(origins: &AllowedOrigins) -> Result<AllowOrigin, ConfigError> {
    match origins {
        AllowedOrigins::Any => Ok(AllowOrigin::any()),
        AllowedOrigins::List(list) => {
            let values = list
                .iter()
                .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::Origin(o.clone())))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AllowOrigin::list(values))
        }
    }
}

/// POST /upload
///
/// Multipart fields:
/// - `file`: the ciphertext, with its original file name
/// - `metadata`: JSON with `wrappedKeyHex`, `ivHex`, `fileHashHex` and any extras
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut metadata: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let name = field.file_name().unwrap_or("upload.bin").to_string();
                let bytes = field.bytes().await?;
                file = Some((name, bytes));
            }
            "metadata" => {
                metadata = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| ApiError::BadRequest("No file received".into()))?;
    let metadata = metadata.ok_or_else(|| ApiError::BadRequest("Missing metadata".into()))?;
    let metadata = CallerMetadata::from_json(&metadata)
        .map_err(|_| ApiError::BadRequest("Invalid metadata JSON".into()))?;

    let size = bytes.len();
    let record = state.store.store(bytes, &filename, metadata).await?;
    info!(id = %record.id, size, "upload stored");

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".into(),
        id: record.id,
        metadata: record,
    }))
}

/// GET /file/:id
async fn fetch_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = FileId::parse(&id)?;
    let blob = state.store.retrieve(&id).await?;

    let record_json = serde_json::to_vec(&blob.record)
        .map_err(|e| ApiError::Internal(format!("encode record: {e}")))?;
    let metadata = HeaderValue::from_str(&STANDARD.encode(record_json))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let disposition = content_disposition(&blob.record.original_filename);

    debug!(%id, size = blob.bytes.len(), "serving blob");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (header::CONTENT_DISPOSITION, disposition),
            (HeaderName::from_static(METADATA_HEADER), metadata),
        ],
        Body::from(blob.bytes),
    )
        .into_response())
}

/// GET /list
async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileRecord>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

/// `attachment; filename="<name>"` with quotes and control characters replaced.
fn content_disposition(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    HeaderValue::from_bytes(format!("attachment; filename=\"{safe}\"").as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_sanitises_name() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
        assert_eq!(
            content_disposition("a\"b\r\n.txt"),
            "attachment; filename=\"a_b__.txt\""
        );
    }

    #[test]
    fn test_router_rejects_bad_origin() {
        let store: Arc<dyn Store> = Arc::new(vaultdrop_store::MemoryStore::new());
        let config = ServerConfig {
            allowed_origins: AllowedOrigins::List(vec!["bad\norigin".into()]),
            ..ServerConfig::default()
        };
        assert!(matches!(router(store, &config), Err(ConfigError::Origin(_))));
    }
}
