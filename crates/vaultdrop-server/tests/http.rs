//! HTTP tests against a server bound to an ephemeral port.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::TcpListener;

use vaultdrop_server::{router, ServerConfig};
use vaultdrop_store::{FileRecord, FsStore, MemoryStore, Store};
use vaultdrop_testkit::TestFixture;

async fn spawn_server(store: Arc<dyn Store>, config: ServerConfig) -> String {
    let app = router(store, &config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_default() -> String {
    spawn_server(Arc::new(MemoryStore::new()), ServerConfig::default()).await
}

fn upload_form(ciphertext: Vec<u8>, filename: &str, metadata: &str) -> Form {
    Form::new()
        .part("file", Part::bytes(ciphertext).file_name(filename.to_string()))
        .text("metadata", metadata.to_string())
}

#[tokio::test]
async fn test_upload_then_fetch_and_decrypt() {
    let fixture = TestFixture::new();
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_server(Arc::new(FsStore::new(dir.path())), ServerConfig::default()).await;
    let client = reqwest::Client::new();

    let envelope = fixture.seal(b"hello");
    let metadata = serde_json::to_string(&envelope.metadata()).unwrap();
    let response = client
        .post(format!("{base}/upload"))
        .multipart(upload_form(envelope.ciphertext.clone(), "hello.txt", &metadata))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "File uploaded successfully");
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["metadata"]["id"], id.as_str());
    assert_eq!(body["metadata"]["originalFilename"], "hello.txt");
    assert_eq!(body["metadata"]["ivHex"], envelope.nonce.to_hex());

    let response = client.get(format!("{base}/file/{id}")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers["content-type"], "application/octet-stream");
    assert_eq!(headers["content-disposition"], "attachment; filename=\"hello.txt\"");

    let record_json = STANDARD.decode(headers["x-metadata"].as_bytes()).unwrap();
    let record: FileRecord = serde_json::from_slice(&record_json).unwrap();
    assert_eq!(record.id.to_string(), id);

    let ciphertext = response.bytes().await.unwrap();
    assert_eq!(ciphertext.as_ref(), envelope.ciphertext.as_slice());

    let plaintext = fixture
        .decryptor
        .decrypt_with_metadata(&ciphertext, &record.envelope)
        .unwrap();
    assert_eq!(plaintext, b"hello");
}

#[tokio::test]
async fn test_upload_without_file_is_bad_request() {
    let base = spawn_default().await;
    let form = Form::new().text("metadata", "{}");
    let response = reqwest::Client::new()
        .post(format!("{base}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No file received");
}

#[tokio::test]
async fn test_upload_with_invalid_metadata_json() {
    let base = spawn_default().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/upload"))
        .multipart(upload_form(vec![1, 2, 3], "x.bin", "{not json"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid metadata JSON");
}

#[tokio::test]
async fn test_upload_with_malformed_envelope_fields() {
    let fixture = TestFixture::new();
    let base = spawn_default().await;

    let mut metadata = fixture.seal(b"x").metadata();
    metadata.iv_hex = "a5a5".into();
    let response = reqwest::Client::new()
        .post(format!("{base}/upload"))
        .multipart(upload_form(
            vec![0; 48],
            "x.bin",
            &serde_json::to_string(&metadata).unwrap(),
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fetch_unknown_and_malformed_ids() {
    let base = spawn_default().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/file/{}", vaultdrop_store::FileId::generate()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "File not found");

    let response = client.get(format!("{base}/file/not-an-id")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_returns_all_records() {
    let fixture = TestFixture::new();
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let base = spawn_server(store.clone(), ServerConfig::default()).await;

    let client = reqwest::Client::new();
    let empty: Vec<Value> = client
        .get(format!("{base}/list"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.is_empty());

    for name in ["a.txt", "b.txt"] {
        let envelope = fixture.seal(name.as_bytes());
        let metadata = serde_json::to_string(&envelope.metadata()).unwrap();
        let response = client
            .post(format!("{base}/upload"))
            .multipart(upload_form(envelope.ciphertext, name, &metadata))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let records: Vec<FileRecord> = client
        .get(format!("{base}/list"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(store.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_cors_exposes_metadata_header() {
    let base = spawn_default().await;
    let response = reqwest::Client::new()
        .get(format!("{base}/list"))
        .header("origin", "https://app.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let exposed = response.headers()["access-control-expose-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("x-metadata"));
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let config = ServerConfig {
        max_upload_bytes: 1024,
        ..ServerConfig::default()
    };
    let store = Arc::new(MemoryStore::new());
    let base = spawn_server(store.clone(), config).await;

    let fixture = TestFixture::new();
    let envelope = fixture.seal(&[7u8; 4096]);
    let metadata = serde_json::to_string(&envelope.metadata()).unwrap();
    let response = reqwest::Client::new()
        .post(format!("{base}/upload"))
        .multipart(upload_form(envelope.ciphertext, "big.bin", &metadata))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(store.is_empty().await);
}
