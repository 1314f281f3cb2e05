//! End-to-end tests: encrypt, store, retrieve, decrypt.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use proptest::prelude::*;
use tokio::net::TcpListener;

use vaultdrop::store::{CallerMetadata, FileId, FsStore, MemoryStore, Store, StoreError};
use vaultdrop::{ClientConfig, CryptoError, Recipient, RemoteStore, Sender, VaultError};
use vaultdrop_server::{router, ServerConfig};
use vaultdrop_testkit::{test_private_key, test_public_key, TestFixture};

async fn spawn_server(store: Arc<dyn Store>) -> String {
    let app = router(store, &ServerConfig::default()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn remote(base: &str) -> RemoteStore {
    RemoteStore::new(&ClientConfig {
        server_url: base.to_string(),
        ..ClientConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_hello_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let sender = Sender::new(test_public_key(), store.clone());
    let recipient = Recipient::new(test_private_key(), store);

    let receipt = sender.send("hello.txt", b"hello".to_vec()).await.unwrap();
    let file = recipient.fetch(&receipt.id).await.unwrap();
    assert_eq!(file.contents, b"hello");
    assert_eq!(file.filename, "hello.txt");
}

#[tokio::test]
async fn test_corrupted_ciphertext_fails_authentication() {
    let fixture = TestFixture::new();
    let envelope = fixture.seal(b"hello");

    let mut ciphertext = envelope.ciphertext.clone();
    ciphertext[2] ^= 0x01;
    let record = fixture
        .store
        .store(
            Bytes::from(ciphertext),
            "hello.txt",
            CallerMetadata::new(envelope.metadata()),
        )
        .await
        .unwrap();

    let recipient = Recipient::new(test_private_key(), fixture.store);
    let err = recipient.fetch(&record.id).await.unwrap_err();
    assert!(matches!(err, VaultError::Crypto(CryptoError::Authentication)));
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let recipient = Recipient::new(test_private_key(), MemoryStore::new());
    let err = recipient.fetch(&FileId::generate()).await.unwrap_err();
    assert!(matches!(err, VaultError::Store(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_round_trip_through_fs_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsStore::new(dir.path()));
    let sender = Sender::new(test_public_key(), store.clone());
    let recipient = Recipient::new(test_private_key(), store.clone());

    let receipt = sender.send("empty.bin", Vec::new()).await.unwrap();
    assert!(dir
        .path()
        .join("uploads")
        .join(format!("{}.bin", receipt.id))
        .exists());
    assert!(dir
        .path()
        .join("metadata")
        .join(format!("{}.json", receipt.id))
        .exists());

    let file = recipient.fetch(&receipt.id).await.unwrap();
    assert!(file.contents.is_empty());

    // A fresh store over the same directory sees the same record.
    let reopened = Recipient::new(test_private_key(), FsStore::new(dir.path()));
    assert_eq!(reopened.fetch(&receipt.id).await.unwrap().record, receipt.record);
}

#[tokio::test]
async fn test_round_trip_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_server(Arc::new(FsStore::new(dir.path()))).await;
    let store = remote(&base);

    let sender = Sender::new(test_public_key(), store.clone());
    let recipient = Recipient::new(test_private_key(), store.clone());

    let contents: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
    let receipt = sender.send("noise.bin", contents.clone()).await.unwrap();

    let file = recipient.fetch(&receipt.id).await.unwrap();
    assert_eq!(file.contents, contents);
    assert_eq!(file.filename, "noise.bin");
    assert_eq!(file.record, receipt.record);

    let listed = store.list().await.unwrap();
    assert_eq!(listed, vec![receipt.record]);
}

#[tokio::test]
async fn test_http_errors_map_to_store_errors() {
    let base = spawn_server(Arc::new(MemoryStore::new())).await;
    let store = remote(&base);

    let err = store.retrieve(&FileId::generate()).await.unwrap_err();
    assert!(err.is_not_found());

    let fixture = TestFixture::new();
    let mut metadata = fixture.seal(b"x").metadata();
    metadata.file_hash_hex = "00".into();
    let err = store
        .store(Bytes::from_static(b"xx"), "x", CallerMetadata::new(metadata))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidMetadata(_)));
}

#[tokio::test]
async fn test_sequential_stores_yield_distinct_ids() {
    let fixture = TestFixture::new();
    let mut ids = HashSet::new();
    for i in 0..50u8 {
        let record = fixture.seal_and_store(&[i], "n.bin").await;
        assert!(ids.insert(record.id));
    }
    assert_eq!(fixture.store.len().await, 50);
}

#[tokio::test]
async fn test_concurrent_sends() {
    let store = Arc::new(MemoryStore::new());
    let sender = Arc::new(Sender::new(test_public_key(), store.clone()));

    let mut handles = Vec::new();
    for i in 0..16u32 {
        let sender = Arc::clone(&sender);
        handles.push(tokio::spawn(async move {
            let body = format!("file {i}").into_bytes();
            (sender.send(&format!("{i}.txt"), body.clone()).await.unwrap(), body)
        }));
    }

    let recipient = Recipient::new(test_private_key(), store);
    let mut ids = HashSet::new();
    for handle in handles {
        let (receipt, body) = handle.await.unwrap();
        assert!(ids.insert(receipt.id));
        assert_eq!(recipient.fetch(&receipt.id).await.unwrap().contents, body);
    }
    assert_eq!(ids.len(), 16);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_pipeline_round_trip(contents in prop::collection::vec(any::<u8>(), 0..2048)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let out = rt.block_on(async {
            let store = Arc::new(MemoryStore::new());
            let sender = Sender::new(test_public_key(), store.clone());
            let recipient = Recipient::new(test_private_key(), store);
            let receipt = sender.send("p.bin", contents.clone()).await.unwrap();
            recipient.fetch(&receipt.id).await.unwrap().contents
        });
        prop_assert_eq!(out, contents);
    }
}
