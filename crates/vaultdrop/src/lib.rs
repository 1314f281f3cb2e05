//! # vaultdrop
//!
//! The unified API for vaultdrop: send a file encrypted for one recipient
//! through a store that never sees plaintext, and let the recipient fetch
//! and verify it.
//!
//! ## Overview
//!
//! - **Sender**: encrypt-then-store as one step
//! - **Recipient**: fetch-then-decrypt as one step
//! - **RemoteStore**: the store contract spoken over HTTP to `vaultdrop-server`
//!
//! The store only ever receives ciphertext and an RSA-wrapped content key.
//! Private keys stay with the recipient.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vaultdrop::{ClientConfig, Recipient, RemoteStore, Sender};
//! use vaultdrop::core::{RecipientPrivateKey, RecipientPublicKey};
//!
//! async fn example(public_hex: &str, private_hex: &str) -> vaultdrop::Result<()> {
//!     let store = RemoteStore::new(&ClientConfig::default())?;
//!
//!     let sender = Sender::new(RecipientPublicKey::parse(public_hex)?, store.clone());
//!     let receipt = sender.send("hello.txt", b"hello".to_vec()).await?;
//!
//!     let recipient = Recipient::new(RecipientPrivateKey::parse(private_hex)?, store);
//!     let file = recipient.fetch(&receipt.id).await?;
//!     assert_eq!(file.contents, b"hello");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `vaultdrop::core` - envelope encryption, keys and codecs
//! - `vaultdrop::store` - the `Store` trait and its local backends

pub mod config;
pub mod error;
pub mod pipeline;
pub mod remote;

pub use vaultdrop_core as core;
pub use vaultdrop_store as store;

pub use config::ClientConfig;
pub use error::{Result, VaultError};
pub use pipeline::{ReceivedFile, Recipient, SendReceipt, Sender};
pub use remote::RemoteStore;

pub use vaultdrop_core::{CipherSuite, CryptoError, RecipientPrivateKey, RecipientPublicKey};
pub use vaultdrop_store::{FileId, FileRecord, FsStore, MemoryStore, Store, StoreError};
