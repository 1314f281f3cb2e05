//! # vaultdrop core
//!
//! Hybrid envelope encryption for files handed to an untrusted store.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over key material and byte buffers.
//!
//! ## Protocol
//!
//! 1. `digest = SHA-256(file)`, `payload = file || digest`
//! 2. A fresh 256-bit content key and 96-bit nonce are drawn
//! 3. `ciphertext = AEAD(key, nonce, payload)` (AES-256-GCM by default)
//! 4. `wrapped_key = RSA-OAEP-SHA256(recipient_public_key, key)`
//!
//! Decryption reverses the steps and re-checks the embedded digest before
//! releasing the file.
//!
//! ## Key Types
//!
//! - [`EnvelopeEncryptor`] / [`EnvelopeDecryptor`] - the two halves of the protocol
//! - [`RecipientPublicKey`] / [`RecipientPrivateKey`] - imported RSA key material
//! - [`SealedEnvelope`] - ciphertext plus header
//! - [`EnvelopeMetadata`] - the header as hex text for storage
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vaultdrop_core::{EnvelopeDecryptor, EnvelopeEncryptor, RecipientPrivateKey, RecipientPublicKey};
//!
//! # fn example(public_hex: &str, private_hex: &str) -> vaultdrop_core::Result<()> {
//! let encryptor = EnvelopeEncryptor::new(RecipientPublicKey::from_hex(public_hex)?);
//! let envelope = encryptor.encrypt(b"hello")?;
//!
//! let decryptor = EnvelopeDecryptor::new(RecipientPrivateKey::from_hex(private_hex)?);
//! assert_eq!(decryptor.decrypt_envelope(&envelope)?, b"hello");
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod crypto;
pub mod decrypt;
pub mod encrypt;
pub mod envelope;
pub mod error;
pub mod keys;

pub use codec::{base64_decode, base64_encode, hex_decode, hex_decode_array, hex_encode};
pub use crypto::{
    CipherSuite, ContentKey, EnvelopeNonce, Sha256Digest, DIGEST_LEN, KEY_LEN, NONCE_LEN, TAG_LEN,
};
pub use decrypt::EnvelopeDecryptor;
pub use encrypt::EnvelopeEncryptor;
pub use envelope::{EnvelopeHeader, EnvelopeMetadata, SealedEnvelope};
pub use error::{CodecError, CryptoError, Result};
pub use keys::{KeyEncoding, RecipientPrivateKey, RecipientPublicKey, MIN_MODULUS_BITS};
