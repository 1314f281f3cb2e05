//! Symmetric primitives for vaultdrop.
//!
//! Wraps SHA-256 and the two supported AEADs (AES-256-GCM and
//! ChaCha20-Poly1305) with strong types. Both AEADs take a 256-bit key and a
//! 96-bit nonce and append a 128-bit tag.

use std::fmt;
use std::str::FromStr;

use aes_gcm::Aes256Gcm;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec::hex_encode;
use crate::error::{CryptoError, Result};

/// Content key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Digest length in bytes (256 bits).
pub const DIGEST_LEN: usize = 32;

/// AEAD tag length in bytes, identical for both suites.
pub const TAG_LEN: usize = 16;

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest(pub [u8; DIGEST_LEN]);

impl Sha256Digest {
    /// Compute the SHA-256 digest of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex_encode(self.0)
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Sha256Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 96-bit AEAD nonce. Public; travels with the ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvelopeNonce(pub [u8; NONCE_LEN]);

impl EnvelopeNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex_encode(self.0)
    }
}

/// A single-use 256-bit content key.
///
/// Not `Clone`: one key per envelope, wiped when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ContentKey([u8; KEY_LEN]);

impl ContentKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Encrypt `plaintext` under this key with no associated data.
    pub fn seal(
        &self,
        suite: CipherSuite,
        nonce: &EnvelopeNonce,
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        let nonce = Nonce::from_slice(nonce.as_bytes());
        let sealed = match suite {
            CipherSuite::Aes256Gcm => Aes256Gcm::new_from_slice(&self.0)
                .map_err(|e| CryptoError::Operation(e.to_string()))?
                .encrypt(nonce, plaintext),
            CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(&self.0)
                .map_err(|e| CryptoError::Operation(e.to_string()))?
                .encrypt(nonce, plaintext),
        };
        sealed.map_err(|_| CryptoError::Operation(format!("{suite} encryption failed")))
    }

    /// Decrypt and verify `ciphertext` under this key.
    ///
    /// Any tag failure is reported as [`CryptoError::Authentication`] and no
    /// plaintext is returned.
    pub fn open(
        &self,
        suite: CipherSuite,
        nonce: &EnvelopeNonce,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        let nonce = Nonce::from_slice(nonce.as_bytes());
        let opened = match suite {
            CipherSuite::Aes256Gcm => Aes256Gcm::new_from_slice(&self.0)
                .map_err(|e| CryptoError::Operation(e.to_string()))?
                .decrypt(nonce, ciphertext),
            CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(&self.0)
                .map_err(|e| CryptoError::Operation(e.to_string()))?
                .decrypt(nonce, ciphertext),
        };
        opened.map_err(|_| CryptoError::Authentication)
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentKey(..)")
    }
}

/// The AEAD used for the envelope body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherSuite {
    /// AES-256-GCM. What browser clients produce through WebCrypto.
    #[default]
    #[serde(rename = "AES-256-GCM")]
    Aes256Gcm,

    /// ChaCha20-Poly1305 with 256-bit key.
    #[serde(rename = "ChaCha20-Poly1305")]
    ChaCha20Poly1305,
}

impl CipherSuite {
    /// The wire name used in metadata.
    pub const fn name(&self) -> &'static str {
        match self {
            CipherSuite::Aes256Gcm => "AES-256-GCM",
            CipherSuite::ChaCha20Poly1305 => "ChaCha20-Poly1305",
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherSuite {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AES-256-GCM" => Ok(CipherSuite::Aes256Gcm),
            "ChaCha20-Poly1305" => Ok(CipherSuite::ChaCha20Poly1305),
            other => Err(CryptoError::InvalidInput(format!(
                "unknown cipher suite: {other}"
            ))),
        }
    }
}
