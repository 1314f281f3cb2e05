//! Recipient key material.
//!
//! The recipient holds an RSA key pair. The public half (SPKI DER) wraps
//! content keys with RSA-OAEP; the private half (PKCS#8 DER) unwraps them.
//! OAEP uses SHA-256 for both the label hash and MGF1.
//!
//! Keys arrive as text more often than not, so each half can be imported
//! from raw DER, hex, base64 or PEM. Whitespace inside hex and base64 text
//! is ignored.

use std::fmt;

use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::codec::{base64_decode, hex_decode, strip_whitespace};
use crate::crypto::{ContentKey, Sha256Digest, KEY_LEN};
use crate::error::{CryptoError, Result};

/// Smallest accepted RSA modulus, in bits.
pub const MIN_MODULUS_BITS: usize = 2048;

/// How a textual key was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEncoding {
    Pem,
    Hex,
    Base64,
}

impl KeyEncoding {
    /// Guess the encoding of key text.
    ///
    /// PEM armour wins; otherwise text made only of hex digits is hex and
    /// anything else is treated as base64.
    pub fn detect(text: &str) -> Self {
        let trimmed = text.trim_start();
        if trimmed.starts_with("-----BEGIN") {
            return KeyEncoding::Pem;
        }
        let compact = strip_whitespace(text);
        if !compact.is_empty() && compact.bytes().all(|b| b.is_ascii_hexdigit()) {
            KeyEncoding::Hex
        } else {
            KeyEncoding::Base64
        }
    }
}

fn decode_hex_text(text: &str) -> Result<Vec<u8>> {
    hex_decode(&strip_whitespace(text)).map_err(|e| CryptoError::KeyImport(e.to_string()))
}

fn decode_base64_text(text: &str) -> Result<Vec<u8>> {
    base64_decode(&strip_whitespace(text)).map_err(|e| CryptoError::KeyImport(e.to_string()))
}

fn check_modulus(bits: usize) -> Result<()> {
    if bits < MIN_MODULUS_BITS {
        return Err(CryptoError::KeyImport(format!(
            "RSA modulus of {bits} bits is below the {MIN_MODULUS_BITS}-bit minimum"
        )));
    }
    Ok(())
}

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

/// A recipient's public key. Wraps content keys.
#[derive(Clone, PartialEq, Eq)]
pub struct RecipientPublicKey(RsaPublicKey);

impl RecipientPublicKey {
    /// Import from SPKI DER bytes.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let key = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| CryptoError::KeyImport(format!("invalid SPKI public key: {e}")))?;
        Self::from_rsa(key)
    }

    /// Import from hex-encoded SPKI DER.
    pub fn from_hex(text: &str) -> Result<Self> {
        Self::from_der(&decode_hex_text(text)?)
    }

    /// Import from base64-encoded SPKI DER.
    pub fn from_base64(text: &str) -> Result<Self> {
        Self::from_der(&decode_base64_text(text)?)
    }

    /// Import from a `PUBLIC KEY` PEM block.
    pub fn from_pem(text: &str) -> Result<Self> {
        let key = RsaPublicKey::from_public_key_pem(text.trim())
            .map_err(|e| CryptoError::KeyImport(format!("invalid PEM public key: {e}")))?;
        Self::from_rsa(key)
    }

    /// Import from text in any supported encoding.
    pub fn parse(text: &str) -> Result<Self> {
        match KeyEncoding::detect(text) {
            KeyEncoding::Pem => Self::from_pem(text),
            KeyEncoding::Hex => Self::from_hex(text),
            KeyEncoding::Base64 => Self::from_base64(text),
        }
    }

    /// Wrap an existing RSA key, enforcing the modulus minimum.
    pub fn from_rsa(key: RsaPublicKey) -> Result<Self> {
        check_modulus(key.n().bits())?;
        Ok(Self(key))
    }

    /// Export as SPKI DER.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.0
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CryptoError::Operation(format!("SPKI encoding failed: {e}")))
    }

    /// SHA-256 of the SPKI DER encoding, for display and logs.
    pub fn fingerprint(&self) -> Result<Sha256Digest> {
        Ok(Sha256Digest::hash(&self.to_der()?))
    }

    /// Length of a wrapped key in bytes (the modulus size).
    pub fn wrapped_key_len(&self) -> usize {
        self.0.size()
    }

    /// Wrap a content key with RSA-OAEP.
    pub fn wrap_key(&self, key: &ContentKey) -> Result<Vec<u8>> {
        self.0
            .encrypt(&mut rand::thread_rng(), oaep(), key.as_bytes())
            .map_err(|e| CryptoError::Operation(format!("RSA-OAEP wrap failed: {e}")))
    }
}

impl fmt::Debug for RecipientPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fingerprint() {
            Ok(fp) => write!(f, "RecipientPublicKey({}, {fp:?})", self.0.n().bits()),
            Err(_) => write!(f, "RecipientPublicKey({})", self.0.n().bits()),
        }
    }
}

/// A recipient's private key. Unwraps content keys.
///
/// Never serialised and never printed.
pub struct RecipientPrivateKey(RsaPrivateKey);

impl RecipientPrivateKey {
    /// Import from PKCS#8 DER bytes.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| CryptoError::KeyImport(format!("invalid PKCS#8 private key: {e}")))?;
        Self::from_rsa(key)
    }

    /// Import from hex-encoded PKCS#8 DER.
    pub fn from_hex(text: &str) -> Result<Self> {
        let der = Zeroizing::new(decode_hex_text(text)?);
        Self::from_der(&der)
    }

    /// Import from base64-encoded PKCS#8 DER.
    pub fn from_base64(text: &str) -> Result<Self> {
        let der = Zeroizing::new(decode_base64_text(text)?);
        Self::from_der(&der)
    }

    /// Import from a `PRIVATE KEY` PEM block.
    pub fn from_pem(text: &str) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs8_pem(text.trim())
            .map_err(|e| CryptoError::KeyImport(format!("invalid PEM private key: {e}")))?;
        Self::from_rsa(key)
    }

    /// Import from text in any supported encoding.
    pub fn parse(text: &str) -> Result<Self> {
        match KeyEncoding::detect(text) {
            KeyEncoding::Pem => Self::from_pem(text),
            KeyEncoding::Hex => Self::from_hex(text),
            KeyEncoding::Base64 => Self::from_base64(text),
        }
    }

    /// Wrap an existing RSA key, enforcing the modulus minimum.
    pub fn from_rsa(key: RsaPrivateKey) -> Result<Self> {
        check_modulus(key.n().bits())?;
        Ok(Self(key))
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> RecipientPublicKey {
        RecipientPublicKey(self.0.to_public_key())
    }

    /// Recover a content key wrapped with [`RecipientPublicKey::wrap_key`].
    ///
    /// Every failure, whatever its cause, is the same [`CryptoError::Unwrap`].
    /// The private-key operation is blinded with fresh randomness per call.
    pub fn unwrap_key(&self, wrapped: &[u8]) -> Result<ContentKey> {
        let raw = Zeroizing::new(
            self.0
                .decrypt_blinded(&mut rand::thread_rng(), oaep(), wrapped)
                .map_err(|_| CryptoError::Unwrap)?,
        );
        let bytes: [u8; KEY_LEN] = raw.as_slice().try_into().map_err(|_| CryptoError::Unwrap)?;
        Ok(ContentKey::from_bytes(bytes))
    }
}

impl fmt::Debug for RecipientPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecipientPrivateKey(..)")
    }
}
