//! Envelope types.
//!
//! A sealed envelope is the AEAD ciphertext of `file || sha256(file)`
//! together with everything needed to open it except the private key: the
//! RSA-OAEP wrapped content key, the nonce and the cipher suite. The
//! ciphertext travels as the blob body; the rest travels as
//! [`EnvelopeMetadata`], hex-encoded.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::codec::{hex_decode, hex_decode_array, hex_encode};
use crate::crypto::{CipherSuite, EnvelopeNonce, Sha256Digest, DIGEST_LEN, TAG_LEN};
use crate::error::{CryptoError, Result};

/// Output of an envelope encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedEnvelope {
    /// AEAD used for the body.
    pub suite: CipherSuite,

    /// Encrypted `file || digest`, tag appended.
    pub ciphertext: Vec<u8>,

    /// Content key wrapped for the recipient.
    pub wrapped_key: Vec<u8>,

    /// Nonce used for the body (unique per envelope).
    pub nonce: EnvelopeNonce,

    /// SHA-256 of the plaintext file, for display.
    pub digest: Sha256Digest,
}

impl SealedEnvelope {
    /// The text form of everything but the ciphertext.
    pub fn metadata(&self) -> EnvelopeMetadata {
        EnvelopeMetadata {
            wrapped_key_hex: hex_encode(&self.wrapped_key),
            iv_hex: self.nonce.to_hex(),
            file_hash_hex: self.digest.to_hex(),
            cipher: Some(self.suite),
        }
    }

    /// Reassemble an envelope from a stored blob and its metadata.
    pub fn from_parts(ciphertext: Vec<u8>, metadata: &EnvelopeMetadata) -> Result<Self> {
        let header = metadata.decode()?;
        Ok(Self {
            suite: header.suite,
            ciphertext,
            wrapped_key: header.wrapped_key,
            nonce: header.nonce,
            digest: header.digest,
        })
    }

    /// Length of the plaintext file this envelope carries.
    pub fn plaintext_len(&self) -> Option<usize> {
        self.ciphertext.len().checked_sub(TAG_LEN + DIGEST_LEN)
    }
}

/// Envelope header fields as they appear in stored records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    /// OAEP-wrapped 256-bit content key. Early clients sent it as
    /// `encryptedAESKeyHex`.
    #[serde(alias = "encryptedAESKeyHex")]
    pub wrapped_key_hex: String,

    /// 12-byte nonce.
    pub iv_hex: String,

    /// 32-byte SHA-256 of the plaintext.
    pub file_hash_hex: String,

    /// Body AEAD. Absent means AES-256-GCM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cipher: Option<CipherSuite>,
}

/// Decoded, length-checked envelope header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub suite: CipherSuite,
    pub wrapped_key: Vec<u8>,
    pub nonce: EnvelopeNonce,
    pub digest: Sha256Digest,
}

impl EnvelopeMetadata {
    /// Decode and validate the hex fields.
    pub fn decode(&self) -> Result<EnvelopeHeader> {
        let wrapped_key = hex_decode(&self.wrapped_key_hex)
            .map_err(|e| CryptoError::InvalidInput(format!("wrappedKeyHex: {e}")))?;
        if wrapped_key.is_empty() {
            return Err(CryptoError::InvalidInput("wrappedKeyHex is empty".into()));
        }
        let nonce = hex_decode_array(&self.iv_hex)
            .map_err(|e| CryptoError::InvalidInput(format!("ivHex: {e}")))?;
        let digest = hex_decode_array(&self.file_hash_hex)
            .map_err(|e| CryptoError::InvalidInput(format!("fileHashHex: {e}")))?;

        Ok(EnvelopeHeader {
            suite: self.cipher.unwrap_or_default(),
            wrapped_key,
            nonce: EnvelopeNonce::from_bytes(nonce),
            digest: Sha256Digest::from_bytes(digest),
        })
    }

    /// Check the fields without keeping the decoded values.
    pub fn validate(&self) -> Result<()> {
        self.decode().map(|_| ())
    }
}

/// Build the authenticated unit: `file || sha256(file)`.
pub(crate) fn build_payload(file: &[u8]) -> (Vec<u8>, Sha256Digest) {
    let digest = Sha256Digest::hash(file);
    let mut payload = Vec::with_capacity(file.len() + DIGEST_LEN);
    payload.extend_from_slice(file);
    payload.extend_from_slice(digest.as_bytes());
    (payload, digest)
}

/// Strip and verify the trailing digest of a decrypted payload.
///
/// This check is redundant with the AEAD tag and stays as a second line of
/// defence. The buffer is wiped before any error is returned.
pub(crate) fn verify_payload(mut payload: Vec<u8>) -> Result<Vec<u8>> {
    let len = payload.len();
    if len < DIGEST_LEN {
        payload.zeroize();
        return Err(CryptoError::MalformedPayload {
            len,
            min: DIGEST_LEN,
        });
    }

    let split = len - DIGEST_LEN;
    let recomputed = Sha256Digest::hash(&payload[..split]);
    if recomputed.as_bytes()[..] != payload[split..] {
        payload.zeroize();
        return Err(CryptoError::Integrity);
    }

    payload.truncate(split);
    Ok(payload)
}
