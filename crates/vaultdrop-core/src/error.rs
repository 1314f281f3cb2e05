//! Error types for vaultdrop core.

use thiserror::Error;

/// Errors produced by the transport codecs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("hex input has odd length {0}")]
    OddLength(usize),

    #[error("invalid hex character {c:?} at index {index}")]
    InvalidHexCharacter { c: char, index: usize },

    #[error("expected {expected} decoded bytes, got {actual}")]
    UnexpectedLength { expected: usize, actual: usize },

    #[error("invalid base64: {0}")]
    InvalidBase64(String),
}

/// Errors that can occur while encrypting or decrypting an envelope.
///
/// The decrypt-path variants are deliberately coarse: `Unwrap` and
/// `Authentication` carry no detail about which check failed.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Missing or malformed input (metadata fields, nonce length, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Key material could not be parsed or is unusable.
    #[error("key import failed: {0}")]
    KeyImport(String),

    /// A primitive failed for a reason other than verification.
    #[error("crypto operation failed: {0}")]
    Operation(String),

    /// The wrapped content key could not be recovered.
    #[error("unable to unwrap content key")]
    Unwrap,

    /// The AEAD tag did not verify.
    #[error("ciphertext authentication failed")]
    Authentication,

    /// The decrypted payload is too short to contain a digest.
    #[error("malformed payload: {len} bytes is shorter than the {min}-byte digest")]
    MalformedPayload { len: usize, min: usize },

    /// The embedded digest does not match the recovered file.
    #[error("integrity check failed: embedded digest does not match content")]
    Integrity,
}

impl From<CodecError> for CryptoError {
    fn from(e: CodecError) -> Self {
        CryptoError::InvalidInput(e.to_string())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
