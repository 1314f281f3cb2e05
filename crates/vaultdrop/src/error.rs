//! Error types for the unified API.

use thiserror::Error;
use vaultdrop_core::CryptoError;
use vaultdrop_store::StoreError;

/// Errors that can occur in a send or fetch pipeline.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Encryption, decryption or key import failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Bad configuration value.
    #[error("invalid value for {var}: {value:?}")]
    Config { var: &'static str, value: String },

    /// Local file I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking crypto task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl VaultError {
    /// Whether the failure is transient and the whole pipeline may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, VaultError::Store(e) if e.is_transient())
    }

    /// Whether the id was unknown or its blob is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VaultError::Store(e) if e.is_not_found())
    }
}

impl From<tokio::task::JoinError> for VaultError {
    fn from(e: tokio::task::JoinError) -> Self {
        VaultError::Task(e.to_string())
    }
}

/// Result type for unified API operations.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(VaultError::from(StoreError::Unavailable("timeout".into())).is_transient());
        assert!(!VaultError::from(StoreError::NotFound("x".into())).is_transient());
        assert!(!VaultError::from(CryptoError::Authentication).is_transient());
        assert!(VaultError::from(StoreError::NotFound("x".into())).is_not_found());
    }
}
