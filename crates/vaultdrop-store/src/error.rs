//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The id is not a well-formed file id.
    #[error("invalid file id: {0}")]
    InvalidId(String),

    /// Caller metadata is missing envelope fields or they are malformed.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// No record for this id, or the record's blob is gone.
    #[error("file not found: {0}")]
    NotFound(String),

    /// A blob or record could not be persisted. Nothing was published.
    #[error("write failed: {0}")]
    Write(String),

    /// A stored record could not be decoded.
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },

    /// The backend could not be reached in time. Safe to retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// I/O error on the read path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the failure is transient and the operation may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }

    /// Whether this is a not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(StoreError::Unavailable("timeout".into()).is_transient());
        assert!(!StoreError::NotFound("x".into()).is_transient());
        assert!(!StoreError::Write("disk full".into()).is_transient());
        assert!(StoreError::NotFound("x".into()).is_not_found());
    }
}
