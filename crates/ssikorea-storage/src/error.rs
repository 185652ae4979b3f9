//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred in the underlying engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be read back.
    #[error("corruption detected: {0}")]
    Corruption(String),

    /// A document could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The requested engine is not compiled into this build.
    #[error("storage engine unavailable: {0}")]
    Unavailable(String),
}

/// A specialized Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
