//! Error types for the custody crate.

use thiserror::Error;

/// Result type alias for custody operations.
pub type Result<T> = std::result::Result<T, CustodyError>;

/// Errors that can occur while sealing, opening, or storing private keys.
#[derive(Debug, Error)]
pub enum CustodyError {
    /// Wrong passphrase, or the envelope was tampered with.
    #[error("authentication failed: wrong passphrase or tampered envelope")]
    AuthenticationFailed,

    /// The envelope is not well-formed.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The envelope was written by an unknown format version.
    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(u32),

    /// Encryption itself failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The envelope store could not be read or written.
    #[error("envelope storage error: {0}")]
    Storage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking crypto task did not complete.
    #[error("crypto task failed: {0}")]
    Task(String),
}
