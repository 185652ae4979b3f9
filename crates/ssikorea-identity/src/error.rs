//! Error types for identity operations.

use thiserror::Error;

/// Errors that can occur while encoding, decoding, or generating keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The string is not a base58-btc multibase value.
    #[error("invalid multibase: {0}")]
    InvalidMultibase(String),

    /// The decoded payload is too short to carry a multicodec prefix.
    #[error("invalid multicodec buffer: {len} bytes")]
    InvalidMulticodecBuffer {
        /// Length of the decoded payload.
        len: usize,
    },

    /// The multicodec prefix does not identify an Ed25519 public key.
    #[error("unsupported multicodec prefix: {0:02x?}")]
    UnsupportedCodec([u8; 2]),

    /// The public key is malformed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The secret key is malformed.
    #[error("invalid secret key")]
    InvalidSecretKey,
}

/// A specialized Result type for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;
