//! Error types for DID handling.

use ssikorea_identity::IdentityError;
use thiserror::Error;

/// Errors that can occur while parsing DIDs or building documents.
#[derive(Debug, Error)]
pub enum DidError {
    /// The string is not a `did:ssikorea` identifier.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// The method-specific part is not a valid fingerprint.
    #[error("invalid fingerprint: {0}")]
    Fingerprint(#[from] IdentityError),

    /// A document violates a structural invariant.
    #[error("invalid DID document: {0}")]
    InvalidDocument(String),
}

/// A specialized Result type for DID operations.
pub type Result<T> = std::result::Result<T, DidError>;
