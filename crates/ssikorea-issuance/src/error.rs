//! Issuance error types.

use ssikorea_did::DidError;
use ssikorea_identity::IdentityError;
use ssikorea_storage::StorageError;
use thiserror::Error;

/// Errors returned by [`IssuanceService`](crate::IssuanceService).
#[derive(Debug, Error)]
pub enum IssuanceError {
    /// The public key is not a multibase Ed25519 fingerprint.
    #[error("invalid public key encoding: {0}")]
    InvalidPublicKeyEncoding(#[from] IdentityError),

    /// The registry could not be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// A built document failed validation.
    #[error(transparent)]
    InvalidDocument(#[from] DidError),
}

impl IssuanceError {
    /// Returns true if the caller supplied bad input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidPublicKeyEncoding(_))
    }
}

/// A specialized Result type for issuance operations.
pub type Result<T> = std::result::Result<T, IssuanceError>;
