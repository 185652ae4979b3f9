//! Decentralized Identifier handling.
//!
//! Format: `did:ssikorea:<fingerprint>` where the fingerprint is the
//! multibase-encoded Ed25519 public key, so one DID names exactly one key.

use crate::{DidError, Result};
use serde::{Deserialize, Serialize};
use ssikorea_identity::Fingerprint;
use std::fmt;
use std::str::FromStr;

/// The URI scheme shared by all DIDs.
pub const DID_SCHEME: &str = "did";

/// The DID method name.
pub const DID_METHOD: &str = "ssikorea";

/// Fragment of the single verification method every document carries.
pub const PRIMARY_KEY_FRAGMENT: &str = "#key-1";

/// A parsed `did:ssikorea` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did {
    fingerprint: Fingerprint,
}

impl Did {
    /// Creates the DID for a fingerprint.
    #[must_use]
    pub fn from_fingerprint(fingerprint: Fingerprint) -> Self {
        Self { fingerprint }
    }

    /// Returns the fingerprint this DID is derived from.
    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Returns the absolute id of the primary verification key.
    #[must_use]
    pub fn key_id(&self) -> String {
        format!("{self}{PRIMARY_KEY_FRAGMENT}")
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DID_SCHEME}:{DID_METHOD}:{}", self.fingerprint)
    }
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        if parts.next() != Some(DID_SCHEME) {
            return Err(DidError::InvalidDid(format!(
                "must start with '{DID_SCHEME}:'"
            )));
        }
        if parts.next() != Some(DID_METHOD) {
            return Err(DidError::InvalidDid(format!(
                "method must be '{DID_METHOD}'"
            )));
        }
        let fingerprint = parts
            .next()
            .ok_or_else(|| DidError::InvalidDid("missing method-specific id".into()))?;

        Ok(Self {
            fingerprint: Fingerprint::parse(fingerprint)?,
        })
    }
}

impl TryFrom<String> for Did {
    type Error = DidError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.to_string()
    }
}
