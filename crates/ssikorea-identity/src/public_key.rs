//! Ed25519 public key, as carried inside a fingerprint.

use crate::codec::{encode_multicodec_public_key, Fingerprint, PUBLIC_KEY_LEN};
use crate::{IdentityError, Result};
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An Ed25519 public key that is known to be a valid curve point.
///
/// Serializes as its multibase fingerprint (`z6Mk...`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    pub(crate) fn from_verifying_key(key: VerifyingKey) -> Self {
        Self(key)
    }

    /// Checks that `bytes` are 32 bytes forming a valid point.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidPublicKey`] otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: &[u8; PUBLIC_KEY_LEN] = bytes.try_into().map_err(|_| {
            IdentityError::InvalidPublicKey(format!(
                "{} bytes, want {PUBLIC_KEY_LEN}",
                bytes.len()
            ))
        })?;

        VerifyingKey::from_bytes(raw)
            .map(Self)
            .map_err(|e| IdentityError::InvalidPublicKey(e.to_string()))
    }

    /// Lifts the key bytes out of a parsed fingerprint.
    ///
    /// [`Fingerprint::parse`] only checks lengths and the codec, so a
    /// fingerprint may still carry bytes that are not on the curve.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidPublicKey`] for an invalid point.
    pub fn from_fingerprint(fingerprint: &Fingerprint) -> Result<Self> {
        Self::from_bytes(fingerprint.public_key_bytes())
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        self.0.as_bytes()
    }

    /// Multibase fingerprint of this key.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        encode_multicodec_public_key(self.as_bytes())
    }
}

impl FromStr for PublicKey {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_fingerprint(&Fingerprint::parse(s)?)
    }
}

impl TryFrom<String> for PublicKey {
    type Error = IdentityError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.fingerprint().as_str().to_string()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.fingerprint().as_str()).finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fingerprint().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Keypair;
    use pretty_assertions::assert_eq;

    #[test]
    fn fingerprint_round_trip() {
        let pk = Keypair::generate().public_key();
        let parsed: PublicKey = pk.fingerprint().as_str().parse().unwrap();
        assert_eq!(parsed, pk);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            PublicKey::from_bytes(&[1u8; 31]),
            Err(IdentityError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn debug_shows_fingerprint_only() {
        let pk = Keypair::generate().public_key();
        assert_eq!(format!("{pk:?}"), format!("PublicKey({:?})", pk.to_string()));
    }

    #[test]
    fn serde_json_uses_fingerprint() {
        let pk = Keypair::generate().public_key();

        let json = serde_json::to_string(&pk).unwrap();
        assert!(json.starts_with("\"z6Mk"));
        assert_eq!(serde_json::from_str::<PublicKey>(&json).unwrap(), pk);

        assert!(serde_json::from_str::<PublicKey>("\"6Mkabc\"").is_err());
    }
}
