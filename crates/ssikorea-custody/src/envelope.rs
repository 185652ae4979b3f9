//! The encrypted private key envelope.
//!
//! Wire form, all binary fields in standard base64:
//!
//! ```json
//! { "version": 1, "salt": "...", "iv": "...", "ciphertext": "..." }
//! ```
//!
//! Version 1 means PBKDF2-HMAC-SHA256 with 150 000 iterations and
//! ChaCha20-Poly1305.

use crate::kdf::{derive_key_with_iterations, generate_salt, SALT_LEN};
use crate::{CustodyError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Current envelope format version.
pub const ENVELOPE_VERSION: u32 = 1;

/// Nonce length for ChaCha20-Poly1305.
pub const NONCE_LEN: usize = 12;

/// ChaCha20-Poly1305 auth tag length.
pub const AUTH_TAG_LEN: usize = 16;

/// A passphrase-encrypted private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireEnvelope", into = "WireEnvelope")]
pub struct EncryptedPrivateKey {
    /// Format version.
    pub version: u32,
    /// KDF salt.
    pub salt: [u8; SALT_LEN],
    /// AEAD nonce.
    pub iv: [u8; NONCE_LEN],
    /// Encrypted key followed by the auth tag.
    pub ciphertext: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    version: u32,
    salt: String,
    iv: String,
    ciphertext: String,
}

impl EncryptedPrivateKey {
    /// Parses an envelope from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::UnsupportedVersion`] for unknown versions and
    /// [`CustodyError::MalformedEnvelope`] for anything else that is wrong.
    pub fn from_json(json: &str) -> Result<Self> {
        let wire: WireEnvelope = serde_json::from_str(json)
            .map_err(|e| CustodyError::MalformedEnvelope(e.to_string()))?;
        Self::try_from(wire)
    }

    /// Serializes the envelope to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl TryFrom<WireEnvelope> for EncryptedPrivateKey {
    type Error = CustodyError;

    fn try_from(wire: WireEnvelope) -> Result<Self> {
        if wire.version != ENVELOPE_VERSION {
            return Err(CustodyError::UnsupportedVersion(wire.version));
        }

        let salt = decode_fixed::<SALT_LEN>("salt", &wire.salt)?;
        let iv = decode_fixed::<NONCE_LEN>("iv", &wire.iv)?;
        let ciphertext = decode_field("ciphertext", &wire.ciphertext)?;
        if ciphertext.len() < AUTH_TAG_LEN {
            return Err(CustodyError::MalformedEnvelope(format!(
                "ciphertext shorter than the {AUTH_TAG_LEN}-byte tag"
            )));
        }

        Ok(Self {
            version: wire.version,
            salt,
            iv,
            ciphertext,
        })
    }
}

impl From<EncryptedPrivateKey> for WireEnvelope {
    fn from(envelope: EncryptedPrivateKey) -> Self {
        Self {
            version: envelope.version,
            salt: STANDARD.encode(envelope.salt),
            iv: STANDARD.encode(envelope.iv),
            ciphertext: STANDARD.encode(&envelope.ciphertext),
        }
    }
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| CustodyError::MalformedEnvelope(format!("{name}: {e}")))
}

fn decode_fixed<const N: usize>(name: &str, value: &str) -> Result<[u8; N]> {
    let bytes = decode_field(name, value)?;
    bytes.as_slice().try_into().map_err(|_| {
        CustodyError::MalformedEnvelope(format!("{name} must be {N} bytes, got {}", bytes.len()))
    })
}

/// Encrypts `plaintext` under `passphrase` with a fresh salt and nonce.
pub(crate) fn seal(
    plaintext: &[u8],
    passphrase: &[u8],
    iterations: u32,
) -> Result<EncryptedPrivateKey> {
    let salt = generate_salt();
    let mut iv = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key_with_iterations(passphrase, &salt, iterations);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| CustodyError::Encryption(e.to_string()))?;

    Ok(EncryptedPrivateKey {
        version: ENVELOPE_VERSION,
        salt,
        iv,
        ciphertext,
    })
}

/// Decrypts an envelope.
///
/// Any AEAD failure, from a wrong passphrase or a modified byte anywhere in
/// the envelope, is reported as [`CustodyError::AuthenticationFailed`].
pub(crate) fn open(
    envelope: &EncryptedPrivateKey,
    passphrase: &[u8],
    iterations: u32,
) -> Result<Zeroizing<Vec<u8>>> {
    if envelope.version != ENVELOPE_VERSION {
        return Err(CustodyError::UnsupportedVersion(envelope.version));
    }

    let key = derive_key_with_iterations(passphrase, &envelope.salt, iterations);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
    cipher
        .decrypt(Nonce::from_slice(&envelope.iv), envelope.ciphertext.as_slice())
        .map(Zeroizing::new)
        .map_err(|_| CustodyError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FAST: u32 = 1_000;

    #[test]
    fn seal_open_roundtrip() {
        let secret = [9u8; 32];
        let envelope = seal(&secret, b"pw", FAST).unwrap();

        assert_eq!(envelope.version, ENVELOPE_VERSION);
        assert_eq!(envelope.ciphertext.len(), secret.len() + AUTH_TAG_LEN);
        assert_eq!(open(&envelope, b"pw", FAST).unwrap().as_slice(), &secret);
    }

    #[test]
    fn wrong_passphrase_fails_authentication() {
        let envelope = seal(&[1u8; 32], b"pw", FAST).unwrap();
        assert!(matches!(
            open(&envelope, b"pW", FAST),
            Err(CustodyError::AuthenticationFailed)
        ));
    }

    #[test]
    fn tampering_fails_authentication() {
        let envelope = seal(&[1u8; 32], b"pw", FAST).unwrap();

        let mut flipped = envelope.clone();
        flipped.ciphertext[0] ^= 0x01;
        assert!(matches!(
            open(&flipped, b"pw", FAST),
            Err(CustodyError::AuthenticationFailed)
        ));

        let mut moved = envelope;
        moved.iv[0] ^= 0x01;
        assert!(matches!(
            open(&moved, b"pw", FAST),
            Err(CustodyError::AuthenticationFailed)
        ));
    }

    #[test]
    fn salt_and_nonce_are_fresh() {
        let a = seal(&[1u8; 32], b"pw", FAST).unwrap();
        let b = seal(&[1u8; 32], b"pw", FAST).unwrap();

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn json_shape() {
        let envelope = seal(&[1u8; 32], b"pw", FAST).unwrap();
        let value: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();

        assert_eq!(value["version"], 1);
        assert_eq!(value["salt"].as_str().unwrap().len(), 24);
        assert_eq!(value["iv"].as_str().unwrap().len(), 16);
        assert_eq!(
            EncryptedPrivateKey::from_json(&envelope.to_json().unwrap()).unwrap(),
            envelope
        );
    }

    #[test]
    fn rejects_unknown_version() {
        let json = r#"{"version":2,"salt":"AAAAAAAAAAAAAAAAAAAAAA==","iv":"AAAAAAAAAAAAAAAA","ciphertext":"AAAAAAAAAAAAAAAAAAAAAA=="}"#;
        assert!(matches!(
            EncryptedPrivateKey::from_json(json),
            Err(CustodyError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn rejects_malformed_fields() {
        let short_salt = r#"{"version":1,"salt":"AAAA","iv":"AAAAAAAAAAAAAAAA","ciphertext":"AAAAAAAAAAAAAAAAAAAAAA=="}"#;
        let bad_b64 = r#"{"version":1,"salt":"!!!","iv":"AAAAAAAAAAAAAAAA","ciphertext":"AAAAAAAAAAAAAAAAAAAAAA=="}"#;
        let short_ct = r#"{"version":1,"salt":"AAAAAAAAAAAAAAAAAAAAAA==","iv":"AAAAAAAAAAAAAAAA","ciphertext":"AAAA"}"#;
        let missing = r#"{"version":1,"salt":"AAAAAAAAAAAAAAAAAAAAAA=="}"#;

        for json in [short_salt, bad_b64, short_ct, missing, "not json"] {
            assert!(
                matches!(
                    EncryptedPrivateKey::from_json(json),
                    Err(CustodyError::MalformedEnvelope(_))
                ),
                "{json}"
            );
        }
    }
}
