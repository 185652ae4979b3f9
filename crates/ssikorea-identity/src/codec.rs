//! Multicodec/multibase encoding of Ed25519 public keys.
//!
//! A fingerprint is `z` followed by the base58-btc encoding of
//! `[0xED, 0x01] || public_key`. Every Ed25519 fingerprint therefore
//! starts with `z6Mk`.

use crate::{IdentityError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Varint-encoded multicodec prefix for `ed25519-pub` (code 0xED).
pub const ED25519_PUB_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Multibase prefix character for base58-btc.
pub const MULTIBASE_BASE58BTC: char = 'z';

/// Length of a raw Ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Encodes a raw Ed25519 public key as a multibase fingerprint.
#[must_use]
pub fn encode_multicodec_public_key(public_key: &[u8; PUBLIC_KEY_LEN]) -> Fingerprint {
    let mut prefixed = Vec::with_capacity(ED25519_PUB_MULTICODEC.len() + PUBLIC_KEY_LEN);
    prefixed.extend_from_slice(&ED25519_PUB_MULTICODEC);
    prefixed.extend_from_slice(public_key);

    Fingerprint {
        encoded: format!(
            "{MULTIBASE_BASE58BTC}{}",
            bs58::encode(&prefixed).into_string()
        ),
        public_key: *public_key,
    }
}

/// The two halves of a decoded multibase string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFingerprint {
    /// The first two bytes of the payload.
    pub codec_prefix: [u8; 2],
    /// Everything after the codec prefix.
    pub public_key: Vec<u8>,
}

/// Splits a multibase string into its codec prefix and key bytes.
///
/// The codec value itself is not checked; use [`is_ed25519_pub_prefix`]
/// or [`Fingerprint::parse`] when an Ed25519 key is required.
///
/// # Errors
///
/// Returns [`IdentityError::InvalidMultibase`] when the string does not start
/// with `z` or is not valid base58-btc, and
/// [`IdentityError::InvalidMulticodecBuffer`] when fewer than two bytes decode.
pub fn decode_fingerprint(s: &str) -> Result<DecodedFingerprint> {
    let encoded = s.strip_prefix(MULTIBASE_BASE58BTC).ok_or_else(|| {
        IdentityError::InvalidMultibase(format!("must start with '{MULTIBASE_BASE58BTC}'"))
    })?;

    let decoded = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| IdentityError::InvalidMultibase(e.to_string()))?;

    if decoded.len() < ED25519_PUB_MULTICODEC.len() {
        return Err(IdentityError::InvalidMulticodecBuffer { len: decoded.len() });
    }

    Ok(DecodedFingerprint {
        codec_prefix: [decoded[0], decoded[1]],
        public_key: decoded[2..].to_vec(),
    })
}

/// Returns true if `prefix` is exactly the `ed25519-pub` multicodec prefix.
#[must_use]
pub fn is_ed25519_pub_prefix(prefix: &[u8]) -> bool {
    prefix == ED25519_PUB_MULTICODEC
}

/// A validated multibase fingerprint of an Ed25519 public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint {
    encoded: String,
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl Fingerprint {
    /// Parses and validates a fingerprint string.
    ///
    /// # Errors
    ///
    /// Fails if the string is not base58-btc multibase, the codec is not
    /// `ed25519-pub`, or the key is not 32 bytes long.
    pub fn parse(s: &str) -> Result<Self> {
        let decoded = decode_fingerprint(s)?;

        if !is_ed25519_pub_prefix(&decoded.codec_prefix) {
            return Err(IdentityError::UnsupportedCodec(decoded.codec_prefix));
        }

        let public_key: [u8; PUBLIC_KEY_LEN] =
            decoded.public_key.as_slice().try_into().map_err(|_| {
                IdentityError::InvalidPublicKey(format!(
                    "expected {PUBLIC_KEY_LEN} bytes, got {}",
                    decoded.public_key.len()
                ))
            })?;

        Ok(Self {
            encoded: s.to_string(),
            public_key,
        })
    }

    /// Returns the raw public key bytes carried by this fingerprint.
    #[must_use]
    pub fn public_key_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// Returns the fingerprint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl FromStr for Fingerprint {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = IdentityError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.encoded
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn sample_key() -> [u8; 32] {
        let mut pk = [0u8; 32];
        pk[0] = 1;
        pk
    }

    #[test]
    fn fingerprint_has_ed25519_shape() {
        let fp = encode_multicodec_public_key(&sample_key());
        assert!(fp.as_str().starts_with("z6Mk"));
    }

    #[test]
    fn decode_recovers_prefix_and_key() {
        let key = sample_key();
        let fp = encode_multicodec_public_key(&key);

        let decoded = decode_fingerprint(fp.as_str()).unwrap();
        assert_eq!(decoded.codec_prefix, ED25519_PUB_MULTICODEC);
        assert_eq!(decoded.public_key, key.to_vec());
        assert_eq!(fp.public_key_bytes(), &key);
    }

    #[test]
    fn decode_rejects_missing_z() {
        let fp = encode_multicodec_public_key(&sample_key());
        let err = decode_fingerprint(&fp.as_str()[1..]).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidMultibase(_)));
    }

    #[test]
    fn decode_rejects_empty_and_non_base58() {
        assert!(matches!(
            decode_fingerprint(""),
            Err(IdentityError::InvalidMultibase(_))
        ));
        // '0' and 'O' are not in the base58 alphabet.
        assert!(matches!(
            decode_fingerprint("z0OIl"),
            Err(IdentityError::InvalidMultibase(_))
        ));
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let one_byte = format!("z{}", bs58::encode([0xedu8]).into_string());
        assert_eq!(
            decode_fingerprint(&one_byte),
            Err(IdentityError::InvalidMulticodecBuffer { len: 1 })
        );
    }

    #[test]
    fn decode_does_not_check_codec_value() {
        let mut payload = vec![0x12, 0x00];
        payload.extend_from_slice(&[7u8; 32]);
        let s = format!("z{}", bs58::encode(&payload).into_string());

        let decoded = decode_fingerprint(&s).unwrap();
        assert_eq!(decoded.codec_prefix, [0x12, 0x00]);
        assert!(!is_ed25519_pub_prefix(&decoded.codec_prefix));
        assert!(matches!(
            Fingerprint::parse(&s),
            Err(IdentityError::UnsupportedCodec([0x12, 0x00]))
        ));
    }

    #[test]
    fn prefix_check_is_exact() {
        assert!(is_ed25519_pub_prefix(&[0xed, 0x01]));
        assert!(!is_ed25519_pub_prefix(&[0xed]));
        assert!(!is_ed25519_pub_prefix(&[0xed, 0x01, 0x00]));
        assert!(!is_ed25519_pub_prefix(&[0xe7, 0x01]));
    }

    #[test]
    fn parse_rejects_wrong_key_length() {
        let mut payload = ED25519_PUB_MULTICODEC.to_vec();
        payload.extend_from_slice(&[9u8; 16]);
        let s = format!("z{}", bs58::encode(&payload).into_string());

        assert!(matches!(
            Fingerprint::parse(&s),
            Err(IdentityError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn fingerprint_serde_is_a_plain_string() {
        let fp = encode_multicodec_public_key(&sample_key());
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));

        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);

        assert!(serde_json::from_str::<Fingerprint>("\"6Mkabc\"").is_err());
    }

    proptest! {
        #[test]
        fn encoding_is_deterministic(key in any::<[u8; 32]>()) {
            let a = encode_multicodec_public_key(&key);
            let b = encode_multicodec_public_key(&key);
            prop_assert_eq!(a.as_str().as_bytes(), b.as_str().as_bytes());
        }

        #[test]
        fn decode_inverts_encode(key in any::<[u8; 32]>()) {
            let fp = encode_multicodec_public_key(&key);
            let decoded = decode_fingerprint(fp.as_str()).unwrap();
            prop_assert_eq!(decoded.codec_prefix, ED25519_PUB_MULTICODEC);
            prop_assert_eq!(decoded.public_key, key.to_vec());
            prop_assert!(Fingerprint::parse(fp.as_str()).is_ok());
        }
    }
}
