//! # SSI Korea Identity
//!
//! Ed25519 key generation and the multicodec/multibase fingerprint that
//! names a `did:ssikorea` identifier.
//!
//! ## Example
//!
//! ```rust
//! use ssikorea_identity::{decode_fingerprint, generate_key_pair, ED25519_PUB_MULTICODEC};
//!
//! let generated = generate_key_pair();
//! assert!(generated.fingerprint.as_str().starts_with("z6Mk"));
//!
//! let decoded = decode_fingerprint(generated.fingerprint.as_str()).unwrap();
//! assert_eq!(decoded.codec_prefix, ED25519_PUB_MULTICODEC);
//! assert_eq!(decoded.public_key, generated.public_key.as_bytes().to_vec());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod error;
mod keypair;
mod public_key;

pub use codec::{
    decode_fingerprint, encode_multicodec_public_key, is_ed25519_pub_prefix, DecodedFingerprint,
    Fingerprint, ED25519_PUB_MULTICODEC, MULTIBASE_BASE58BTC, PUBLIC_KEY_LEN,
};
pub use error::{IdentityError, Result};
pub use keypair::{generate_key_pair, GeneratedKeyPair, Keypair, SECRET_KEY_LEN};
pub use public_key::PublicKey;
