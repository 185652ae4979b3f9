//! # SSI Korea Custody
//!
//! Client-side custody of Ed25519 private keys.
//!
//! A private key is encrypted under a key derived from the user's passphrase
//! and kept as a versioned envelope in an [`EnvelopeStore`]. Raw key bytes are
//! never persisted.
//!
//! ## Algorithms
//!
//! - **Key derivation**: PBKDF2-HMAC-SHA256, 150 000 iterations, 16-byte salt
//! - **Encryption**: ChaCha20-Poly1305, 12-byte nonce
//!
//! A wrong passphrase and a tampered envelope both surface as
//! [`CustodyError::AuthenticationFailed`]; a missing envelope is `Ok(None)`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod custody;
mod envelope;
mod error;
mod kdf;
mod passphrase;
mod store;

pub use custody::KeyCustody;
pub use envelope::{EncryptedPrivateKey, AUTH_TAG_LEN, ENVELOPE_VERSION, NONCE_LEN};
pub use error::{CustodyError, Result};
pub use kdf::{derive_key, generate_salt, KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
pub use passphrase::Passphrase;
pub use store::{EnvelopeStore, FileEnvelopeStore, MemoryEnvelopeStore};
