//! PBKDF2-HMAC-SHA256 key derivation for passphrase-based encryption.
//!
//! Produces a 256-bit key from a passphrase and a 16-byte salt.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Iteration count used for every version 1 envelope.
pub const PBKDF2_ITERATIONS: u32 = 150_000;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes.
pub const KEY_LEN: usize = 32;

/// Generate a random 16-byte salt.
#[must_use]
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 32-byte key from a passphrase.
#[must_use]
pub fn derive_key(passphrase: &[u8], salt: &[u8; SALT_LEN]) -> Zeroizing<[u8; KEY_LEN]> {
    derive_key_with_iterations(passphrase, salt, PBKDF2_ITERATIONS)
}

pub(crate) fn derive_key_with_iterations(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(passphrase, salt, iterations, &mut key[..]);
    key
}
