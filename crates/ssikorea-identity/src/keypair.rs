//! Ed25519 keypair generation.

use crate::codec::Fingerprint;
use crate::{IdentityError, PublicKey, Result};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Length of an Ed25519 secret seed in bytes.
pub const SECRET_KEY_LEN: usize = 32;

/// An Ed25519 keypair.
///
/// The secret half never leaves this type except through
/// [`Keypair::secret_bytes`], which returns a zeroizing copy.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generates a new random keypair from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Creates a keypair from a secret key (32 bytes).
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is not 32 bytes long.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_LEN {
            return Err(IdentityError::InvalidSecretKey);
        }

        let mut secret = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        secret.copy_from_slice(bytes);

        let signing_key = SigningKey::from_bytes(&secret);
        Ok(Self { signing_key })
    }

    /// Returns the public key for this keypair.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Returns the multibase fingerprint of the public key.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.public_key().fingerprint()
    }

    /// Returns the secret key bytes.
    ///
    /// # Security
    ///
    /// Handle with care. The returned buffer is zeroized on drop.
    #[must_use]
    pub fn secret_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LEN]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// A freshly generated keypair together with its fingerprint.
#[derive(Debug)]
pub struct GeneratedKeyPair {
    /// The keypair, holding the private seed.
    pub keypair: Keypair,
    /// The public key.
    pub public_key: PublicKey,
    /// Multibase fingerprint of `public_key`.
    pub fingerprint: Fingerprint,
}

/// Generates an Ed25519 keypair and derives its fingerprint in one step.
#[must_use]
pub fn generate_key_pair() -> GeneratedKeyPair {
    let keypair = Keypair::generate();
    let public_key = keypair.public_key();
    let fingerprint = public_key.fingerprint();

    GeneratedKeyPair {
        keypair,
        public_key,
        fingerprint,
    }
}
