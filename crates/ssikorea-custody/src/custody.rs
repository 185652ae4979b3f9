//! Passphrase-protected storage of private keys.

use crate::envelope::{self, EncryptedPrivateKey};
use crate::kdf::PBKDF2_ITERATIONS;
use crate::{CustodyError, EnvelopeStore, Passphrase, Result};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Encrypts private keys under a passphrase and keeps the envelopes in an
/// [`EnvelopeStore`].
///
/// Key derivation and AEAD run on the blocking thread pool.
#[derive(Clone)]
pub struct KeyCustody {
    store: Arc<dyn EnvelopeStore>,
    iterations: u32,
}

impl KeyCustody {
    /// Creates a custody over `store`.
    pub fn new(store: Arc<dyn EnvelopeStore>) -> Self {
        Self {
            store,
            iterations: PBKDF2_ITERATIONS,
        }
    }

    /// Lowers the KDF cost. Envelopes made this way only open with the same
    /// count.
    #[cfg(test)]
    pub(crate) fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Encrypts `private_key` and stores it under `storage_key`, replacing
    /// any envelope already there.
    ///
    /// Every call draws a fresh salt and nonce.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption or the store write fails.
    pub async fn encrypt(
        &self,
        storage_key: &str,
        private_key: &[u8],
        passphrase: &Passphrase,
    ) -> Result<EncryptedPrivateKey> {
        let plaintext = Zeroizing::new(private_key.to_vec());
        let passphrase = passphrase.clone();
        let iterations = self.iterations;

        let envelope = tokio::task::spawn_blocking(move || {
            envelope::seal(&plaintext, passphrase.expose(), iterations)
        })
        .await
        .map_err(|e| CustodyError::Task(e.to_string()))??;

        self.store.put(storage_key, &envelope).await?;
        tracing::info!(storage_key, "stored encrypted private key");
        Ok(envelope)
    }

    /// Loads and decrypts the key stored under `storage_key`.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::AuthenticationFailed`] for a wrong passphrase
    /// or a tampered envelope.
    pub async fn decrypt(
        &self,
        storage_key: &str,
        passphrase: &Passphrase,
    ) -> Result<Option<Zeroizing<Vec<u8>>>> {
        let Some(envelope) = self.store.get(storage_key).await? else {
            tracing::debug!(storage_key, "no envelope stored");
            return Ok(None);
        };

        let passphrase = passphrase.clone();
        let iterations = self.iterations;
        let plaintext = tokio::task::spawn_blocking(move || {
            envelope::open(&envelope, passphrase.expose(), iterations)
        })
        .await
        .map_err(|e| CustodyError::Task(e.to_string()))?
        .inspect_err(|e| {
            if matches!(e, CustodyError::AuthenticationFailed) {
                tracing::warn!(storage_key, "envelope failed authentication");
            }
        })?;

        Ok(Some(plaintext))
    }

    /// Removes the envelope under `storage_key`. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub async fn delete(&self, storage_key: &str) -> Result<bool> {
        let existed = self.store.delete(storage_key).await?;
        tracing::info!(storage_key, existed, "deleted encrypted private key");
        Ok(existed)
    }

    /// Lists stored names.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn list(&self) -> Result<Vec<String>> {
        self.store.list_keys().await
    }
}

impl std::fmt::Debug for KeyCustody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCustody")
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}
