//! Client-side envelope storage.
//!
//! Envelopes are kept under application-chosen names. Writing a name that
//! already exists replaces the envelope stored there.

use crate::envelope::EncryptedPrivateKey;
use crate::{CustodyError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Trait for envelope stores.
#[async_trait]
pub trait EnvelopeStore: Send + Sync {
    /// Retrieves the envelope stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<EncryptedPrivateKey>>;

    /// Stores an envelope, replacing any previous one under `key`.
    async fn put(&self, key: &str, envelope: &EncryptedPrivateKey) -> Result<()>;

    /// Deletes an envelope. Returns whether one was stored.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Lists all stored names.
    async fn list_keys(&self) -> Result<Vec<String>>;
}

/// File-based envelope store.
///
/// The file is a JSON object mapping names to envelopes. It is read once on
/// open and rewritten in full after every change.
/// Changes are staged on a copy of the map and only become visible once the
/// file has been replaced.
#[derive(Debug)]
pub struct FileEnvelopeStore {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, EncryptedPrivateKey>>,
    writer: tokio::sync::Mutex<()>,
}

impl FileEnvelopeStore {
    /// Opens the store at `path`, loading it if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            cache: RwLock::new(BTreeMap::new()),
            writer: tokio::sync::Mutex::new(()),
        };
        store.load()?;
        Ok(store)
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let envelopes: BTreeMap<String, EncryptedPrivateKey> = serde_json::from_str(&content)
            .map_err(|e| {
                CustodyError::Storage(format!("{}: {e}", self.path.display()))
            })?;

        tracing::debug!(path = %self.path.display(), count = envelopes.len(), "loaded keystore");
        *self.cache.write() = envelopes;
        Ok(())
    }

    /// Writes `envelopes` to disk, then publishes them to the cache.
    ///
    /// Callers must hold `writer`.
    async fn commit(&self, envelopes: BTreeMap<String, EncryptedPrivateKey>) -> Result<()> {
        let content = serde_json::to_string_pretty(&envelopes)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, content.as_bytes()))
            .await
            .map_err(|e| CustodyError::Task(e.to_string()))??;

        *self.cache.write() = envelopes;
        Ok(())
    }
}

/// Replaces `path` with `content` through a synced temp file and a rename.
fn write_atomically(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("tmp");
    let mut file = std::fs::File::create(&tmp)?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl EnvelopeStore for FileEnvelopeStore {
    async fn get(&self, key: &str) -> Result<Option<EncryptedPrivateKey>> {
        Ok(self.cache.read().get(key).cloned())
    }

    async fn put(&self, key: &str, envelope: &EncryptedPrivateKey) -> Result<()> {
        let _writer = self.writer.lock().await;

        let mut next = self.cache.read().clone();
        next.insert(key.to_string(), envelope.clone());
        self.commit(next).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let _writer = self.writer.lock().await;

        let mut next = self.cache.read().clone();
        if next.remove(key).is_none() {
            return Ok(false);
        }
        self.commit(next).await?;
        Ok(true)
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.cache.read().keys().cloned().collect())
    }
}

/// In-memory envelope store for testing.
#[derive(Debug, Default)]
pub struct MemoryEnvelopeStore {
    envelopes: RwLock<BTreeMap<String, EncryptedPrivateKey>>,
}

impl MemoryEnvelopeStore {
    /// Creates a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EnvelopeStore for MemoryEnvelopeStore {
    async fn get(&self, key: &str) -> Result<Option<EncryptedPrivateKey>> {
        Ok(self.envelopes.read().get(key).cloned())
    }

    async fn put(&self, key: &str, envelope: &EncryptedPrivateKey) -> Result<()> {
        self.envelopes
            .write()
            .insert(key.to_string(), envelope.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.envelopes.write().remove(key).is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.envelopes.read().keys().cloned().collect())
    }
}
