//! Key-value engine interface and the in-memory engine.
//!
//! The registry only needs string keys mapped to string values; any engine
//! that can do that durably enough for its deployment can back it.

use crate::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Trait for key-value engines.
///
/// Implementations include in-memory and RocksDB storage.
pub trait KvStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Flush any pending writes to durable storage.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// In-memory engine. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.put("did:ssikorea:a", "{}").unwrap();
        assert_eq!(store.get("did:ssikorea:a").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("did:ssikorea:nope").unwrap().is_none());
    }

    #[test]
    fn put_overwrites() {
        let store = MemoryStore::new();
        store.put("k", "one").unwrap();
        store.put("k", "two").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn arc_delegates() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let shared = Arc::clone(&store);

        shared.put("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.flush().unwrap();
    }
}
