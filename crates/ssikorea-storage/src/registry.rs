//! The DID registry: a persistent map from DID to DID Document.
//!
//! Keys are normalized DIDs. Values are the document serialized as JSON and
//! are returned exactly as stored.

use crate::kv::KvStore;
use crate::{Result, StorageError};
use parking_lot::Mutex;
use ssikorea_did::DidDocument;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Number of lock stripes used to serialize writers of the same DID.
const LOCK_STRIPES: usize = 64;

/// Result of a registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A document is stored under the DID.
    Found(DidDocument),
    /// Nothing is stored under the DID.
    Absent,
}

impl Lookup {
    /// Returns the document if one was found.
    #[must_use]
    pub fn into_document(self) -> Option<DidDocument> {
        match self {
            Self::Found(doc) => Some(doc),
            Self::Absent => None,
        }
    }
}

/// Result of [`Registry::insert_if_absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The document was written.
    Inserted(DidDocument),
    /// A document was already stored and is returned unchanged.
    Existing(DidDocument),
}

/// Prefixes `did:` when the key lacks it.
#[must_use]
pub fn normalize_key(did: &str) -> String {
    if did.starts_with("did:") {
        did.to_string()
    } else {
        format!("did:{did}")
    }
}

/// Persistent `did -> DidDocument` map over a [`KvStore`].
pub struct Registry {
    store: Arc<dyn KvStore>,
    stripes: Box<[Mutex<()>]>,
}

impl Registry {
    /// Creates a registry over `store`.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let stripes = (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect();
        Self { store, stripes }
    }

    /// Looks up the document stored under `did`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corruption`] if the stored value is not a
    /// document, or an engine error if the read fails.
    pub fn get(&self, did: &str) -> Result<Lookup> {
        let key = normalize_key(did);
        Self::parse(&key, self.store.get(&key)?)
    }

    /// Returns the stored JSON text verbatim.
    ///
    /// # Errors
    ///
    /// Returns an engine error if the read fails.
    pub fn get_raw(&self, did: &str) -> Result<Option<String>> {
        self.store.get(&normalize_key(did))
    }

    /// Stores `doc` under `did`, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn put(&self, did: &str, doc: &DidDocument) -> Result<()> {
        let key = normalize_key(did);
        let _guard = self.stripe(&key).lock();
        self.write(&key, doc)
    }

    /// Stores `doc` under `did` unless a document is already there.
    ///
    /// The read and the write happen under the same per-DID lock, so when
    /// several callers race on one DID exactly one of them inserts and the
    /// rest observe its document.
    ///
    /// # Errors
    ///
    /// Returns an error if the read, serialization, or write fails.
    pub fn insert_if_absent(&self, did: &str, doc: DidDocument) -> Result<Insertion> {
        let key = normalize_key(did);
        let _guard = self.stripe(&key).lock();

        if let Lookup::Found(existing) = Self::parse(&key, self.store.get(&key)?)? {
            return Ok(Insertion::Existing(existing));
        }

        self.write(&key, &doc)?;
        Ok(Insertion::Inserted(doc))
    }

    /// Flushes the underlying engine.
    ///
    /// # Errors
    ///
    /// Returns an engine error if the flush fails.
    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }

    fn write(&self, key: &str, doc: &DidDocument) -> Result<()> {
        let json = serde_json::to_string(doc)?;
        self.store.put(key, &json)?;
        tracing::debug!(did = %key, "stored document");
        Ok(())
    }

    fn parse(key: &str, raw: Option<String>) -> Result<Lookup> {
        match raw {
            Some(json) => serde_json::from_str(&json).map(Lookup::Found).map_err(|e| {
                tracing::error!(did = %key, error = %e, "stored document is unreadable");
                StorageError::Corruption(format!("document for {key}: {e}"))
            }),
            None => Ok(Lookup::Absent),
        }
    }

    fn stripe(&self, key: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        // Truncation is fine: only the low bits pick a stripe.
        #[allow(clippy::cast_possible_truncation)]
        let idx = hasher.finish() as usize % self.stripes.len();
        &self.stripes[idx]
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("stripes", &self.stripes.len())
            .finish_non_exhaustive()
    }
}
