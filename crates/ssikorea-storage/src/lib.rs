//! DID document registry for SSI Korea.
//!
//! This crate provides the persistent `did -> DidDocument` map that issuance
//! reads and writes, over a pluggable key-value engine.
//!
//! # Engines
//!
//! - [`MemoryStore`]: always available, for tests and ephemeral nodes.
//! - `RocksDbStore`: durable, behind the `rocksdb-backend` feature.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod kv;
mod registry;
#[cfg(feature = "rocksdb-backend")]
mod rocksdb;

pub use error::{Result, StorageError};
pub use kv::{KvStore, MemoryStore};
pub use registry::{normalize_key, Insertion, Lookup, Registry};
#[cfg(feature = "rocksdb-backend")]
pub use rocksdb::{RocksDbConfig, RocksDbStore};

use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;

/// Which engine backs the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// In-memory engine.
    Memory,
    /// RocksDB engine rooted at the given directory.
    RocksDb(PathBuf),
}

/// Opens a fresh engine for `config`.
///
/// # Errors
///
/// Returns [`StorageError::Unavailable`] when RocksDB is requested but the
/// crate was built without `rocksdb-backend`, or an engine error on open.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn KvStore>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "rocksdb-backend")]
        StoreConfig::RocksDb(path) => Ok(Arc::new(RocksDbStore::open_default(path)?)),
        #[cfg(not(feature = "rocksdb-backend"))]
        StoreConfig::RocksDb(path) => Err(StorageError::Unavailable(format!(
            "rocksdb at {} (built without the rocksdb-backend feature)",
            path.display()
        ))),
    }
}

static SHARED_REGISTRY: OnceCell<Arc<Registry>> = OnceCell::new();

/// Returns the process-wide registry, opening it on first use.
///
/// Later calls return the same handle regardless of `config`. Two handles to
/// one database directory would not share their per-DID locks, so the
/// process never opens more than one.
///
/// # Errors
///
/// Returns the error from [`open_store`] if the first open fails; a later
/// call will try again.
pub fn shared_registry(config: &StoreConfig) -> Result<Arc<Registry>> {
    SHARED_REGISTRY
        .get_or_try_init(|| {
            tracing::info!(?config, "opening shared registry");
            open_store(config).map(|store| Arc::new(Registry::new(store)))
        })
        .map(Arc::clone)
}
