//! RocksDB persistent storage engine.
//!
//! Documents live in a single column family. Writes go through the
//! write-ahead log so an acknowledged registration survives a crash.

use crate::kv::KvStore;
use crate::{Result, StorageError};
use rocksdb::{
    BlockBasedOptions, ColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded,
    Options, WriteOptions, DB,
};
use std::path::{Path, PathBuf};

/// RocksDB storage configuration.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory.
    pub path: PathBuf,

    /// Write buffer size in bytes.
    pub write_buffer_size: usize,

    /// Number of background compaction threads.
    pub background_jobs: i32,

    /// Sync the write-ahead log on every write.
    pub sync_writes: bool,

    /// Enable LZ4 compression.
    pub compression_enabled: bool,

    /// Bloom filter bits per key (0 to disable).
    pub bloom_filter_bits: i32,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/registry"),
            write_buffer_size: 16 * 1024 * 1024, // 16 MB
            background_jobs: 2,
            sync_writes: true,
            compression_enabled: true,
            bloom_filter_bits: 10,
        }
    }
}

/// Column family holding `did -> document JSON`.
const CF_DID_DOCUMENTS: &str = "did_documents";

/// RocksDB-backed key-value engine.
pub struct RocksDbStore {
    db: DBWithThreadMode<MultiThreaded>,
    config: RocksDbConfig,
}

fn engine_err(e: &rocksdb::Error) -> StorageError {
    StorageError::Io(std::io::Error::other(e.to_string()))
}

impl RocksDbStore {
    /// Opens or creates a database.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the database cannot be opened.
    pub fn open(config: RocksDbConfig) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        opts.set_write_buffer_size(config.write_buffer_size);
        opts.increase_parallelism(config.background_jobs);
        opts.set_max_background_jobs(config.background_jobs);

        if config.compression_enabled {
            opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        }

        let mut block_opts = BlockBasedOptions::default();
        if config.bloom_filter_bits > 0 {
            block_opts.set_bloom_filter(f64::from(config.bloom_filter_bits), false);
        }
        block_opts.set_cache_index_and_filter_blocks(true);
        opts.set_block_based_table_factory(&block_opts);

        let cfs = vec![ColumnFamilyDescriptor::new(CF_DID_DOCUMENTS, opts.clone())];

        let db = DB::open_cf_descriptors(&opts, &config.path, cfs).map_err(|e| engine_err(&e))?;

        tracing::info!(path = %config.path.display(), "opened registry database");
        Ok(Self { db, config })
    }

    /// Opens with default configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the database cannot be opened.
    pub fn open_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(RocksDbConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    /// Returns the database directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn documents_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_DID_DOCUMENTS).ok_or_else(|| {
            StorageError::Corruption(format!("missing column family {CF_DID_DOCUMENTS}"))
        })
    }
}

impl std::fmt::Debug for RocksDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksDbStore")
            .field("path", &self.config.path)
            .finish_non_exhaustive()
    }
}

impl KvStore for RocksDbStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(data) = self
            .db
            .get_cf(self.documents_cf()?, key.as_bytes())
            .map_err(|e| engine_err(&e))?
        else {
            return Ok(None);
        };

        String::from_utf8(data)
            .map(Some)
            .map_err(|_| StorageError::Corruption(format!("value for {key} is not UTF-8")))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);

        self.db
            .put_cf_opt(self.documents_cf()?, key.as_bytes(), value.as_bytes(), &write_opts)
            .map_err(|e| engine_err(&e))
    }

    fn flush(&self) -> Result<()> {
        self.db.flush().map_err(|e| engine_err(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_db() -> (RocksDbStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksDbStore::open_default(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_put_get() {
        let (store, _dir) = create_test_db();

        store.put("did:ssikorea:z6Mk", r#"{"id":"x"}"#).unwrap();
        assert_eq!(
            store.get("did:ssikorea:z6Mk").unwrap().as_deref(),
            Some(r#"{"id":"x"}"#)
        );
        assert!(store.get("did:ssikorea:other").unwrap().is_none());
    }

    #[test]
    fn test_persistence() {
        let dir = TempDir::new().unwrap();

        {
            let store = RocksDbStore::open_default(dir.path()).unwrap();
            store.put("k", "v").unwrap();
            store.flush().unwrap();
        }

        let store = RocksDbStore::open_default(dir.path()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
