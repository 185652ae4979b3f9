//! Node configuration.
//!
//! Sources, later ones winning:
//! 1. Built-in defaults
//! 2. An optional config file (TOML, YAML or JSON by extension)
//! 3. `SSIKOREA__*` environment variables, e.g. `SSIKOREA__API_ADDR`
//! 4. Command-line flags

use crate::observability::LogFormat;
use config::{Config, Environment, File};
use serde::Deserialize;
use ssikorea_storage::StoreConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Prefix of environment variables read by [`NodeConfig::load`].
pub const ENV_PREFIX: &str = "SSIKOREA";

/// Which registry engine the node uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// In-memory; documents are lost on restart.
    #[default]
    Memory,
    /// RocksDB under `data_dir/registry`.
    Rocksdb,
}

/// Configuration for the node.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// API listen address.
    pub api_addr: SocketAddr,
    /// Data directory.
    pub data_dir: PathBuf,
    /// Registry engine.
    pub storage: StorageKind,
    /// Log level.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_dir: PathBuf::from("./data"),
            storage: StorageKind::Memory,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl NodeConfig {
    /// Loads configuration from defaults, `file` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` is given but unreadable, or a value has the
    /// wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(file, Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    fn load_with_env(file: Option<&Path>, env: Environment) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("api_addr", defaults.api_addr.to_string())?
            .set_default("data_dir", defaults.data_dir.display().to_string())?
            .set_default("storage", "memory")?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", defaults.log_format.as_str())?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.add_source(env).build()?.try_deserialize()
    }

    /// Returns the registry engine configuration.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        match self.storage {
            StorageKind::Memory => StoreConfig::Memory,
            StorageKind::Rocksdb => StoreConfig::RocksDb(self.data_dir.join("registry")),
        }
    }
}
