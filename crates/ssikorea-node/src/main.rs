//! SSI Korea Node - DID registration service.
//!
//! This is the main entry point for running a node.

use anyhow::Context;
use clap::Parser;
use ssikorea_issuance::IssuanceService;
use ssikorea_node::api::{create_router, AppState};
use ssikorea_node::config::{NodeConfig, StorageKind};
use ssikorea_node::observability::{init_logging, LogFormat};
use std::net::SocketAddr;
use std::path::PathBuf;

/// SSI Korea Node - did:ssikorea registration and resolution
#[derive(Parser, Debug)]
#[command(name = "ssikorea-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API listen address
    #[arg(long)]
    api_addr: Option<SocketAddr>,

    /// Data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Registry engine (memory, rocksdb)
    #[arg(long)]
    storage: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    fn apply(self, mut config: NodeConfig) -> anyhow::Result<NodeConfig> {
        if let Some(addr) = self.api_addr {
            config.api_addr = addr;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(storage) = self.storage {
            config.storage = match storage.as_str() {
                "memory" => StorageKind::Memory,
                "rocksdb" => StorageKind::Rocksdb,
                other => anyhow::bail!("unknown storage engine: {other}"),
            };
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = LogFormat::parse(&format);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = NodeConfig::load(args.config.as_deref()).context("loading configuration")?;
    let config = args.apply(config)?;

    init_logging(&config.log_level, config.log_format);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting SSI Korea node");
    tracing::info!(
        api_addr = %config.api_addr,
        data_dir = %config.data_dir.display(),
        storage = ?config.storage,
        "Node configuration"
    );

    if config.storage == StorageKind::Rocksdb {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("creating data directory {}", config.data_dir.display())
        })?;
    }

    let registry =
        ssikorea_storage::shared_registry(&config.store_config()).context("opening registry")?;
    let state = AppState {
        issuance: IssuanceService::new(registry.clone()),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.api_addr)
        .await
        .with_context(|| format!("binding {}", config.api_addr))?;
    tracing::info!(addr = %config.api_addr, "Node is ready. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    registry.flush().context("flushing registry")?;
    tracing::info!("Node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
