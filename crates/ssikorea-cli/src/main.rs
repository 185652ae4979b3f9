//! SSI Korea CLI - manage keys and DIDs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// SSI Korea - did:ssikorea keys and identifiers
#[derive(Parser, Debug)]
#[command(name = "ssikorea")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Keystore file holding encrypted private keys
    #[arg(long, global = true, default_value = "./ssikorea-keystore.json")]
    keystore: PathBuf,

    /// Passphrase protecting the keystore entry
    #[arg(long, global = true, env = "SSIKOREA_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Node base URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:8080")]
    node: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a keypair and store its encrypted private key
    Keygen {
        /// Keystore entry name
        #[arg(short, long)]
        name: String,
        /// Replace an existing entry
        #[arg(long)]
        force: bool,
    },

    /// Generate a keypair, register it with the node, then store the
    /// encrypted private key
    Onboard {
        /// Keystore entry name
        #[arg(short, long)]
        name: String,
        /// Replace an existing entry
        #[arg(long)]
        force: bool,
    },

    /// Decrypt a stored key and show its DID
    Unlock {
        /// Keystore entry name
        #[arg(short, long)]
        name: String,
    },

    /// List keystore entries
    List,

    /// Delete a keystore entry
    Delete {
        /// Keystore entry name
        #[arg(short, long)]
        name: String,
    },

    /// Decode a multibase public key
    Inspect {
        /// Multibase public key (z...)
        multibase: String,
    },

    /// Register a public key with a node
    Register {
        /// Multibase public key (z...)
        multibase: String,
    },

    /// Fetch a DID document from a node
    Resolve {
        /// The DID to resolve
        did: String,
    },
}

async fn run(cli: Cli) -> commands::Result<()> {
    match cli.command {
        Commands::Keygen { name, force } => {
            let passphrase = commands::require_passphrase(cli.passphrase)?;
            let custody = commands::open_custody(&cli.keystore)?;
            let key = commands::keygen(&custody, &name, &passphrase, force).await?;

            println!("Generated key '{}':", key.name);
            println!("  Public Key: {}", key.fingerprint);
            println!("  DID:        {}", key.did);
            println!("\nPrivate key encrypted into: {}", cli.keystore.display());
        }
        Commands::Onboard { name, force } => {
            let passphrase = commands::require_passphrase(cli.passphrase)?;
            let custody = commands::open_custody(&cli.keystore)?;
            let node = commands::NodeClient::new(&cli.node);
            let onboarded = commands::onboard(&custody, &node, &name, &passphrase, force).await?;

            let status = if onboarded.created {
                "created"
            } else {
                "already existed"
            };
            println!("Onboarded key '{}' ({status}):", onboarded.key.name);
            println!("  Public Key: {}", onboarded.key.fingerprint);
            println!("  DID:        {}", onboarded.key.did);
            println!("\nPrivate key encrypted into: {}", cli.keystore.display());
        }
        Commands::Unlock { name } => {
            let passphrase = commands::require_passphrase(cli.passphrase)?;
            let custody = commands::open_custody(&cli.keystore)?;
            let key = commands::unlock(&custody, &name, &passphrase).await?;

            println!("Unlocked key '{}':", key.name);
            println!("  Public Key: {}", key.fingerprint);
            println!("  DID:        {}", key.did);
        }
        Commands::List => {
            let custody = commands::open_custody(&cli.keystore)?;
            for name in custody.list().await? {
                println!("{name}");
            }
        }
        Commands::Delete { name } => {
            let custody = commands::open_custody(&cli.keystore)?;
            if custody.delete(&name).await? {
                println!("Deleted key '{name}'");
            } else {
                return Err(commands::CliError::NotFound(format!("key '{name}'")));
            }
        }
        Commands::Inspect { multibase } => {
            let inspection = commands::inspect(&multibase)?;

            println!("Codec prefix: {}", inspection.codec_prefix);
            println!("Public key:   {}", inspection.public_key);
            println!("Ed25519:      {}", inspection.ed25519);
            if let Some(did) = inspection.did {
                println!("DID:          {did}");
            }
        }
        Commands::Register { multibase } => {
            let registered = commands::NodeClient::new(&cli.node)
                .register(&multibase)
                .await?;

            if registered.created {
                println!("Registered {}", registered.did);
            } else {
                println!("Already registered {}", registered.did);
            }
            println!("{:#}", registered.document);
        }
        Commands::Resolve { did } => {
            let document = commands::NodeClient::new(&cli.node).resolve(&did).await?;
            println!("{document:#}");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ssikorea={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
