//! CLI command implementations.

use serde::Deserialize;
use serde_json::Value;
use ssikorea_custody::{CustodyError, FileEnvelopeStore, KeyCustody, Passphrase};
use ssikorea_did::{Did, DidError};
use ssikorea_identity::{
    decode_fingerprint, generate_key_pair, is_ed25519_pub_prefix, Fingerprint, IdentityError,
    Keypair,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Custody(#[from] CustodyError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Did(#[from] DidError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("node returned {status}: {message}")]
    Node { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("key '{0}' already exists (use --force to replace it)")]
    AlreadyExists(String),

    #[error("no passphrase given (use --passphrase or SSIKOREA_PASSPHRASE)")]
    MissingPassphrase,

    #[error("node issued {actual}, expected {expected}")]
    DidMismatch { expected: String, actual: String },
}

pub type Result<T> = std::result::Result<T, CliError>;

/// A key held in the keystore.
#[derive(Debug)]
pub struct KeyInfo {
    pub name: String,
    pub fingerprint: Fingerprint,
    pub did: Did,
}

impl KeyInfo {
    fn new(name: &str, keypair: &Keypair) -> Self {
        let fingerprint = keypair.fingerprint();
        Self {
            name: name.to_string(),
            did: Did::from_fingerprint(fingerprint.clone()),
            fingerprint,
        }
    }
}

/// Decoded view of a multibase public key.
#[derive(Debug, PartialEq, Eq)]
pub struct Inspection {
    pub codec_prefix: String,
    pub public_key: String,
    pub ed25519: bool,
    pub did: Option<String>,
}

/// Opens the keystore file as a custody.
pub fn open_custody(keystore: &Path) -> Result<KeyCustody> {
    let store = FileEnvelopeStore::open(keystore)?;
    Ok(KeyCustody::new(Arc::new(store)))
}

/// Resolves the passphrase from the flag or environment.
pub fn require_passphrase(passphrase: Option<String>) -> Result<Passphrase> {
    passphrase
        .map(Passphrase::new)
        .filter(|p| !p.is_empty())
        .ok_or(CliError::MissingPassphrase)
}

/// Generates a keypair and stores its private key under `name`.
pub async fn keygen(
    custody: &KeyCustody,
    name: &str,
    passphrase: &Passphrase,
    force: bool,
) -> Result<KeyInfo> {
    ensure_free(custody, name, force).await?;

    let generated = generate_key_pair();
    custody
        .encrypt(name, &*generated.keypair.secret_bytes(), passphrase)
        .await?;

    tracing::info!(name, fingerprint = %generated.fingerprint, "Generated key");
    Ok(KeyInfo::new(name, &generated.keypair))
}

/// Outcome of onboarding a new key.
#[derive(Debug)]
pub struct Onboarded {
    pub key: KeyInfo,
    pub created: bool,
    pub document: Value,
}

/// Generates a keypair, registers it with the node and, once the node has
/// accepted it, stores the encrypted private key under `name`.
///
/// Nothing is written to the keystore when registration fails.
pub async fn onboard(
    custody: &KeyCustody,
    node: &NodeClient,
    name: &str,
    passphrase: &Passphrase,
    force: bool,
) -> Result<Onboarded> {
    ensure_free(custody, name, force).await?;

    let generated = generate_key_pair();
    let key = KeyInfo::new(name, &generated.keypair);

    let registered = node.register(generated.fingerprint.as_str()).await?;
    let expected = key.did.to_string();
    if registered.did != expected {
        return Err(CliError::DidMismatch {
            expected,
            actual: registered.did,
        });
    }

    custody
        .encrypt(name, &*generated.keypair.secret_bytes(), passphrase)
        .await?;

    tracing::info!(name, did = %key.did, created = registered.created, "Onboarded key");
    Ok(Onboarded {
        key,
        created: registered.created,
        document: registered.document,
    })
}

async fn ensure_free(custody: &KeyCustody, name: &str, force: bool) -> Result<()> {
    if !force && custody.list().await?.iter().any(|k| k == name) {
        return Err(CliError::AlreadyExists(name.to_string()));
    }
    Ok(())
}

/// Decrypts the key stored under `name` and rebuilds its keypair.
pub async fn unlock(custody: &KeyCustody, name: &str, passphrase: &Passphrase) -> Result<KeyInfo> {
    let secret = custody
        .decrypt(name, passphrase)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("key '{name}'")))?;

    let keypair = Keypair::from_secret_bytes(&secret)?;
    Ok(KeyInfo::new(name, &keypair))
}

/// Decodes a multibase public key.
pub fn inspect(multibase: &str) -> Result<Inspection> {
    let decoded = decode_fingerprint(multibase)?;
    let did = Fingerprint::parse(multibase)
        .ok()
        .map(|fp| Did::from_fingerprint(fp).to_string());

    Ok(Inspection {
        codec_prefix: hex::encode(decoded.codec_prefix),
        public_key: hex::encode(&decoded.public_key),
        ed25519: is_ed25519_pub_prefix(&decoded.codec_prefix),
        did,
    })
}

/// Outcome of a registration call.
#[derive(Debug)]
pub struct Registered {
    pub created: bool,
    pub did: String,
    pub document: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    did: String,
    did_document: Value,
}

/// HTTP client for a running node.
#[derive(Debug, Clone)]
pub struct NodeClient {
    base: String,
    http: reqwest::Client,
}

impl NodeClient {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Registers a public key.
    pub async fn register(&self, multibase: &str) -> Result<Registered> {
        let response = self
            .http
            .post(format!("{}/api/did/register", self.base))
            .json(&serde_json::json!({ "publicKeyMultibase": multibase }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(node_error(status.as_u16(), &response.text().await?));
        }

        let body: RegisterBody = response.json().await?;
        Ok(Registered {
            created: status == reqwest::StatusCode::CREATED,
            did: body.did,
            document: body.did_document,
        })
    }

    /// Fetches the document for `did`.
    pub async fn resolve(&self, did: &str) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}/api/did/{did}", self.base))
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Err(CliError::NotFound(did.to_string())),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(node_error(status.as_u16(), &response.text().await?)),
        }
    }
}

/// Builds an error from a node's `{"error": ...}` body.
fn node_error(status: u16, body: &str) -> CliError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    CliError::Node { status, message }
}
