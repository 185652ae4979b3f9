//! HTTP API for the node.
//!
//! | Method | Path | |
//! |---|---|---|
//! | `POST` | `/api/did/register` | register a public key |
//! | `GET` | `/api/did/{did}` | resolve a DID |
//! | `GET` | `/health` | liveness |

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use ssikorea_did::DidDocument;
use ssikorea_issuance::{IssuanceError, IssuanceService, RegistrationStatus};
use tower_http::trace::TraceLayer;
use validator::Validate;

/// Application state shared across handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Registration and lookup.
    pub issuance: IssuanceService,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is not JSON.
    #[error("Invalid JSON")]
    InvalidJson,
    /// The request body does not have the expected shape.
    #[error("Invalid body")]
    InvalidBody,
    /// The public key is not an Ed25519 multibase fingerprint.
    #[error("{0}")]
    InvalidPublicKey(String),
    /// Nothing is registered under the DID.
    #[error("DID not found")]
    NotFound,
    /// Anything the client cannot fix. Details are logged, not returned.
    #[error("Server error")]
    Internal(String),
}

impl From<IssuanceError> for ApiError {
    fn from(e: IssuanceError) -> Self {
        match e {
            IssuanceError::InvalidPublicKeyEncoding(_) => ApiError::InvalidPublicKey(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidJson | ApiError::InvalidBody | ApiError::InvalidPublicKey(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Request to register a public key.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Multibase Ed25519 public key.
    #[validate(length(min = 3))]
    pub public_key_multibase: String,
}

/// Response to a registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// The registered DID.
    pub did: String,
    /// The stored document.
    pub did_document: DidDocument,
}

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/did/register", post(register_did))
        .route("/api/did/{did}", get(resolve_did))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Parses and validates a registration body.
fn parse_register_request(body: &[u8]) -> Result<RegisterRequest, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
    let req: RegisterRequest = serde_json::from_value(value).map_err(|_| ApiError::InvalidBody)?;
    req.validate().map_err(|_| ApiError::InvalidBody)?;
    Ok(req)
}

/// Registers a public key. 201 when created, 200 when already registered.
async fn register_did(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req = parse_register_request(&body)?;

    let registration = tokio::task::spawn_blocking(move || {
        state.issuance.register_multibase(&req.public_key_multibase)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let status = match registration.status {
        RegistrationStatus::Created => StatusCode::CREATED,
        RegistrationStatus::AlreadyExisted => StatusCode::OK,
    };

    Ok((
        status,
        Json(RegisterResponse {
            did: registration.did.to_string(),
            did_document: registration.document,
        }),
    ))
}

/// Returns the stored document exactly as it was written.
async fn resolve_did(
    State(state): State<AppState>,
    Path(did): Path<String>,
) -> Result<Response, ApiError> {
    let raw = tokio::task::spawn_blocking(move || state.issuance.resolve(&did))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??
        .ok_or(ApiError::NotFound)?;

    Ok(([(header::CONTENT_TYPE, "application/json")], raw).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_register_request() {
        let req = parse_register_request(br#"{"publicKeyMultibase":"z6Mkabc"}"#).unwrap();
        assert_eq!(req.public_key_multibase, "z6Mkabc");
    }

    #[test]
    fn test_parse_register_request_errors() {
        assert!(matches!(
            parse_register_request(b"{not json"),
            Err(ApiError::InvalidJson)
        ));
        assert!(matches!(
            parse_register_request(br#"{"publicKeyMultibase":"z6"}"#),
            Err(ApiError::InvalidBody)
        ));
        assert!(matches!(
            parse_register_request(br#"{"publicKeyMultibase":42}"#),
            Err(ApiError::InvalidBody)
        ));
        assert!(matches!(
            parse_register_request(br#"{"publicKey":"z6Mkabc"}"#),
            Err(ApiError::InvalidBody)
        ));
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err = ApiError::Internal("rocksdb: IO error: /var/lib/secret".into());
        assert_eq!(err.to_string(), "Server error");
    }
}
