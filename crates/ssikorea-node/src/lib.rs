//! # SSI Korea Node
//!
//! HTTP front end for `did:ssikorea` registration and resolution.
//!
//! ## Architecture
//!
//! ```text
//! HTTP (axum)  ──►  IssuanceService  ──►  Registry  ──►  KvStore
//!                                                       (memory | rocksdb)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run --bin ssikorea-node -- --api-addr 127.0.0.1:8080
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Routes, request validation and error mapping
//! - [`config`] - Node configuration loading
//! - [`observability`] - Structured logging
//!
//! ## Example: Creating an AppState
//!
//! ```rust
//! use std::sync::Arc;
//! use ssikorea_issuance::IssuanceService;
//! use ssikorea_node::api::{create_router, AppState};
//! use ssikorea_storage::{MemoryStore, Registry};
//!
//! let registry = Arc::new(Registry::new(Arc::new(MemoryStore::new())));
//! let state = AppState {
//!     issuance: IssuanceService::new(registry),
//! };
//! let app = create_router(state);
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod observability;
