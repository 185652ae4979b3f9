//! # SSI Korea Issuance
//!
//! Turns an Ed25519 public key into a registered `did:ssikorea` identifier.
//!
//! Registration validates the multibase key, builds and finalizes the DID
//! Document, and stores it unless the DID is already registered. Invalid keys
//! are rejected before the registry is touched.
//!
//! ## Example
//!
//! ```rust
//! use ssikorea_identity::Keypair;
//! use ssikorea_issuance::{IssuanceService, RegistrationStatus};
//! use ssikorea_storage::{MemoryStore, Registry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(Registry::new(Arc::new(MemoryStore::new())));
//! let service = IssuanceService::new(registry);
//!
//! let fingerprint = Keypair::generate().fingerprint();
//! let first = service.register_multibase(fingerprint.as_str()).unwrap();
//! let again = service.register_multibase(fingerprint.as_str()).unwrap();
//!
//! assert_eq!(first.status, RegistrationStatus::Created);
//! assert_eq!(again.status, RegistrationStatus::AlreadyExisted);
//! assert_eq!(first.document, again.document);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod service;

pub use error::{IssuanceError, Result};
pub use service::{IssuanceService, Registration, RegistrationStatus};
