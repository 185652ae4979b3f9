//! # SSI Korea DID
//!
//! `did:ssikorea` identifiers and the documents that describe them.
//!
//! ## Example
//!
//! ```rust
//! use ssikorea_did::{draft, finalize, Did, Timestamps};
//! use ssikorea_identity::Keypair;
//!
//! let fingerprint = Keypair::generate().fingerprint();
//! let did = Did::from_fingerprint(fingerprint.clone());
//!
//! let doc = finalize(&did, draft(&fingerprint), Some(&Timestamps::now()));
//! assert_eq!(doc.id, did.to_string());
//! assert!(doc.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod did;
mod document;
mod error;

pub use did::{Did, DID_METHOD, DID_SCHEME, PRIMARY_KEY_FRAGMENT};
pub use document::{
    draft, finalize, pending_did, Context, DidDocument, Timestamps, VerificationMethod,
    DID_CONTEXT_V1, ED25519_VERIFICATION_KEY_2020, PENDING_ID,
};
pub use error::{DidError, Result};
