//! DID Document structure and construction.
//!
//! Documents are built in two steps: [`draft`] produces a placeholder bound to
//! a public key, and [`finalize`] binds it to the real DID and stamps it.
//! Finalizing twice with the same inputs yields the same document, so a
//! retried registration never changes what was built.

use crate::did::{Did, DID_METHOD, DID_SCHEME, PRIMARY_KEY_FRAGMENT};
use crate::{DidError, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use ssikorea_identity::Fingerprint;

/// JSON-LD context of DID Core v1.
pub const DID_CONTEXT_V1: &str = "https://www.w3.org/ns/did/v1";

/// Verification method type for Ed25519 keys.
pub const ED25519_VERIFICATION_KEY_2020: &str = "Ed25519VerificationKey2020";

/// Placeholder id of a document that has not been finalized.
pub const PENDING_ID: &str = "pending";

/// Returns the placeholder DID string used by drafts.
#[must_use]
pub fn pending_did() -> String {
    format!("{DID_SCHEME}:{DID_METHOD}:{PENDING_ID}")
}

/// The `@context` member: a single URI or an ordered set of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Context {
    /// A single context URI.
    Single(String),
    /// Several context entries (URIs or inline objects).
    Set(Vec<serde_json::Value>),
}

impl Default for Context {
    fn default() -> Self {
        Self::Single(DID_CONTEXT_V1.to_string())
    }
}

/// A verification method (public key) in a DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Id of this key, usually a fragment such as `#key-1`.
    pub id: String,
    /// Key type.
    #[serde(rename = "type")]
    pub type_: String,
    /// Controller DID.
    pub controller: String,
    /// Public key in multibase format.
    pub public_key_multibase: String,
}

/// Creation and update times applied by [`finalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamps {
    /// When the document was created.
    pub created: Option<DateTime<Utc>>,
    /// When the document was last updated.
    pub updated: Option<DateTime<Utc>>,
}

impl Timestamps {
    /// Uses `at` for both `created` and `updated`.
    ///
    /// Sub-millisecond precision is dropped so the value survives a round
    /// trip through the stored JSON unchanged.
    #[must_use]
    pub fn at(at: DateTime<Utc>) -> Self {
        let at = at.trunc_subsecs(3);
        Self {
            created: Some(at),
            updated: Some(at),
        }
    }

    /// Uses the current time for both `created` and `updated`.
    #[must_use]
    pub fn now() -> Self {
        Self::at(Utc::now())
    }
}

/// A DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// JSON-LD context.
    #[serde(rename = "@context")]
    pub context: Context,
    /// The DID this document describes.
    pub id: String,
    /// Verification methods, in order.
    pub verification_method: Vec<VerificationMethod>,
    /// Method references usable for authentication.
    #[serde(default)]
    pub authentication: Vec<String>,
    /// Method references usable for assertions.
    #[serde(default)]
    pub assertion_method: Vec<String>,
    /// When this document was created.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_millis")]
    pub created: Option<DateTime<Utc>>,
    /// When this document was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_millis")]
    pub updated: Option<DateTime<Utc>>,
}

impl DidDocument {
    /// Checks the structural invariants of the document.
    ///
    /// Every `authentication` and `assertionMethod` reference must name a
    /// verification method, and every method must be controlled by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DidError::InvalidDocument`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if let Some(vm) = self
            .verification_method
            .iter()
            .find(|vm| vm.controller != self.id)
        {
            return Err(DidError::InvalidDocument(format!(
                "controller of {} is {}, expected {}",
                vm.id, vm.controller, self.id
            )));
        }

        let dangling = self
            .authentication
            .iter()
            .chain(&self.assertion_method)
            .find(|reference| !self.resolves(reference));
        if let Some(reference) = dangling {
            return Err(DidError::InvalidDocument(format!(
                "reference {reference} does not name a verification method"
            )));
        }

        Ok(())
    }

    /// Looks up a verification method by relative or absolute reference.
    #[must_use]
    pub fn verification_method(&self, reference: &str) -> Option<&VerificationMethod> {
        self.verification_method
            .iter()
            .find(|vm| same_method(&self.id, &vm.id, reference))
    }

    fn resolves(&self, reference: &str) -> bool {
        self.verification_method(reference).is_some()
    }
}

/// Compares two method ids, treating `#frag` and `<id>#frag` as equal.
fn same_method(doc_id: &str, a: &str, b: &str) -> bool {
    let absolute = |s: &str| {
        if s.starts_with('#') {
            format!("{doc_id}{s}")
        } else {
            s.to_string()
        }
    };
    absolute(a) == absolute(b)
}

/// Builds a placeholder document for a public key.
///
/// The id and controller are `did:ssikorea:pending`; the single method is
/// `#key-1` and it is referenced from both `authentication` and
/// `assertionMethod`.
#[must_use]
pub fn draft(public_key_multibase: &Fingerprint) -> DidDocument {
    let pending = pending_did();

    DidDocument {
        context: Context::default(),
        id: pending.clone(),
        verification_method: vec![VerificationMethod {
            id: PRIMARY_KEY_FRAGMENT.to_string(),
            type_: ED25519_VERIFICATION_KEY_2020.to_string(),
            controller: pending,
            public_key_multibase: public_key_multibase.to_string(),
        }],
        authentication: vec![PRIMARY_KEY_FRAGMENT.to_string()],
        assertion_method: vec![PRIMARY_KEY_FRAGMENT.to_string()],
        created: None,
        updated: None,
    }
}

/// Binds a document to `did`.
///
/// Rewrites `id` and every method's `controller` to `did`, leaving method ids
/// untouched, and applies whichever timestamps are supplied.
#[must_use]
pub fn finalize(did: &Did, doc: DidDocument, timestamps: Option<&Timestamps>) -> DidDocument {
    let did = did.to_string();

    let mut finalized = DidDocument {
        id: did.clone(),
        verification_method: doc
            .verification_method
            .into_iter()
            .map(|vm| VerificationMethod {
                controller: did.clone(),
                ..vm
            })
            .collect(),
        ..doc
    };

    if let Some(ts) = timestamps {
        if let Some(created) = ts.created {
            finalized.created = Some(created);
        }
        if let Some(updated) = ts.updated {
            finalized.updated = Some(updated);
        }
    }

    finalized
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use ssikorea_identity::Keypair;

    fn fixture() -> (Fingerprint, Did) {
        let fp = Keypair::generate().fingerprint();
        let did = Did::from_fingerprint(fp.clone());
        (fp, did)
    }

    fn fixed_time() -> Timestamps {
        Timestamps::at(Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap())
    }

    #[test]
    fn draft_is_pending() {
        let (fp, _) = fixture();
        let doc = draft(&fp);

        assert_eq!(doc.id, "did:ssikorea:pending");
        assert_eq!(doc.verification_method.len(), 1);
        assert_eq!(doc.verification_method[0].id, "#key-1");
        assert_eq!(doc.verification_method[0].type_, ED25519_VERIFICATION_KEY_2020);
        assert_eq!(doc.verification_method[0].public_key_multibase, fp.as_str());
        assert_eq!(doc.authentication, vec!["#key-1".to_string()]);
        assert_eq!(doc.assertion_method, vec!["#key-1".to_string()]);
        assert!(doc.created.is_none());
        doc.validate().unwrap();
    }

    #[test]
    fn finalize_binds_did() {
        let (fp, did) = fixture();
        let ts = fixed_time();
        let doc = finalize(&did, draft(&fp), Some(&ts));

        assert_eq!(doc.id, did.to_string());
        assert_eq!(doc.verification_method[0].controller, did.to_string());
        assert_eq!(doc.verification_method[0].id, "#key-1");
        assert_eq!(doc.created, ts.created);
        assert_eq!(doc.updated, ts.updated);
        doc.validate().unwrap();
    }

    #[test]
    fn finalize_is_idempotent() {
        let (fp, did) = fixture();
        let ts = fixed_time();

        let once = finalize(&did, draft(&fp), Some(&ts));
        let twice = finalize(&did, once.clone(), Some(&ts));
        assert_eq!(once, twice);
    }

    #[test]
    fn finalize_without_timestamps_keeps_existing() {
        let (fp, did) = fixture();
        let ts = fixed_time();

        let stamped = finalize(&did, draft(&fp), Some(&ts));
        let again = finalize(&did, stamped.clone(), None);
        assert_eq!(again.created, stamped.created);

        let bare = finalize(&did, draft(&fp), None);
        assert!(bare.created.is_none());
        assert!(bare.updated.is_none());
    }

    #[test]
    fn validate_rejects_foreign_controller() {
        let (fp, did) = fixture();
        let mut doc = finalize(&did, draft(&fp), None);
        doc.verification_method[0].controller = "did:ssikorea:someone-else".into();

        assert!(matches!(doc.validate(), Err(DidError::InvalidDocument(_))));
    }

    #[test]
    fn validate_rejects_dangling_reference() {
        let (fp, did) = fixture();
        let mut doc = finalize(&did, draft(&fp), None);
        doc.assertion_method.push("#key-2".into());

        assert!(matches!(doc.validate(), Err(DidError::InvalidDocument(_))));
    }

    #[test]
    fn absolute_references_resolve() {
        let (fp, did) = fixture();
        let mut doc = finalize(&did, draft(&fp), None);
        doc.authentication = vec![did.key_id()];

        doc.validate().unwrap();
        assert!(doc.verification_method(&did.key_id()).is_some());
    }

    #[test]
    fn json_shape() {
        let (fp, did) = fixture();
        let doc = finalize(&did, draft(&fp), Some(&fixed_time()));
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["@context"], DID_CONTEXT_V1);
        assert_eq!(value["id"], did.to_string());
        assert_eq!(value["verificationMethod"][0]["type"], ED25519_VERIFICATION_KEY_2020);
        assert_eq!(value["verificationMethod"][0]["publicKeyMultibase"], fp.as_str());
        assert_eq!(value["assertionMethod"][0], "#key-1");
        assert_eq!(value["created"], "2025-03-01T12:30:00.000Z");
        assert_eq!(value["updated"], "2025-03-01T12:30:00.000Z");
    }

    #[test]
    fn json_omits_missing_timestamps() {
        let (fp, did) = fixture();
        let doc = finalize(&did, draft(&fp), None);
        let value = serde_json::to_value(&doc).unwrap();

        assert!(value.get("created").is_none());
        assert!(value.get("updated").is_none());
    }

    #[test]
    fn stored_json_reads_back_identical() {
        let (fp, did) = fixture();
        let doc = finalize(&did, draft(&fp), Some(&Timestamps::now()));

        let json = serde_json::to_string(&doc).unwrap();
        let back: DidDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn accepts_context_arrays() {
        let json = r##"{
            "@context": ["https://www.w3.org/ns/did/v1", {"@vocab": "https://example.com#"}],
            "id": "did:ssikorea:pending",
            "verificationMethod": []
        }"##;
        let doc: DidDocument = serde_json::from_str(json).unwrap();

        assert!(matches!(doc.context, Context::Set(ref entries) if entries.len() == 2));
        assert!(doc.authentication.is_empty());
        assert!(doc.created.is_none());
    }
}
