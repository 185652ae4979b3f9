//! Registration and lookup of `did:ssikorea` identifiers.

use crate::Result;
use chrono::{DateTime, Utc};
use ssikorea_did::{draft, finalize, Did, DidDocument, Timestamps};
use ssikorea_identity::Fingerprint;
use ssikorea_storage::{Insertion, Lookup, Registry};
use std::sync::Arc;

/// Whether a registration wrote a new document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// First registration of this key.
    Created,
    /// The key was registered before; the stored document is returned.
    AlreadyExisted,
}

impl RegistrationStatus {
    /// Returns the status as a lowercase string for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AlreadyExisted => "already_existed",
        }
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// The registered DID.
    pub did: Did,
    /// The document stored for `did`.
    pub document: DidDocument,
    /// Whether this call created the document.
    pub status: RegistrationStatus,
}

/// Issues DIDs for Ed25519 public keys. The only writer to the registry.
#[derive(Debug, Clone)]
pub struct IssuanceService {
    registry: Arc<Registry>,
}

impl IssuanceService {
    /// Creates a service over `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Parses a multibase public key and registers it.
    ///
    /// # Errors
    ///
    /// Fails with [`IssuanceError::InvalidPublicKeyEncoding`] before touching
    /// storage if `public_key_multibase` is not an Ed25519 fingerprint.
    ///
    /// [`IssuanceError::InvalidPublicKeyEncoding`]: crate::IssuanceError::InvalidPublicKeyEncoding
    pub fn register_multibase(&self, public_key_multibase: &str) -> Result<Registration> {
        let fingerprint = Fingerprint::parse(public_key_multibase).map_err(|e| {
            tracing::debug!(error = %e, "rejected public key");
            e
        })?;
        self.register(&fingerprint)
    }

    /// Registers `fingerprint`, stamping a new document with the current time.
    ///
    /// # Errors
    ///
    /// See [`IssuanceService::register_at`].
    pub fn register(&self, fingerprint: &Fingerprint) -> Result<Registration> {
        self.register_at(fingerprint, Utc::now())
    }

    /// Registers `fingerprint`, stamping a new document with `now`.
    ///
    /// Returns the stored document when the key was registered before, so
    /// repeating a registration always yields the first document.
    ///
    /// # Errors
    ///
    /// Returns [`IssuanceError::StorageUnavailable`] if the registry fails.
    ///
    /// [`IssuanceError::StorageUnavailable`]: crate::IssuanceError::StorageUnavailable
    pub fn register_at(
        &self,
        fingerprint: &Fingerprint,
        now: DateTime<Utc>,
    ) -> Result<Registration> {
        let did = Did::from_fingerprint(fingerprint.clone());
        let document = finalize(&did, draft(fingerprint), Some(&Timestamps::at(now)));
        document.validate()?;

        let key = did.to_string();
        let (document, status) = match self
            .registry
            .insert_if_absent(&key, document)
            .map_err(|e| {
                tracing::error!(did = %key, error = %e, "registry write failed");
                e
            })? {
            Insertion::Inserted(doc) => (doc, RegistrationStatus::Created),
            Insertion::Existing(doc) => (doc, RegistrationStatus::AlreadyExisted),
        };

        tracing::info!(did = %key, status = status.as_str(), "registration");
        Ok(Registration {
            did,
            document,
            status,
        })
    }

    /// Returns the stored JSON for `did` exactly as it was written.
    ///
    /// # Errors
    ///
    /// Returns [`IssuanceError::StorageUnavailable`] if the registry fails.
    ///
    /// [`IssuanceError::StorageUnavailable`]: crate::IssuanceError::StorageUnavailable
    pub fn resolve(&self, did: &str) -> Result<Option<String>> {
        Ok(self.registry.get_raw(did).map_err(|e| {
            tracing::error!(did, error = %e, "registry read failed");
            e
        })?)
    }

    /// Looks up and parses the document for `did`.
    ///
    /// # Errors
    ///
    /// Returns [`IssuanceError::StorageUnavailable`] if the registry fails or
    /// holds an unreadable document.
    ///
    /// [`IssuanceError::StorageUnavailable`]: crate::IssuanceError::StorageUnavailable
    pub fn resolve_document(&self, did: &str) -> Result<Lookup> {
        Ok(self.registry.get(did)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IssuanceError;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use ssikorea_identity::Keypair;
    use ssikorea_storage::{KvStore, MemoryStore, StorageError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    /// Counts every engine access.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        accesses: AtomicUsize,
    }

    impl KvStore for CountingStore {
        fn get(&self, key: &str) -> ssikorea_storage::Result<Option<String>> {
            self.accesses.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> ssikorea_storage::Result<()> {
            self.accesses.fetch_add(1, Ordering::SeqCst);
            self.inner.put(key, value)
        }
    }

    struct FailingStore;

    impl KvStore for FailingStore {
        fn get(&self, _key: &str) -> ssikorea_storage::Result<Option<String>> {
            Err(StorageError::Io(std::io::Error::other("disk on fire")))
        }

        fn put(&self, _key: &str, _value: &str) -> ssikorea_storage::Result<()> {
            Err(StorageError::Io(std::io::Error::other("disk on fire")))
        }
    }

    fn service() -> (IssuanceService, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        let registry = Arc::new(Registry::new(store.clone()));
        (IssuanceService::new(registry), store)
    }

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn first_registration_creates() {
        let (service, _) = service();
        let fp = Keypair::generate().fingerprint();

        let reg = service.register_multibase(fp.as_str()).unwrap();

        assert_eq!(reg.status, RegistrationStatus::Created);
        assert_eq!(reg.did.to_string(), format!("did:ssikorea:{fp}"));
        assert_eq!(reg.document.id, reg.did.to_string());
        assert_eq!(reg.document.verification_method.len(), 1);

        let vm = &reg.document.verification_method[0];
        assert_eq!(vm.controller, reg.did.to_string());
        assert_eq!(vm.public_key_multibase, fp.as_str());
    }

    #[test]
    fn repeated_registration_returns_first_document() {
        let (service, _) = service();
        let fp = Keypair::generate().fingerprint();

        let first = service.register_at(&fp, t(1)).unwrap();
        let second = service.register_at(&fp, t(2)).unwrap();

        assert_eq!(second.status, RegistrationStatus::AlreadyExisted);
        assert_eq!(second.did, first.did);
        assert_eq!(second.document, first.document);
        assert_eq!(second.document.created, Some(t(1)));
    }

    #[test]
    fn repeat_does_not_mutate_stored_json() {
        let (service, _) = service();
        let fp = Keypair::generate().fingerprint();

        let first = service.register_at(&fp, t(1)).unwrap();
        let raw = service.resolve(&first.did.to_string()).unwrap().unwrap();
        service.register_at(&fp, t(5)).unwrap();

        assert_eq!(service.resolve(&first.did.to_string()).unwrap().unwrap(), raw);
    }

    #[test]
    fn missing_prefix_fails_without_storage_access() {
        let (service, store) = service();
        let fp = Keypair::generate().fingerprint();
        let without_z = &fp.as_str()[1..];

        let err = service.register_multibase(without_z).unwrap_err();

        assert!(matches!(err, IssuanceError::InvalidPublicKeyEncoding(_)));
        assert!(err.is_client_error());
        assert_eq!(store.accesses.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn wrong_codec_is_rejected() {
        let (service, store) = service();
        let mut payload = vec![0xe7, 0x01];
        payload.extend_from_slice(&[7u8; 32]);
        let secp = format!("z{}", bs58::encode(&payload).into_string());

        assert!(matches!(
            service.register_multibase(&secp),
            Err(IssuanceError::InvalidPublicKeyEncoding(_))
        ));
        assert!(matches!(
            service.register_multibase("z1"),
            Err(IssuanceError::InvalidPublicKeyEncoding(_))
        ));
        assert_eq!(store.accesses.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn resolve_unknown_is_none() {
        let (service, _) = service();
        let did = Did::from_fingerprint(Keypair::generate().fingerprint());

        assert!(service.resolve(&did.to_string()).unwrap().is_none());
        assert_eq!(
            service.resolve_document(&did.to_string()).unwrap(),
            Lookup::Absent
        );
    }

    #[test]
    fn resolve_document_matches_registration() {
        let (service, _) = service();
        let reg = service.register(&Keypair::generate().fingerprint()).unwrap();

        assert_eq!(
            service.resolve_document(&reg.did.to_string()).unwrap(),
            Lookup::Found(reg.document)
        );
    }

    #[test]
    fn storage_failure_is_unavailable() {
        let service = IssuanceService::new(Arc::new(Registry::new(Arc::new(FailingStore))));
        let fp = Keypair::generate().fingerprint();

        let err = service.register(&fp).unwrap_err();
        assert!(matches!(err, IssuanceError::StorageUnavailable(_)));
        assert!(!err.is_client_error());

        assert!(matches!(
            service.resolve("did:ssikorea:x"),
            Err(IssuanceError::StorageUnavailable(_))
        ));
    }

    #[test]
    fn concurrent_registrations_agree() {
        let (service, _) = service();
        let fp = Keypair::generate().fingerprint();
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let service = service.clone();
                let barrier = Arc::clone(&barrier);
                let fp = fp.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service.register_at(&fp, t(i)).unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let created = results
            .iter()
            .filter(|r| r.status == RegistrationStatus::Created)
            .count();
        assert_eq!(created, 1);

        let stored = service
            .resolve_document(&results[0].did.to_string())
            .unwrap()
            .into_document()
            .unwrap();
        for reg in &results {
            assert_eq!(reg.document, stored);
        }
    }
}
