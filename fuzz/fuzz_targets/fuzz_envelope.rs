#![no_main]

use libfuzzer_sys::fuzz_target;
use ssikorea_custody::{CustodyError, EncryptedPrivateKey, ENVELOPE_VERSION, NONCE_LEN, SALT_LEN};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    match EncryptedPrivateKey::from_json(json) {
        Ok(envelope) => {
            assert_eq!(envelope.version, ENVELOPE_VERSION);
            assert_eq!(envelope.salt.len(), SALT_LEN);
            assert_eq!(envelope.iv.len(), NONCE_LEN);

            // A parsed envelope serializes and parses back unchanged.
            let again = EncryptedPrivateKey::from_json(&envelope.to_json().unwrap()).unwrap();
            assert_eq!(again, envelope);
        }
        Err(CustodyError::MalformedEnvelope(_) | CustodyError::UnsupportedVersion(_)) => {}
        Err(e) => panic!("unexpected error class: {e}"),
    }
});
