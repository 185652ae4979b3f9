#![no_main]

use libfuzzer_sys::fuzz_target;
use ssikorea_did::Did;
use ssikorea_identity::{decode_fingerprint, encode_multicodec_public_key, Fingerprint};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Decoding never panics; a successful decode carries the prefix.
        if let Ok(decoded) = decode_fingerprint(s) {
            assert!(s.starts_with('z'));
            assert_eq!(decoded.codec_prefix.len(), 2);
        }

        // Anything that parses re-encodes to the same string.
        if let Ok(fp) = Fingerprint::parse(s) {
            assert_eq!(encode_multicodec_public_key(fp.public_key_bytes()).as_str(), s);
            let did = Did::from_fingerprint(fp);
            assert_eq!(did.to_string().parse::<Did>().ok(), Some(did));
        }

        let _ = s.parse::<Did>();
    }

    // Any 32 bytes encode and decode back.
    if let Ok(key) = <[u8; 32]>::try_from(data) {
        let fp = encode_multicodec_public_key(&key);
        let decoded = decode_fingerprint(fp.as_str()).unwrap();
        assert_eq!(decoded.public_key, key.to_vec());
    }
});
