//! Helper functions for content addressed values.

use sha1_smol::Sha1;

use super::{Id, MAGNITUDE_SIZE};

/// Returns `true` if `key` is the content hash of `value`.
pub fn validate_content(value: &[u8], key: &Id) -> bool {
    content_hash(value).as_slice() == key.as_bytes()
}

/// SHA-1 digest of `value`.
pub fn content_hash(value: &[u8]) -> [u8; MAGNITUDE_SIZE] {
    let mut hasher = Sha1::new();
    hasher.update(value);

    hasher.digest().bytes()
}
