//! Content digests for update verification.

use sha2::{Digest, Sha256};

/// Compute the digest of asset text as lowercase hex SHA-256.
///
/// Manifest `expected_hash` values must be produced with the same function.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a manifest hash against a computed one, ignoring case and
/// surrounding whitespace.
pub fn hashes_match(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}
