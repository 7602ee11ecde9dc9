//! SHA-256 fingerprints for log output.

use sha2::{Digest, Sha256};

/// Number of hex characters kept in a fingerprint.
const FINGERPRINT_LEN: usize = 12;

/// Hex-encoded SHA-256 of a secret.
pub fn sha256_hex(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Short, stable fingerprint of a key, code or session token.
///
/// Bearer secrets are never logged raw; log this instead.
pub fn fingerprint(secret: &str) -> String {
    let mut hash = sha256_hex(secret);
    hash.truncate(FINGERPRINT_LEN);
    hash
}
