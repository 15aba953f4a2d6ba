//! SHA-256 digests over canonical payload bytes
//!
//! Digests travel as 64-character lower-case hex strings. Caller-supplied
//! digests are normalized (trimmed, lower-cased) before any comparison.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Computes the lower-case hex SHA-256 digest of `data`.
///
/// This function is deterministic: the same input always produces the same output.
pub fn digest_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Normalize a caller-supplied digest: surrounding whitespace removed,
/// letters lower-cased.
pub fn normalize_digest(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Returns true if `digest` is exactly 64 lower-case hex characters.
///
/// Informational only. A malformed asserted digest is not rejected up
/// front; it simply fails to match.
pub fn is_well_formed(digest: &str) -> bool {
    digest.len() == DIGEST_HEX_LEN
        && digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
