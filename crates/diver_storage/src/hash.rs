use sha2::{Digest, Sha256};

/// Computes the lowercase hex SHA-256 digest of `content`, the format used
/// by the `.sha256` sidecar files (spec.md §6).
pub fn sha256_hex(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    hex::encode(digest)
}

/// Parses the contents of a `.sha256` sidecar file into a normalized,
/// lowercase hex digest for comparison. The format is one ASCII line of 64
/// lowercase hex characters; a trailing newline is tolerated.
pub fn normalize_sidecar(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_ascii_lowercase()
}
