/// Refresh Token Storage Digest
///
/// The user record keeps only a SHA-256 digest of its current refresh token,
/// never the token itself. Matching a presented token means matching digests.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a token string
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
