//! Password reset tokens.
//!
//! The plaintext token goes out in the reset email; only its SHA-256 digest
//! is stored on the user row.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a reset token. Returns `(plaintext, sha256_hex)`.
pub fn generate_reset_token() -> (String, String) {
    let plaintext = Uuid::new_v4().simple().to_string();
    let hash = hash_reset_token(&plaintext);
    (plaintext, hash)
}

/// SHA-256 hex digest of a reset token, as stored in the database.
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_hash_matches_plaintext() {
        let (plaintext, hash) = generate_reset_token();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_reset_token(&plaintext));
        assert_ne!(plaintext, hash);
    }

    #[test]
    fn tokens_are_unique() {
        let (a, _) = generate_reset_token();
        let (b, _) = generate_reset_token();
        assert_ne!(a, b);
    }
}
