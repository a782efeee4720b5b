//! Webhook signature verification.
//!
//! Providers sign deliveries with the lowercase hex SHA-256 of the shared
//! secret concatenated with the raw request body.

use sha2::{Digest, Sha256};

/// Expected signature for `body` under `secret`.
pub fn compute_signature(secret: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(body);
    hex::encode(hasher.finalize())
}

/// Check a presented signature against the expected one. Hex digits are
/// compared case-insensitively.
pub fn verify_signature(secret: &str, body: &[u8], presented: &str) -> bool {
    compute_signature(secret, body).eq_ignore_ascii_case(presented.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_matching_signature() {
        let signature = compute_signature("secret", b"{\"id\":\"evt_1\"}");
        assert!(verify_signature("secret", b"{\"id\":\"evt_1\"}", &signature));
        assert!(verify_signature(
            "secret",
            b"{\"id\":\"evt_1\"}",
            &signature.to_uppercase()
        ));
    }

    #[test]
    fn rejects_a_wrong_secret_or_body() {
        let signature = compute_signature("secret", b"payload");
        assert!(!verify_signature("other", b"payload", &signature));
        assert!(!verify_signature("secret", b"tampered", &signature));
        assert!(!verify_signature("secret", b"payload", "deadbeef"));
    }

    #[test]
    fn signature_is_stable_hex() {
        let signature = compute_signature("secret", b"payload");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(signature, compute_signature("secret", b"payload"));
    }
}
