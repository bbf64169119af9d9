//! Credential digest helpers.
//!
//! # Responsibility
//! - Produce MD5 hex digests identical to MySQL's `md5()` output.
//! - Normalize passwords so a stored digest is never hashed twice.
//!
//! # Invariants
//! - `digest` output is always 32 lowercase hex characters.
//! - `normalize(normalize(p)) == normalize(p)` for every input.

use md5::{Digest, Md5};
use once_cell::sync::Lazy;
use regex::Regex;

/// Length of a hex-rendered MD5 digest.
pub const DIGEST_LEN: usize = 32;

static DIGEST_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-f0-9]{32}$").expect("valid digest regex"));

/// Hashes `plaintext` (UTF-8 bytes) into a lowercase hex MD5 digest.
pub fn digest(plaintext: &str) -> String {
    hex::encode(Md5::digest(plaintext.as_bytes()))
}

/// Returns whether `value` already has the exact lexical shape of a digest.
pub fn is_digest(value: &str) -> bool {
    DIGEST_SHAPE_RE.is_match(value)
}

/// Returns `password` unchanged when it is already a digest, otherwise its digest.
pub fn normalize(password: &str) -> String {
    if is_digest(password) {
        password.to_string()
    } else {
        digest(password)
    }
}

#[cfg(test)]
mod tests {
    use super::{digest, is_digest, normalize, DIGEST_LEN};

    #[test]
    fn digest_matches_known_vectors() {
        assert_eq!(digest(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest("secret"), "5ebe2294ecd0e0f08eab7690d2a6ee69");
    }

    #[test]
    fn digest_is_deterministic_lowercase_hex() {
        for input in ["", "a", "secret", "pässwörd", "0123456789abcdef0123456789abcdef"] {
            let first = digest(input);
            assert_eq!(first, digest(input));
            assert_eq!(first.len(), DIGEST_LEN);
            assert!(first
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn is_digest_requires_exact_shape() {
        assert!(is_digest("5ebe2294ecd0e0f08eab7690d2a6ee69"));
        assert!(!is_digest("5EBE2294ECD0E0F08EAB7690D2A6EE69"));
        assert!(!is_digest("5ebe2294ecd0e0f08eab7690d2a6ee6"));
        assert!(!is_digest("5ebe2294ecd0e0f08eab7690d2a6ee690"));
        assert!(!is_digest("zebe2294ecd0e0f08eab7690d2a6ee69"));
        assert!(!is_digest(""));
    }

    #[test]
    fn normalize_hashes_plaintext_and_keeps_digests() {
        assert_eq!(normalize("secret"), digest("secret"));
        let hashed = digest("secret");
        assert_eq!(normalize(&hashed), hashed);
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["", "secret", "SECRET", "5ebe2294ecd0e0f08eab7690d2a6ee69", "x y z"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }
}
