//! Content digests for source text
//!
//! Same text = same digest. Bundles record the digest of every unit's source
//! at summary time; comparing against a fresh digest detects staleness.

use sha2::{Digest, Sha256};

/// SHA-256 of `text`, lowercase hex
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_deterministic() {
        let first = content_hash("class A {}");
        let second = content_hash("class A {}");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn hash_different_content() {
        assert_ne!(content_hash("content 1"), content_hash("content 2"));
    }

    #[test]
    fn hash_known_value() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
