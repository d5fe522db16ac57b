//! Checksum validation for migrations
//!
//! Computes SHA256 checksums of migration SQL to detect edited migrations

use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_checksum() {
        let checksum = compute_checksum("SELECT 1");
        assert_eq!(checksum.len(), 64); // SHA256 is 64 hex chars
    }

    #[test]
    fn test_checksum_sensitive_to_content() {
        assert_eq!(compute_checksum("SELECT 1"), compute_checksum("SELECT 1"));
        assert_ne!(compute_checksum("SELECT 1"), compute_checksum("SELECT 2"));
    }
}
