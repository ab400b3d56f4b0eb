//! Content checksums for transport-log import deduplication.
//!
//! An import is identified by the SHA-256 of the raw log text. Re-submitting
//! the same file (same bytes) is detected before any record is written.

use sha2::{Digest, Sha256};

/// Computes the hex-encoded SHA-256 checksum of a transport log.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_for_identical_content() {
        let log = "vehicle_number,date,unit_amount,chargeable_weight,deducted_amount\n";
        assert_eq!(calculate_checksum(log), calculate_checksum(log));
    }

    #[test]
    fn checksum_changes_with_content() {
        let a = calculate_checksum("V-100,2025-01-31,1200,4.5,300");
        let b = calculate_checksum("V-100,2025-01-31,1200,4.5,301");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
