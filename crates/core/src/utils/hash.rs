//! Content hashing for idempotence detection.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::Result;

/// Computes the sha256 hex digest of a value's JSON representation.
///
/// Used to key persisted calculations by their input: byte-identical input
/// produces the same hash, letting downstream consumers detect resubmissions.
/// The store itself never deduplicates on it.
pub fn content_hash<T: Serialize>(value: &T) -> Result<String> {
    let bytes = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Probe {
        id: String,
        value: i64,
    }

    #[test]
    fn identical_values_hash_identically() {
        let a = Probe {
            id: "91".to_string(),
            value: 42,
        };
        let b = Probe {
            id: "91".to_string(),
            value: 42,
        };
        assert_eq!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    #[test]
    fn different_values_hash_differently() {
        let a = Probe {
            id: "91".to_string(),
            value: 42,
        };
        let b = Probe {
            id: "92".to_string(),
            value: 42,
        };
        assert_ne!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }
}
