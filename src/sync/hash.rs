//! Content hashing for change detection.
//!
//! Hashes the compact JSON serialization of a value. Stable because
//! encoding is deterministic and extracted fields are blanked in place
//! rather than removed, so a record's serialized head does not move around
//! between saves.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a SHA-256 hash of a serializable value.
///
/// # Panics
///
/// Panics if the value cannot be serialized to JSON, which cannot happen
/// for record maps.
#[must_use]
pub fn content_hash<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).expect("serialization should not fail");
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check whether a record differs from a previously stored hash.
///
/// `None` for the stored hash means "never seen", which counts as changed.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash != Some(current_hash)
}
