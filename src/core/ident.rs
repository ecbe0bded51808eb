//! Unique identifier generation

use uuid::Uuid;

/// Generate a unique label, e.g. for a fresh node.
///
/// Ids are random (version 4) UUIDs in lowercase hyphenated form.
pub fn generate_unique_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

pub fn generate_unique_ids(count: usize) -> Vec<String> {
    (0..count).map(|_| generate_unique_id()).collect()
}
