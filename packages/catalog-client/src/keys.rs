//! Object key generation for uploads

use uuid::Uuid;

/// Collapse each whitespace run in a filename to `-`
pub fn sanitize_filename(filename: &str) -> String {
    filename.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Fresh object key for an uploaded file: `<uuid-v4>-<sanitized filename>`
///
/// The random prefix keeps two uploads of the same file from overwriting
/// each other.
pub fn object_key(filename: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), sanitize_filename(filename))
}
