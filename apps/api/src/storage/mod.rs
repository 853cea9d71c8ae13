//! Object storage backends
//!
//! Binary assets (audio files, cover art, artist photos) live in an object
//! store addressed by caller-chosen keys. The gateway only ever puts and gets
//! whole objects; listing and deletion are not part of the surface.
//!
//! Backends:
//! - [`FsObjectStore`]: objects on local disk under a root directory
//! - [`MemoryObjectStore`]: process-local map, used for tests and ephemeral
//!   deployments

mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Content type recorded when the uploader does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Object storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata sidecar could not be read or written
    #[error("corrupt object metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Metadata stored alongside every object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Key the object was stored under
    pub key: String,
    /// Content type declared by the uploader
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
    /// Quoted strong entity tag
    pub etag: String,
}

impl ObjectMeta {
    /// Describe `body` as stored under `key`
    pub fn describe(key: &str, body: &[u8], content_type: &str) -> Self {
        Self {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size: body.len() as u64,
            etag: compute_etag(body),
        }
    }
}

/// An object read back from the store
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub meta: ObjectMeta,
    pub body: Bytes,
}

/// Object store binding used by the gateway
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing any existing object
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<ObjectMeta>;

    /// Fetch the object stored under `key`
    async fn get(&self, key: &str) -> StorageResult<Option<StoredObject>>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}

/// Strong etag for a payload: quoted hex SHA-256
pub fn compute_etag(body: &[u8]) -> String {
    format!("\"{:x}\"", Sha256::digest(body))
}

/// Content type implied by the key's extension, if it is one we serve
/// with a fixed type regardless of what the uploader declared
pub fn content_type_for_key(key: &str) -> Option<&'static str> {
    let lower = key.to_ascii_lowercase();
    if lower.ends_with(".mp3") {
        Some("audio/mpeg")
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        Some("image/jpeg")
    } else if lower.ends_with(".png") {
        Some("image/png")
    } else {
        None
    }
}
