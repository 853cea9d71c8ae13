//! Filesystem-backed object store
//!
//! Objects are addressed by the SHA-256 of their key, so caller-chosen keys
//! (which may contain `/`, `..` or anything else) never become filesystem
//! paths. Each object is two files in a two-character fan-out directory:
//!
//! ```text
//! <root>/9f/9f86d08...0a08.bin    object bytes
//! <root>/9f/9f86d08...0a08.json   ObjectMeta (key, content type, size, etag)
//! ```
//!
//! Writes go to a temporary file first and are renamed into place, so a
//! concurrent reader sees either the old object or the new one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tokio::fs;
use uuid::Uuid;

use super::{ObjectMeta, ObjectStore, StorageResult, StoredObject};

/// Object store rooted at a local directory
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open (and create if needed) a store rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        tracing::info!(root = %root.display(), "Filesystem object store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Data and metadata paths for `key`
    fn paths(&self, key: &str) -> (PathBuf, PathBuf) {
        let digest = format!("{:x}", Sha256::digest(key.as_bytes()));
        let dir = self.root.join(&digest[..2]);
        (
            dir.join(format!("{}.bin", digest)),
            dir.join(format!("{}.json", digest)),
        )
    }

    async fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
        let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
        fs::write(&tmp, contents).await?;
        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<ObjectMeta> {
        let (data_path, meta_path) = self.paths(key);
        if let Some(dir) = data_path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let meta = ObjectMeta::describe(key, &body, content_type);
        Self::write_atomic(&data_path, &body).await?;
        Self::write_atomic(&meta_path, &serde_json::to_vec(&meta)?).await?;

        tracing::debug!(key = %key, size = meta.size, "Object stored");
        Ok(meta)
    }

    async fn get(&self, key: &str) -> StorageResult<Option<StoredObject>> {
        let (data_path, meta_path) = self.paths(key);

        let raw_meta = match fs::read(&meta_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let meta: ObjectMeta = serde_json::from_slice(&raw_meta)?;

        let body = match fs::read(&data_path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(key = %key, "Object metadata present without data");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(StoredObject {
            meta,
            body: Bytes::from(body),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
