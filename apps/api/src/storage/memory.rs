//! In-memory object store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::{ObjectMeta, ObjectStore, StorageResult, StoredObject};

/// Object store backed by a process-local map
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<ObjectMeta> {
        let meta = ObjectMeta::describe(key, &body, content_type);
        let stored = StoredObject {
            meta: meta.clone(),
            body,
        };
        self.objects.write().await.insert(key.to_string(), stored);
        Ok(meta)
    }

    async fn get(&self, key: &str) -> StorageResult<Option<StoredObject>> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
