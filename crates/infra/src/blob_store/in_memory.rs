use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use pantry_core::ItemName;
use pantry_inventory::ImageRef;

use super::{BlobStore, BlobStoreError, blob_path};

/// A stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory blob store for tests/dev. URLs use the `memory://` scheme.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blob stored under `images/<key>`, if any.
    pub fn get(&self, key: &ItemName) -> Option<StoredBlob> {
        let blobs = self.blobs.read().ok()?;
        blobs.get(&blob_path(key)).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put_blob(
        &self,
        key: &ItemName,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ImageRef, BlobStoreError> {
        if bytes.is_empty() {
            return Err(BlobStoreError::Empty(key.clone()));
        }

        let path = blob_path(key);
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| BlobStoreError::Write("lock poisoned".to_string()))?;
        blobs.insert(
            path.clone(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );

        Ok(ImageRef::new(format!("memory://{path}")))
    }
}
