use std::path::{Path, PathBuf};

use async_trait::async_trait;

use pantry_core::ItemName;
use pantry_inventory::ImageRef;

use super::{BlobStore, BlobStoreError, blob_path};

/// Blob store writing to a local directory served under a public base URL.
///
/// `put_blob("Apple")` writes `<root>/images/Apple` and returns
/// `<base_url>/images/Apple`. Content types are not persisted; the serving
/// layer infers them.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    base_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put_blob(
        &self,
        key: &ItemName,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ImageRef, BlobStoreError> {
        if bytes.is_empty() {
            return Err(BlobStoreError::Empty(key.clone()));
        }

        let relative = blob_path(key);
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobStoreError::Unavailable(format!("failed to create {parent:?}: {e}")))?;
        }

        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| BlobStoreError::Write(format!("failed to write {target:?}: {e}")))?;

        tracing::debug!(path = ?target, size = bytes.len(), content_type, "stored blob");
        Ok(ImageRef::new(format!("{}/{relative}", self.base_url)))
    }
}
