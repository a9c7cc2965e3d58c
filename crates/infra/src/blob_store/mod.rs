//! Object store for item photos.
//!
//! Blobs live under `images/<item name>`; storing a new blob for the same
//! name replaces the old one and yields a URL the item record can point at.

pub mod fs;
pub mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use pantry_core::ItemName;
use pantry_inventory::ImageRef;

pub use fs::FsBlobStore;
pub use in_memory::InMemoryBlobStore;

/// Blob store operation error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlobStoreError {
    #[error("refusing to store an empty blob for '{0}'")]
    Empty(ItemName),

    #[error("blob store unavailable: {0}")]
    Unavailable(String),

    #[error("blob write failed: {0}")]
    Write(String),
}

/// Stores image bytes keyed by item name and returns their public URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_blob(
        &self,
        key: &ItemName,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ImageRef, BlobStoreError>;
}

#[async_trait]
impl<B> BlobStore for Arc<B>
where
    B: BlobStore + ?Sized,
{
    async fn put_blob(
        &self,
        key: &ItemName,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ImageRef, BlobStoreError> {
        (**self).put_blob(key, bytes, content_type).await
    }
}

/// Relative path of the blob for `key`: `images/<percent-encoded name>`.
///
/// Bytes outside `[A-Za-z0-9._-]` are percent-encoded so distinct names never
/// share a path and the result is safe in both URLs and file systems.
pub fn blob_path(key: &ItemName) -> String {
    let mut encoded = String::with_capacity(key.as_str().len());
    for byte in key.as_str().bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => encoded.push(byte as char),
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    format!("images/{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_path_encodes_reserved_bytes() {
        let key = ItemName::parse("Green Apple %").unwrap();
        assert_eq!(blob_path(&key), "images/Green%20Apple%20%25");
    }

    #[test]
    fn blob_path_keeps_plain_names() {
        let key = ItemName::parse("Item-1700000000000-abc_def.v2").unwrap();
        assert_eq!(blob_path(&key), "images/Item-1700000000000-abc_def.v2");
    }

    #[test]
    fn blob_path_distinguishes_similar_names() {
        let a = ItemName::parse("a b").unwrap();
        let b = ItemName::parse("a_b").unwrap();
        assert_ne!(blob_path(&a), blob_path(&b));
    }
}
