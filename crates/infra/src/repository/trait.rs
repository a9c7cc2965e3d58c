use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use pantry_core::ItemName;
use pantry_inventory::{ItemRecord, RecordPatch};

/// Repository operation error.
///
/// Infrastructure failures (transport, permissions, storage), as opposed to
/// domain errors decided before any call is made. No call is retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// `merge` targeted a key that holds no document.
    #[error("no document stored under '{0}'")]
    NotFound(ItemName),

    /// The backend could not be reached or refused the call.
    #[error("repository unavailable: {0}")]
    Unavailable(String),

    /// The backend accepted the call but failed to perform it.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Key-value document collection holding one [`ItemRecord`] per item name.
///
/// ## Semantics
///
/// - `put` creates or fully replaces the document under `key`.
/// - `merge` overwrites only the patched fields and fails with
///   [`RepositoryError::NotFound`] when nothing is stored under `key`.
/// - `delete` is unconditional; deleting a missing key succeeds.
/// - `list` returns every document, ordered by key.
///
/// No multi-key atomicity is offered: callers that touch two keys must order
/// their calls themselves.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn get(&self, key: &ItemName) -> Result<Option<ItemRecord>, RepositoryError>;

    async fn put(&self, key: &ItemName, record: ItemRecord) -> Result<(), RepositoryError>;

    async fn merge(&self, key: &ItemName, patch: RecordPatch) -> Result<(), RepositoryError>;

    async fn delete(&self, key: &ItemName) -> Result<(), RepositoryError>;

    async fn list(&self) -> Result<Vec<(ItemName, ItemRecord)>, RepositoryError>;
}

#[async_trait]
impl<R> ItemRepository for Arc<R>
where
    R: ItemRepository + ?Sized,
{
    async fn get(&self, key: &ItemName) -> Result<Option<ItemRecord>, RepositoryError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &ItemName, record: ItemRecord) -> Result<(), RepositoryError> {
        (**self).put(key, record).await
    }

    async fn merge(&self, key: &ItemName, patch: RecordPatch) -> Result<(), RepositoryError> {
        (**self).merge(key, patch).await
    }

    async fn delete(&self, key: &ItemName) -> Result<(), RepositoryError> {
        (**self).delete(key).await
    }

    async fn list(&self) -> Result<Vec<(ItemName, ItemRecord)>, RepositoryError> {
        (**self).list().await
    }
}
