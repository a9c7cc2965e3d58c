use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use pantry_core::ItemName;
use pantry_inventory::{ItemRecord, RecordPatch};

use super::r#trait::{ItemRepository, RepositoryError};

/// In-memory item collection.
///
/// Intended for tests/dev. Locks are never held across an `.await`.
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    docs: RwLock<BTreeMap<ItemName, ItemRecord>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `records` (test fixtures, demos).
    pub fn with_records(records: impl IntoIterator<Item = (ItemName, ItemRecord)>) -> Self {
        Self {
            docs: RwLock::new(records.into_iter().collect()),
        }
    }

    fn poisoned() -> RepositoryError {
        RepositoryError::Storage("lock poisoned".to_string())
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn get(&self, key: &ItemName) -> Result<Option<ItemRecord>, RepositoryError> {
        let docs = self.docs.read().map_err(|_| Self::poisoned())?;
        Ok(docs.get(key).cloned())
    }

    async fn put(&self, key: &ItemName, record: ItemRecord) -> Result<(), RepositoryError> {
        let mut docs = self.docs.write().map_err(|_| Self::poisoned())?;
        docs.insert(key.clone(), record);
        Ok(())
    }

    async fn merge(&self, key: &ItemName, patch: RecordPatch) -> Result<(), RepositoryError> {
        let mut docs = self.docs.write().map_err(|_| Self::poisoned())?;
        let doc = docs
            .get_mut(key)
            .ok_or_else(|| RepositoryError::NotFound(key.clone()))?;
        doc.apply_patch(&patch);
        Ok(())
    }

    async fn delete(&self, key: &ItemName) -> Result<(), RepositoryError> {
        let mut docs = self.docs.write().map_err(|_| Self::poisoned())?;
        docs.remove(key);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(ItemName, ItemRecord)>, RepositoryError> {
        let docs = self.docs.read().map_err(|_| Self::poisoned())?;
        Ok(docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
