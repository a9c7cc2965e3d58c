//! Configuration loading and backend wiring.

use std::path::PathBuf;
use std::sync::Arc;

use crate::blob_store::{BlobStore, FsBlobStore, InMemoryBlobStore};
use crate::repository::{InMemoryItemRepository, ItemRepository, PostgresItemRepository, RepositoryError};

pub const DEFAULT_COLLECTION: &str = "fruits";
pub const DEFAULT_BLOB_BASE_URL: &str = "/blobs";

/// Storage settings, read once at startup.
///
/// | Variable | Default | Effect |
/// |----------|---------|--------|
/// | `PANTRY_DATABASE_URL` | unset | Postgres repository; in-memory when unset |
/// | `PANTRY_COLLECTION` | `fruits` | collection name inside the database |
/// | `PANTRY_BLOB_DIR` | unset | filesystem blob store root; in-memory when unset |
/// | `PANTRY_BLOB_BASE_URL` | `/blobs` | public URL prefix for stored blobs |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraConfig {
    pub database_url: Option<String>,
    pub collection: String,
    pub blob_dir: Option<PathBuf>,
    pub blob_base_url: String,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            collection: DEFAULT_COLLECTION.to_string(),
            blob_dir: None,
            blob_base_url: DEFAULT_BLOB_BASE_URL.to_string(),
        }
    }
}

impl InfraConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let collection = get("PANTRY_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
        let blob_base_url = get("PANTRY_BLOB_BASE_URL").unwrap_or_else(|| DEFAULT_BLOB_BASE_URL.to_string());

        Self {
            database_url: get("PANTRY_DATABASE_URL"),
            collection,
            blob_dir: get("PANTRY_BLOB_DIR").map(PathBuf::from),
            blob_base_url,
        }
    }

    /// Repository selected by this configuration.
    pub async fn build_repository(&self) -> Result<Arc<dyn ItemRepository>, RepositoryError> {
        match &self.database_url {
            Some(url) => {
                let repo = PostgresItemRepository::connect(url, self.collection.clone()).await?;
                tracing::info!(collection = %self.collection, "using postgres item repository");
                Ok(Arc::new(repo))
            }
            None => {
                tracing::warn!("PANTRY_DATABASE_URL not set; items are kept in memory only");
                Ok(Arc::new(InMemoryItemRepository::new()))
            }
        }
    }

    /// Blob store selected by this configuration.
    pub fn build_blob_store(&self) -> Arc<dyn BlobStore> {
        match &self.blob_dir {
            Some(dir) => {
                tracing::info!(root = ?dir, base_url = %self.blob_base_url, "using filesystem blob store");
                Arc::new(FsBlobStore::new(dir.clone(), self.blob_base_url.clone()))
            }
            None => {
                tracing::warn!("PANTRY_BLOB_DIR not set; images are kept in memory only");
                Arc::new(InMemoryBlobStore::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = InfraConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, InfraConfig::default());
        assert_eq!(cfg.collection, "fruits");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = InfraConfig::from_lookup(lookup(&[
            ("PANTRY_DATABASE_URL", "   "),
            ("PANTRY_COLLECTION", ""),
        ]));
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.collection, DEFAULT_COLLECTION);
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = InfraConfig::from_lookup(lookup(&[
            ("PANTRY_DATABASE_URL", "postgres://localhost/pantry"),
            ("PANTRY_COLLECTION", "pantry"),
            ("PANTRY_BLOB_DIR", "/var/lib/pantry"),
            ("PANTRY_BLOB_BASE_URL", "https://cdn.example.com"),
        ]));
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/pantry"));
        assert_eq!(cfg.collection, "pantry");
        assert_eq!(cfg.blob_dir, Some(PathBuf::from("/var/lib/pantry")));
        assert_eq!(cfg.blob_base_url, "https://cdn.example.com");
    }

    #[tokio::test]
    async fn in_memory_backends_without_database_or_blob_dir() {
        let cfg = InfraConfig::default();
        let repo = cfg.build_repository().await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());

        let blobs = cfg.build_blob_store();
        let key = pantry_core::ItemName::parse("Apple").unwrap();
        let url = blobs.put_blob(&key, vec![1], "image/png").await.unwrap();
        assert_eq!(url.as_str(), "memory://images/Apple");
    }
}
