//! Storage wiring for the HTTP adapter.

use std::sync::Arc;

use anyhow::Context;

use pantry_infra::{BlobStore, InfraConfig, InventoryService, ItemRepository};

/// Inventory service over whichever backends the configuration selected.
pub type DynInventoryService = InventoryService<Arc<dyn ItemRepository>, Arc<dyn BlobStore>>;

pub struct AppServices {
    inventory: DynInventoryService,
}

impl AppServices {
    pub fn new(repo: Arc<dyn ItemRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            inventory: InventoryService::new(repo, blobs),
        }
    }

    pub fn inventory(&self) -> &DynInventoryService {
        &self.inventory
    }
}

pub async fn build_services(config: &InfraConfig) -> anyhow::Result<AppServices> {
    let repo = config
        .build_repository()
        .await
        .context("failed to initialize item repository")?;
    let blobs = config.build_blob_store();

    tracing::info!(collection = %config.collection, "inventory services ready");
    Ok(AppServices::new(repo, blobs))
}
