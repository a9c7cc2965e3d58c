//! Infrastructure layer: storage capabilities, capture devices, config, and
//! the service that executes reconciled write plans against them.

pub mod blob_store;
pub mod capture;
pub mod config;
pub mod plan_executor;
pub mod repository;
pub mod service;


pub use blob_store::{BlobStore, BlobStoreError, FsBlobStore, InMemoryBlobStore};
pub use capture::{CaptureDevice, CaptureError, Frame, FrameStream, StillFrameDevice, capture_frame};
pub use config::InfraConfig;
pub use plan_executor::{ExecutionError, PlanExecutor};
pub use repository::{InMemoryItemRepository, ItemRepository, PostgresItemRepository, RepositoryError};
pub use service::{ImageUpload, InventoryService, ServiceError, SubmitOutcome};
