//! Inventory service: the entry point the presentation layer talks to.
//!
//! Every write follows the same shape: validate (no IO on failure), read the
//! destination, decide the plan, optional image upload, execute, then re-read
//! the whole collection so the caller can replace its list.

use chrono::Utc;
use thiserror::Error;

use pantry_core::{DomainError, ItemName};
use pantry_inventory::{
    ImageRef, InventoryItem, ItemRecord, PlanKind, Submission, SubmissionIntent, ValidSubmission,
    WritePlan, decide,
};

use crate::blob_store::{BlobStore, BlobStoreError};
use crate::capture::{CaptureDevice, CaptureError, capture_frame};
use crate::plan_executor::{ExecutionError, PlanExecutor};
use crate::repository::{ItemRepository, RepositoryError};

/// Failure of a service call. None of them is fatal; the caller keeps its
/// last known-good list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("repository call failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error("image upload failed: {0}")]
    Blob(#[from] BlobStoreError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// The item now exists under both names; needs manual cleanup.
    #[error("renamed item stored as '{destination}' but '{source_key}' could not be removed: {cause}")]
    PartialRename {
        destination: ItemName,
        source_key: ItemName,
        cause: RepositoryError,
    },
}

impl From<ExecutionError> for ServiceError {
    fn from(value: ExecutionError) -> Self {
        match value {
            ExecutionError::Write { cause, .. } => ServiceError::Repository(cause),
            ExecutionError::PartialRename {
                destination,
                source_key,
                cause,
            } => ServiceError::PartialRename {
                destination,
                source_key,
                cause,
            },
        }
    }
}

/// Image bytes attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }
}

/// Result of a successful submission or capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub plan: PlanKind,
    pub destination: ItemName,
    /// Name vacated by a rename.
    pub removed: Option<ItemName>,
    pub count: i64,
    /// Full collection re-read after the write.
    pub items: Vec<InventoryItem>,
}

/// Presentation-facing inventory operations.
#[derive(Debug)]
pub struct InventoryService<R, B> {
    executor: PlanExecutor<R>,
    blobs: B,
}

impl<R, B> InventoryService<R, B> {
    pub fn new(repo: R, blobs: B) -> Self {
        Self {
            executor: PlanExecutor::new(repo),
            blobs,
        }
    }

    pub fn repository(&self) -> &R {
        self.executor.repository()
    }

    pub fn blob_store(&self) -> &B {
        &self.blobs
    }
}

impl<R, B> InventoryService<R, B>
where
    R: ItemRepository,
    B: BlobStore,
{
    /// Full read of the collection, ordered by name.
    pub async fn list(&self) -> Result<Vec<InventoryItem>, ServiceError> {
        let mut items: Vec<InventoryItem> = self
            .repository()
            .list()
            .await?
            .into_iter()
            .map(|(name, record)| InventoryItem::from_record(name, record))
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    /// Compute the write plan for `submission` without executing it.
    ///
    /// Validation failures return before any repository call.
    pub async fn reconcile(&self, submission: Submission) -> Result<WritePlan, ServiceError> {
        let mut valid = submission.validate()?;
        let existing = self.read_state(&mut valid).await?;
        Ok(decide(&valid, existing.as_ref())?)
    }

    /// Read the destination record. For renames, also read the record being
    /// renamed and carry over the fields the submission left out (an in-place
    /// edit falls back to the destination inside `decide`).
    async fn read_state(&self, valid: &mut ValidSubmission) -> Result<Option<ItemRecord>, ServiceError> {
        let existing = self.repository().get(valid.identity()).await?;

        let renamed_from = match valid.intent() {
            SubmissionIntent::Edit { prior } if prior != valid.identity() => Some(prior.clone()),
            _ => None,
        };
        if let Some(prior) = renamed_from {
            if let Some(source) = self.repository().get(&prior).await? {
                valid.inherit_from(&source);
            }
        }

        Ok(existing)
    }

    /// Reconcile and execute a submission from the add/edit form.
    ///
    /// An attached image is uploaded only once the plan is known to be
    /// valid. A repository failure after the upload still leaves the new
    /// blob in place under `images/<identity>`.
    pub async fn submit(
        &self,
        submission: Submission,
        upload: Option<ImageUpload>,
    ) -> Result<SubmitOutcome, ServiceError> {
        let mut valid = submission.validate().inspect_err(|e| {
            tracing::info!(error = %e, "submission rejected");
        })?;

        let existing = self.read_state(&mut valid).await?;
        let mut plan = decide(&valid, existing.as_ref())?;

        if let Some(upload) = upload {
            let url = self.put_image(valid.identity(), upload).await?;
            valid.attach_image(url);
            plan = decide(&valid, existing.as_ref())?;
        }

        self.execute(plan).await
    }

    /// Capture a photo from `device` and store it as a new one-unit item.
    pub async fn capture<D>(&self, device: &D) -> Result<SubmitOutcome, ServiceError>
    where
        D: CaptureDevice + ?Sized,
    {
        let frame = capture_frame(device).await?;
        let identity = ItemName::for_capture(Utc::now());
        let url = self
            .put_image(&identity, ImageUpload::new(frame.bytes, frame.content_type))
            .await?;

        let valid = Submission::capture(identity, Some(url)).validate()?;
        let existing = self.repository().get(valid.identity()).await?;
        let plan = decide(&valid, existing.as_ref())?;
        self.execute(plan).await
    }

    /// Store an image for `name` and return its URL, without touching the item.
    pub async fn upload_image(&self, name: &ItemName, upload: ImageUpload) -> Result<ImageRef, ServiceError> {
        self.put_image(name, upload).await
    }

    /// Remove an item (already confirmed by the user) and re-read the list.
    pub async fn delete(&self, name: &ItemName) -> Result<Vec<InventoryItem>, ServiceError> {
        self.executor.delete(name).await?;
        self.list().await
    }

    async fn put_image(&self, name: &ItemName, upload: ImageUpload) -> Result<ImageRef, ServiceError> {
        let url = self
            .blobs
            .put_blob(name, upload.bytes, &upload.content_type)
            .await
            .inspect_err(|e| tracing::warn!(key = %name, error = %e, "image upload failed"))?;
        Ok(url)
    }

    async fn execute(&self, plan: WritePlan) -> Result<SubmitOutcome, ServiceError> {
        self.executor.execute(&plan).await?;
        let items = self.list().await?;

        Ok(SubmitOutcome {
            plan: plan.kind(),
            destination: plan.destination().clone(),
            removed: plan.source().cloned(),
            count: plan.resulting_count(),
            items,
        })
    }
}
