//! Write plan execution (application-level orchestration).
//!
//! Takes a [`WritePlan`] decided by the reconciliation engine and issues its
//! repository calls in order:
//!
//! ```text
//! WritePlan
//!   ↓
//! 1. Destination write (put / merge)
//!   ↓  only if step 1 succeeded
//! 2. Source delete (rename plans only)
//! ```
//!
//! The repository offers no multi-key transaction. A failed destination write
//! leaves the source untouched; a failed source delete after a successful
//! destination write leaves the item stored under both names and is reported
//! as [`ExecutionError::PartialRename`] for manual reconciliation. Nothing is
//! retried.

use pantry_core::ItemName;
use pantry_inventory::{RepoOp, WritePlan};

use crate::repository::{ItemRepository, RepositoryError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// A call failed before anything was written. Storage is unchanged.
    #[error("write to '{key}' failed: {cause}")]
    Write { key: ItemName, cause: RepositoryError },

    /// The destination write succeeded but the source delete did not.
    #[error("renamed item stored as '{destination}' but '{source_key}' could not be removed: {cause}")]
    PartialRename {
        destination: ItemName,
        source_key: ItemName,
        cause: RepositoryError,
    },
}

/// Executes write plans against an [`ItemRepository`].
#[derive(Debug)]
pub struct PlanExecutor<R> {
    repo: R,
}

impl<R> PlanExecutor<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_inner(self) -> R {
        self.repo
    }
}

impl<R> PlanExecutor<R>
where
    R: ItemRepository,
{
    /// Issue every call of `plan`, in order, stopping at the first failure.
    pub async fn execute(&self, plan: &WritePlan) -> Result<(), ExecutionError> {
        let kind = plan.kind().as_str();
        let mut destination_written = false;

        for op in plan.ops() {
            let key = op.key().clone();
            let result = match op {
                RepoOp::Put { key, record } => self.repo.put(&key, record).await,
                RepoOp::Merge { key, patch } => self.repo.merge(&key, patch).await,
                RepoOp::Delete { key } => self.repo.delete(&key).await,
            };

            match result {
                Ok(()) => {
                    tracing::debug!(plan = kind, key = %key, "repository call succeeded");
                    destination_written = true;
                }
                Err(cause) if destination_written => {
                    tracing::error!(
                        plan = kind,
                        destination = %plan.destination(),
                        source = %key,
                        error = %cause,
                        "rename left the source record behind"
                    );
                    return Err(ExecutionError::PartialRename {
                        destination: plan.destination().clone(),
                        source_key: key,
                        cause,
                    });
                }
                Err(cause) => {
                    tracing::warn!(plan = kind, key = %key, error = %cause, "repository call failed");
                    return Err(ExecutionError::Write { key, cause });
                }
            }
        }

        tracing::info!(
            plan = kind,
            destination = %plan.destination(),
            count = plan.resulting_count(),
            "write plan applied"
        );
        Ok(())
    }

    /// Unconditional delete (user-confirmed removal).
    pub async fn delete(&self, key: &ItemName) -> Result<(), ExecutionError> {
        self.repo.delete(key).await.map_err(|cause| ExecutionError::Write {
            key: key.clone(),
            cause,
        })?;
        tracing::info!(key = %key, "item deleted");
        Ok(())
    }
}
