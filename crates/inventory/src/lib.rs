//! Inventory domain module.
//!
//! This crate contains the rules for reconciling item submissions with stored
//! state, implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod catalog;
pub mod item;
pub mod reconcile;
pub mod submission;

pub use catalog::CatalogView;
pub use item::{AddMethod, ImageRef, InventoryItem, ItemRecord, PLACEHOLDER_IMAGE, RecordPatch};
pub use reconcile::{PlanKind, RepoOp, WritePlan, decide};
pub use submission::{Submission, SubmissionIntent, ValidSubmission};
