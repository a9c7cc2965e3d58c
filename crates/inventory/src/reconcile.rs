//! Reconciliation: map a submission plus the stored state of its destination
//! to the exact sequence of repository writes.
//!
//! Decision table (destination = the submission's normalized name):
//!
//! | intent            | destination | plan            | count            |
//! |-------------------|-------------|-----------------|------------------|
//! | `NewEntry`        | absent      | `Create`        | submitted        |
//! | `NewEntry`        | present     | `AddStock`      | stored + submitted |
//! | `Edit`, same name | present     | `UpdateInPlace` | submitted        |
//! | `Edit`, same name | absent      | `NotFound`      | -                |
//! | `Edit`, renamed   | present     | `RenameMerge`   | stored + submitted |
//! | `Edit`, renamed   | absent      | `RenameCreate`  | submitted        |
//! | `Capture`         | absent      | `Create`        | submitted        |
//! | `Capture`         | present     | `Conflict`      | -                |
//!
//! Reconciliation is not idempotent: replaying a `NewEntry` that just
//! succeeded turns into `AddStock` and sums again.

use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, DomainResult, ItemName};

use crate::item::{ItemRecord, RecordPatch};
use crate::submission::{SubmissionIntent, ValidSubmission};

/// One repository call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RepoOp {
    Put { key: ItemName, record: ItemRecord },
    Merge { key: ItemName, patch: RecordPatch },
    Delete { key: ItemName },
}

impl RepoOp {
    pub fn key(&self) -> &ItemName {
        match self {
            RepoOp::Put { key, .. } | RepoOp::Merge { key, .. } | RepoOp::Delete { key } => key,
        }
    }
}

/// Which reconciliation path a plan took.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Create,
    UpdateInPlace,
    AddStock,
    RenameMerge,
    RenameCreate,
}

impl PlanKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanKind::Create => "create",
            PlanKind::UpdateInPlace => "update_in_place",
            PlanKind::AddStock => "add_stock",
            PlanKind::RenameMerge => "rename_merge",
            PlanKind::RenameCreate => "rename_create",
        }
    }
}

/// Ordered writes for a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePlan {
    /// Destination is fresh.
    Create { identity: ItemName, record: ItemRecord },
    /// Edit of an existing item under the same name: the count is replaced.
    UpdateInPlace { identity: ItemName, patch: RecordPatch },
    /// New entry colliding with an existing item: the count is summed.
    AddStock {
        identity: ItemName,
        existing_count: i64,
        record: ItemRecord,
    },
    /// Rename onto an existing item: counts summed, the old name deleted.
    RenameMerge {
        identity: ItemName,
        prior: ItemName,
        existing_count: i64,
        record: ItemRecord,
    },
    /// Rename onto a fresh name: record moved, the old name deleted.
    RenameCreate {
        identity: ItemName,
        prior: ItemName,
        record: ItemRecord,
    },
}

impl WritePlan {
    pub fn kind(&self) -> PlanKind {
        match self {
            WritePlan::Create { .. } => PlanKind::Create,
            WritePlan::UpdateInPlace { .. } => PlanKind::UpdateInPlace,
            WritePlan::AddStock { .. } => PlanKind::AddStock,
            WritePlan::RenameMerge { .. } => PlanKind::RenameMerge,
            WritePlan::RenameCreate { .. } => PlanKind::RenameCreate,
        }
    }

    /// Identity written by the plan.
    pub fn destination(&self) -> &ItemName {
        match self {
            WritePlan::Create { identity, .. }
            | WritePlan::UpdateInPlace { identity, .. }
            | WritePlan::AddStock { identity, .. }
            | WritePlan::RenameMerge { identity, .. }
            | WritePlan::RenameCreate { identity, .. } => identity,
        }
    }

    /// Identity vacated by the plan (rename paths only).
    pub fn source(&self) -> Option<&ItemName> {
        match self {
            WritePlan::RenameMerge { prior, .. } | WritePlan::RenameCreate { prior, .. } => {
                Some(prior)
            }
            _ => None,
        }
    }

    pub fn is_rename(&self) -> bool {
        self.source().is_some()
    }

    /// Count stored under the destination once the plan has run.
    pub fn resulting_count(&self) -> i64 {
        match self {
            WritePlan::UpdateInPlace { patch, .. } => patch.count,
            WritePlan::Create { record, .. }
            | WritePlan::AddStock { record, .. }
            | WritePlan::RenameMerge { record, .. }
            | WritePlan::RenameCreate { record, .. } => record.count,
        }
    }

    /// Repository calls in the order they must be issued.
    ///
    /// For renames the destination write always precedes the source delete.
    pub fn ops(&self) -> Vec<RepoOp> {
        match self {
            WritePlan::Create { identity, record } | WritePlan::AddStock { identity, record, .. } => {
                vec![RepoOp::Put {
                    key: identity.clone(),
                    record: record.clone(),
                }]
            }
            WritePlan::UpdateInPlace { identity, patch } => vec![RepoOp::Merge {
                key: identity.clone(),
                patch: patch.clone(),
            }],
            WritePlan::RenameMerge {
                identity,
                prior,
                record,
                ..
            }
            | WritePlan::RenameCreate {
                identity,
                prior,
                record,
            } => vec![
                RepoOp::Put {
                    key: identity.clone(),
                    record: record.clone(),
                },
                RepoOp::Delete { key: prior.clone() },
            ],
        }
    }
}

/// Decide the write plan for a validated submission.
///
/// `existing` is the record currently stored under the submission's
/// destination identity. Pure: the caller performs the read and the writes.
pub fn decide(submission: &ValidSubmission, existing: Option<&ItemRecord>) -> DomainResult<WritePlan> {
    let identity = submission.identity().clone();

    let plan = match (submission.intent(), existing) {
        (SubmissionIntent::NewEntry, None) => WritePlan::Create {
            identity,
            record: submission.to_record(),
        },
        (SubmissionIntent::NewEntry, Some(stored)) => WritePlan::AddStock {
            existing_count: stored.count,
            record: summed_record(submission, stored)?,
            identity,
        },
        (SubmissionIntent::Edit { prior }, Some(stored)) if *prior == identity => {
            WritePlan::UpdateInPlace {
                identity,
                patch: RecordPatch {
                    count: submission.count(),
                    add_method: submission.add_method().unwrap_or(stored.add_method),
                    image: submission.image().cloned(),
                },
            }
        }
        (SubmissionIntent::Edit { prior }, None) if *prior == identity => {
            return Err(DomainError::not_found(format!("item '{identity}'")));
        }
        (SubmissionIntent::Edit { prior }, Some(stored)) => WritePlan::RenameMerge {
            prior: prior.clone(),
            existing_count: stored.count,
            record: summed_record(submission, stored)?,
            identity,
        },
        (SubmissionIntent::Edit { prior }, None) => WritePlan::RenameCreate {
            prior: prior.clone(),
            record: submission.to_record(),
            identity,
        },
        (SubmissionIntent::Capture, None) => WritePlan::Create {
            identity,
            record: submission.to_record(),
        },
        (SubmissionIntent::Capture, Some(_)) => {
            return Err(DomainError::conflict(format!(
                "capture identity '{identity}' already exists"
            )));
        }
    };

    tracing::debug!(
        plan = plan.kind().as_str(),
        destination = %plan.destination(),
        source = ?plan.source().map(ItemName::as_str),
        resulting_count = plan.resulting_count(),
        "reconciled submission"
    );

    Ok(plan)
}

/// Record for the summing paths: counts add up, submitted fields win, and
/// the stored image and tag survive when the submission carries none.
fn summed_record(submission: &ValidSubmission, stored: &ItemRecord) -> DomainResult<ItemRecord> {
    let count = stored
        .count
        .checked_add(submission.count())
        .ok_or_else(|| DomainError::invariant("item count overflow"))?;

    Ok(ItemRecord {
        count,
        image: submission.image().cloned().or_else(|| stored.image.clone()),
        add_method: submission.add_method().unwrap_or(stored.add_method),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{AddMethod, ImageRef};
    use crate::submission::Submission;
    use proptest::prelude::*;

    fn name(s: &str) -> ItemName {
        ItemName::parse(s).unwrap()
    }

    fn stored(count: i64) -> ItemRecord {
        ItemRecord {
            count,
            image: None,
            add_method: AddMethod::Manual,
        }
    }

    fn plan_for(submission: Submission, existing: Option<&ItemRecord>) -> DomainResult<WritePlan> {
        decide(&submission.validate().unwrap(), existing)
    }

    #[test]
    fn new_item_on_fresh_identity_creates() {
        let plan = plan_for(Submission::new_entry("Apple", 3), None).unwrap();

        assert_eq!(plan.kind(), PlanKind::Create);
        assert_eq!(
            plan.ops(),
            vec![RepoOp::Put {
                key: name("Apple"),
                record: stored(3),
            }]
        );
    }

    #[test]
    fn new_item_on_existing_identity_adds_stock() {
        let plan = plan_for(Submission::new_entry("Apple", 2), Some(&stored(3))).unwrap();

        assert_eq!(plan.kind(), PlanKind::AddStock);
        assert_eq!(plan.resulting_count(), 5);
        assert_eq!(
            plan.ops(),
            vec![RepoOp::Put {
                key: name("Apple"),
                record: stored(5),
            }]
        );
    }

    #[test]
    fn edit_in_place_replaces_count() {
        let plan = plan_for(Submission::edit(name("Apple"), "Apple", 10), Some(&stored(3))).unwrap();

        assert_eq!(plan.kind(), PlanKind::UpdateInPlace);
        assert_eq!(
            plan.ops(),
            vec![RepoOp::Merge {
                key: name("Apple"),
                patch: RecordPatch {
                    count: 10,
                    add_method: AddMethod::Manual,
                    image: None,
                },
            }]
        );
    }

    #[test]
    fn rename_onto_existing_item_sums_and_deletes_source() {
        let plan = plan_for(Submission::edit(name("Apple"), "Banana", 3), Some(&stored(5))).unwrap();

        assert_eq!(plan.kind(), PlanKind::RenameMerge);
        assert_eq!(plan.resulting_count(), 8);
        assert_eq!(plan.source(), Some(&name("Apple")));
        assert_eq!(
            plan.ops(),
            vec![
                RepoOp::Put {
                    key: name("Banana"),
                    record: stored(8),
                },
                RepoOp::Delete { key: name("Apple") },
            ]
        );
    }

    #[test]
    fn rename_onto_fresh_name_moves_record() {
        let plan = plan_for(Submission::edit(name("Apple"), "Cherry", 3), None).unwrap();

        assert_eq!(plan.kind(), PlanKind::RenameCreate);
        assert_eq!(
            plan.ops(),
            vec![
                RepoOp::Put {
                    key: name("Cherry"),
                    record: stored(3),
                },
                RepoOp::Delete { key: name("Apple") },
            ]
        );
    }

    #[test]
    fn edit_of_vanished_item_is_not_found() {
        let err = plan_for(Submission::edit(name("Apple"), "Apple", 4), None).unwrap_err();
        match err {
            DomainError::NotFound(msg) => assert!(msg.contains("Apple")),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn edit_in_place_without_tag_keeps_stored_tag() {
        let camera = ItemRecord {
            count: 1,
            image: Some(ImageRef::new("photo.jpg")),
            add_method: AddMethod::Camera,
        };

        let plan = plan_for(Submission::edit(name("Apple"), "Apple", 4), Some(&camera)).unwrap();
        match plan {
            WritePlan::UpdateInPlace { patch, .. } => {
                assert_eq!(patch.add_method, AddMethod::Camera);
                assert_eq!(patch.image, None);
            }
            other => panic!("Expected UpdateInPlace, got {other:?}"),
        }

        let retagged = Submission::edit(name("Apple"), "Apple", 4).with_add_method(AddMethod::Manual);
        match plan_for(retagged, Some(&camera)).unwrap() {
            WritePlan::UpdateInPlace { patch, .. } => assert_eq!(patch.add_method, AddMethod::Manual),
            other => panic!("Expected UpdateInPlace, got {other:?}"),
        }
    }

    #[test]
    fn edit_matches_prior_after_trimming() {
        let plan = plan_for(Submission::edit(name("Apple"), " Apple ", 4), Some(&stored(1))).unwrap();
        assert_eq!(plan.kind(), PlanKind::UpdateInPlace);
    }

    #[test]
    fn capture_creates_and_never_merges() {
        let id = name("Item-1-abc");
        let plan = plan_for(Submission::capture(id.clone(), Some(ImageRef::new("u"))), None).unwrap();
        assert_eq!(plan.kind(), PlanKind::Create);
        assert_eq!(plan.destination(), &id);

        let err = plan_for(Submission::capture(id, None), Some(&stored(1))).unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            other => panic!("Expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn summing_keeps_stored_image_unless_replaced() {
        let with_image = ItemRecord {
            count: 1,
            image: Some(ImageRef::new("old.png")),
            add_method: AddMethod::Camera,
        };

        let plan = plan_for(Submission::new_entry("Apple", 1), Some(&with_image)).unwrap();
        match plan {
            WritePlan::AddStock { record, existing_count, .. } => {
                assert_eq!(existing_count, 1);
                assert_eq!(record.image, Some(ImageRef::new("old.png")));
                assert_eq!(record.add_method, AddMethod::Camera);
            }
            other => panic!("Expected AddStock, got {other:?}"),
        }

        let replaced = Submission::new_entry("Apple", 1).with_image(ImageRef::new("new.png"));
        let plan = plan_for(replaced, Some(&with_image)).unwrap();
        match plan {
            WritePlan::AddStock { record, .. } => {
                assert_eq!(record.image, Some(ImageRef::new("new.png")))
            }
            other => panic!("Expected AddStock, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_sum_is_rejected() {
        let err = plan_for(Submission::new_entry("Apple", 1), Some(&stored(i64::MAX))).unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) => assert!(msg.contains("overflow")),
            other => panic!("Expected InvariantViolation, got {other:?}"),
        }
    }

    #[test]
    fn repeating_a_new_entry_sums_again() {
        // First run creates; replaying the same submission against the
        // resulting state turns into AddStock.
        let submission = Submission::new_entry("Apple", 3);
        let first = plan_for(submission.clone(), None).unwrap();
        assert_eq!(first.kind(), PlanKind::Create);

        let after_first = stored(first.resulting_count());
        let second = plan_for(submission, Some(&after_first)).unwrap();
        assert_eq!(second.kind(), PlanKind::AddStock);
        assert_eq!(second.resulting_count(), 6);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: any collision outside an in-place edit sums the counts.
        #[test]
        fn collisions_sum_counts(
            existing in 0i64..1_000_000,
            submitted in 0i64..1_000_000,
            rename in any::<bool>(),
        ) {
            let submission = if rename {
                Submission::edit(name("Source"), "Target", submitted)
            } else {
                Submission::new_entry("Target", submitted)
            };
            let plan = plan_for(submission, Some(&stored(existing))).unwrap();
            prop_assert_eq!(plan.resulting_count(), existing + submitted);
            prop_assert_eq!(plan.destination(), &name("Target"));
        }

        /// Property: an in-place edit always lands on exactly the submitted count.
        #[test]
        fn in_place_edit_replaces_count(existing in 0i64..1_000_000, submitted in 0i64..1_000_000) {
            let plan = plan_for(Submission::edit(name("Apple"), "Apple", submitted), Some(&stored(existing))).unwrap();
            prop_assert_eq!(plan.kind(), PlanKind::UpdateInPlace);
            prop_assert_eq!(plan.resulting_count(), submitted);
        }

        /// Property: rename plans write the destination before deleting the source,
        /// and never delete the destination.
        #[test]
        fn rename_writes_before_delete(existing in proptest::option::of(0i64..1000), submitted in 0i64..1000) {
            let record = existing.map(stored);
            let plan = plan_for(Submission::edit(name("Old"), "New", submitted), record.as_ref()).unwrap();
            let ops = plan.ops();

            prop_assert_eq!(ops.len(), 2);
            prop_assert!(matches!(&ops[0], RepoOp::Put { key, .. } if key.as_str() == "New"), "first op should be Put of destination");
            prop_assert!(matches!(&ops[1], RepoOp::Delete { key } if key.as_str() == "Old"), "second op should be Delete of source");
        }

        /// Property: negative counts never produce a plan.
        #[test]
        fn negative_counts_never_validate(count in i64::MIN..0, name in "[A-Za-z][A-Za-z ]{0,20}") {
            prop_assert!(Submission::new_entry(name, count).validate().is_err());
        }
    }
}
