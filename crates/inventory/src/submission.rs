//! Candidate items submitted by the user.

use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, DomainResult, ItemName};

use crate::item::{AddMethod, ImageRef, ItemRecord};

/// Why a submission was made.
///
/// Decides whether a collision with an existing item replaces its count
/// (`Edit` of the same item) or adds to it (`NewEntry`, or `Edit` renaming
/// onto another item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionIntent {
    /// A fresh add from the "Add Item" form.
    NewEntry,
    /// An edit of the item currently stored under `prior`.
    Edit { prior: ItemName },
    /// A camera capture under a generated identity.
    Capture,
}

/// A candidate item as entered by the user (not yet validated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub count: i64,
    pub image: Option<ImageRef>,
    /// `None` keeps the tag already stored (`Manual` for new items).
    #[serde(default)]
    pub add_method: Option<AddMethod>,
    pub intent: SubmissionIntent,
}

impl Submission {
    pub fn new_entry(name: impl Into<String>, count: i64) -> Self {
        Self {
            name: name.into(),
            count,
            image: None,
            add_method: None,
            intent: SubmissionIntent::NewEntry,
        }
    }

    pub fn edit(prior: ItemName, name: impl Into<String>, count: i64) -> Self {
        Self {
            name: name.into(),
            count,
            image: None,
            add_method: None,
            intent: SubmissionIntent::Edit { prior },
        }
    }

    /// A captured item: one unit, tagged `Camera`, under `identity`.
    pub fn capture(identity: ItemName, image: Option<ImageRef>) -> Self {
        Self {
            name: identity.into_string(),
            count: 1,
            image,
            add_method: Some(AddMethod::Camera),
            intent: SubmissionIntent::Capture,
        }
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_add_method(mut self, add_method: AddMethod) -> Self {
        self.add_method = Some(add_method);
        self
    }

    /// Identity of the item this submission was editing, if any.
    pub fn prior_identity(&self) -> Option<&ItemName> {
        match &self.intent {
            SubmissionIntent::Edit { prior } => Some(prior),
            SubmissionIntent::NewEntry | SubmissionIntent::Capture => None,
        }
    }

    /// Check the submission before anything touches storage.
    pub fn validate(self) -> DomainResult<ValidSubmission> {
        let identity = ItemName::parse(&self.name)?;
        if self.count < 0 {
            return Err(DomainError::validation("count cannot be negative"));
        }
        Ok(ValidSubmission {
            identity,
            count: self.count,
            image: self.image,
            add_method: self.add_method,
            intent: self.intent,
        })
    }
}

/// A submission that passed validation: normalized identity, `count >= 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    identity: ItemName,
    count: i64,
    image: Option<ImageRef>,
    add_method: Option<AddMethod>,
    intent: SubmissionIntent,
}

impl ValidSubmission {
    /// Destination identity of the write.
    pub fn identity(&self) -> &ItemName {
        &self.identity
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    /// Explicitly submitted tag, if any.
    pub fn add_method(&self) -> Option<AddMethod> {
        self.add_method
    }

    pub fn intent(&self) -> &SubmissionIntent {
        &self.intent
    }

    /// Attach an uploaded image (uploads happen after validation).
    pub fn attach_image(&mut self, image: ImageRef) {
        self.image = Some(image);
    }

    /// Fill the fields the submission left out from `source`, the record
    /// being edited. Count and identity are never inherited.
    pub fn inherit_from(&mut self, source: &ItemRecord) {
        if self.add_method.is_none() {
            self.add_method = Some(source.add_method);
        }
        if self.image.is_none() {
            self.image = source.image.clone();
        }
    }

    /// Record for a fresh destination; an unset tag becomes `Manual`.
    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            count: self.count,
            image: self.image.clone(),
            add_method: self.add_method.unwrap_or_default(),
        }
    }
}
