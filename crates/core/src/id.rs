//! Item identity.
//!
//! Items are keyed by their name: the repository key space is the identity
//! space, so an `ItemName` is both the display name and the storage key.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Prefix of identities generated for camera captures.
pub const CAPTURE_PREFIX: &str = "Item-";

/// Unique key (and display name) of an inventory item.
///
/// Always trimmed, never empty, never contains `/` (the name doubles as a
/// blob path segment).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

impl ItemName {
    /// Parse and normalize a user-entered name.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if trimmed.contains('/') {
            return Err(DomainError::validation("name cannot contain '/'"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Generate a fresh identity for a camera capture.
    ///
    /// Embeds the capture time and a UUIDv7, so two captures never collide
    /// even within the same millisecond.
    pub fn for_capture(captured_at: DateTime<Utc>) -> Self {
        Self(format!(
            "{CAPTURE_PREFIX}{}-{}",
            captured_at.timestamp_millis(),
            Uuid::now_v7().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for ItemName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ItemName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemName> for String {
    fn from(value: ItemName) -> Self {
        value.0
    }
}
