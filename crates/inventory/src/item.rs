use serde::{Deserialize, Serialize};

use pantry_core::ItemName;

/// Image shown for items that have no stored photo.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.png";

/// Provenance tag: how an item first entered the inventory.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddMethod {
    #[default]
    Manual,
    Camera,
}

impl AddMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AddMethod::Manual => "Manual",
            AddMethod::Camera => "Camera",
        }
    }
}

impl core::fmt::Display for AddMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for AddMethod {
    type Err = pantry_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Manual" => Ok(AddMethod::Manual),
            "Camera" => Ok(AddMethod::Camera),
            other => Err(pantry_core::DomainError::validation(format!(
                "unknown add method '{other}' (expected Manual or Camera)"
            ))),
        }
    }
}

/// Reference (URL) to a stored photo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored document for one item, keyed by its name in the repository.
///
/// Wire shape: `{ "count": 3, "image": "...", "addMethod": "Manual" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub add_method: AddMethod,
}

impl ItemRecord {
    /// Apply a partial update in place.
    ///
    /// An absent `image` in the patch leaves the stored image untouched.
    pub fn apply_patch(&mut self, patch: &RecordPatch) {
        self.count = patch.count;
        self.add_method = patch.add_method;
        if let Some(image) = &patch.image {
            self.image = Some(image.clone());
        }
    }
}

/// Partial document used by `merge`: overwrites the listed fields only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    pub count: i64,
    pub add_method: AddMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

/// An item as listed to the user: identity plus its stored fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub name: ItemName,
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub add_method: AddMethod,
}

impl InventoryItem {
    pub fn from_record(name: ItemName, record: ItemRecord) -> Self {
        Self {
            name,
            count: record.count,
            image: record.image,
            add_method: record.add_method,
        }
    }

    pub fn identity(&self) -> &ItemName {
        &self.name
    }

    /// Image URL to display: the stored photo or the placeholder.
    pub fn display_image(&self) -> &str {
        self.image
            .as_ref()
            .map(ImageRef::as_str)
            .unwrap_or(PLACEHOLDER_IMAGE)
    }

    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            count: self.count,
            image: self.image.clone(),
            add_method: self.add_method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ItemName {
        ItemName::parse(s).unwrap()
    }

    #[test]
    fn record_wire_format_uses_camel_case_and_omits_missing_image() {
        let record = ItemRecord {
            count: 3,
            image: None,
            add_method: AddMethod::Camera,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "count": 3, "addMethod": "Camera" }));
    }

    #[test]
    fn record_without_add_method_defaults_to_manual() {
        let record: ItemRecord = serde_json::from_str(r#"{ "count": 7 }"#).unwrap();
        assert_eq!(record.add_method, AddMethod::Manual);
        assert_eq!(record.image, None);
        assert_eq!(record.count, 7);
    }

    #[test]
    fn patch_without_image_keeps_stored_image() {
        let mut record = ItemRecord {
            count: 1,
            image: Some(ImageRef::new("https://img/apple.png")),
            add_method: AddMethod::Camera,
        };
        record.apply_patch(&RecordPatch {
            count: 10,
            add_method: AddMethod::Manual,
            image: None,
        });

        assert_eq!(record.count, 10);
        assert_eq!(record.add_method, AddMethod::Manual);
        assert_eq!(record.image, Some(ImageRef::new("https://img/apple.png")));
    }

    #[test]
    fn patch_with_image_replaces_it() {
        let mut record = ItemRecord {
            count: 1,
            image: Some(ImageRef::new("old")),
            add_method: AddMethod::Manual,
        };
        record.apply_patch(&RecordPatch {
            count: 1,
            add_method: AddMethod::Manual,
            image: Some(ImageRef::new("new")),
        });
        assert_eq!(record.image, Some(ImageRef::new("new")));
    }

    #[test]
    fn display_image_falls_back_to_placeholder() {
        let item = InventoryItem::from_record(
            name("Pear"),
            ItemRecord {
                count: 2,
                image: None,
                add_method: AddMethod::Manual,
            },
        );
        assert_eq!(item.display_image(), PLACEHOLDER_IMAGE);
        assert_eq!(item.identity(), &name("Pear"));
    }

    #[test]
    fn add_method_parses_wire_names_only() {
        assert_eq!("Manual".parse::<AddMethod>().unwrap(), AddMethod::Manual);
        assert_eq!("Camera".parse::<AddMethod>().unwrap(), AddMethod::Camera);
        assert!("camera".parse::<AddMethod>().is_err());
    }
}
