use serde::{Deserialize, Serialize};

use pantry_core::ItemName;
use pantry_infra::SubmitOutcome;
use pantry_inventory::{AddMethod, CatalogView, ImageRef, InventoryItem, Submission};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /items` and `PUT /items/{name}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub name: String,
    pub count: i64,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub add_method: Option<AddMethod>,
}

impl ItemRequest {
    pub fn into_new_entry(self) -> Submission {
        let base = Submission::new_entry(self.name.as_str(), self.count);
        self.decorate(base)
    }

    pub fn into_edit(self, prior: ItemName) -> Submission {
        let base = Submission::edit(prior, self.name.as_str(), self.count);
        self.decorate(base)
    }

    fn decorate(self, mut submission: Submission) -> Submission {
        if let Some(image) = self.image {
            submission = submission.with_image(image);
        }
        if let Some(add_method) = self.add_method {
            submission = submission.with_add_method(add_method);
        }
        submission
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub name: String,
    pub count: i64,
    /// Stored photo URL, or the placeholder.
    pub image: String,
    pub has_photo: bool,
    pub add_method: AddMethod,
}

impl From<&InventoryItem> for ItemView {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.to_string(),
            count: item.count,
            image: item.display_image().to_string(),
            has_photo: item.image.is_some(),
            add_method: item.add_method,
        }
    }
}

pub fn item_views<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Vec<ItemView> {
    items.into_iter().map(ItemView::from).collect()
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<ItemView>,
    pub total: usize,
    pub matched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl From<&CatalogView> for ListResponse {
    fn from(view: &CatalogView) -> Self {
        let filtered = view.filtered();
        Self {
            matched: filtered.len(),
            items: item_views(filtered),
            total: view.total(),
            summary: view.result_summary(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub plan: &'static str,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<String>,
    pub count: i64,
    pub items: Vec<ItemView>,
}

impl From<SubmitOutcome> for SubmitResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        Self {
            plan: outcome.plan.as_str(),
            destination: outcome.destination.to_string(),
            removed: outcome.removed.map(|n| n.to_string()),
            count: outcome.count,
            items: item_views(&outcome.items),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}
