//! In-memory view over the last full read of the inventory.

use crate::item::InventoryItem;

/// The item list as last read from storage, plus the active search term.
///
/// The list is only ever replaced wholesale after a successful write, never
/// patched, so what is shown always matches one consistent read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogView {
    items: Vec<InventoryItem>,
    search: String,
}

impl CatalogView {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self {
            items,
            search: String::new(),
        }
    }

    pub fn replace(&mut self, items: Vec<InventoryItem>) {
        self.items = items;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// Number of items in inventory, ignoring the search filter.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Items whose name contains the search term, case-insensitively.
    pub fn filtered(&self) -> Vec<&InventoryItem> {
        let needle = self.search.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.name.as_str().to_lowercase().contains(&needle))
            .collect()
    }

    /// "N Search result(s) found." while a search is active.
    pub fn result_summary(&self) -> Option<String> {
        if self.search.is_empty() {
            return None;
        }
        let n = self.filtered().len();
        let plural = if n == 1 { "" } else { "s" };
        Some(format!("{n} Search result{plural} found."))
    }
}
