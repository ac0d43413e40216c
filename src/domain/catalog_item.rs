//! Catalog entities produced by the listing and detail endpoints.
//!
//! `ItemReference` only lives long enough to drive a detail lookup.
//! `ItemDetail` is the unit the aggregation engine accumulates; its
//! identity is `id` and nothing else.

use serde::{Deserialize, Serialize};

/// A single entry of a listing page: a display name plus the address of
/// its detail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReference {
    pub name: String,
    pub locator: String,
}

impl ItemReference {
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }
}

/// Fully resolved catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetail {
    /// Stable unique key used for deduplication
    pub id: u32,
    pub name: String,
    /// Artwork address, never empty once resolved (placeholder fallback applies)
    pub image_url: String,
    /// Category tags in server order
    pub categories: Vec<String>,
}

impl ItemDetail {
    /// Zero-padded catalog number, e.g. `#0025`.
    #[must_use]
    pub fn display_number(&self) -> String {
        format!("#{:04}", self.id)
    }

    /// Name with its first character upper-cased.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Total population reported by the server
    pub total_count: u64,
    /// Locator of the following page; `None` once the listing is exhausted
    pub next_cursor: Option<String>,
    pub items: Vec<ItemReference>,
}
