//! Pagination domain logic.
//!
//! Responsibility:
//! - building the first listing cursor from the configured endpoint and page size
//! - reading the offset back out of a server-issued cursor for diagnostics

use url::Url;

/// Number of items requested per listing page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    listing_url: Url,
    page_size: u32,
}

impl PageRequest {
    pub fn new(listing_url: &str, page_size: u32) -> Result<Self, url::ParseError> {
        Ok(Self {
            listing_url: Url::parse(listing_url)?,
            page_size,
        })
    }

    /// Cursor for the first page: the listing URL with `limit` set to the page size.
    /// Any `limit` already present on the configured URL is replaced.
    #[must_use]
    pub fn first_page_cursor(&self) -> String {
        let mut url = self.listing_url.clone();
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "limit")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in &retained {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("limit", &self.page_size.to_string());
        }

        url.to_string()
    }
}

/// Offset encoded in a listing cursor (`?offset=N`), `0` when absent.
/// Returns `None` for cursors that are not URLs.
#[must_use]
pub fn cursor_offset(cursor: &str) -> Option<u64> {
    let url = Url::parse(cursor).ok()?;
    let offset = url
        .query_pairs()
        .find(|(key, _)| key == "offset")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(0);
    Some(offset)
}
