//! # List Page Fetcher Worker
//!
//! Fetches one page of the catalog listing and converts it into a [`PageResult`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::{PageFetcher, TransportError};
use crate::domain::pokeapi::ListResponse;
use crate::domain::PageResult;
use crate::infrastructure::HttpClient;

/// Worker that fetches listing pages
pub struct ListPageFetcher {
    http_client: Arc<HttpClient>,
}

impl ListPageFetcher {
    pub const fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl PageFetcher for ListPageFetcher {
    async fn fetch(&self, cursor: &str) -> Result<PageResult, TransportError> {
        let start_time = Instant::now();
        let response: ListResponse = self.http_client.get_json(cursor).await?;
        let page = PageResult::from(response);

        tracing::debug!(
            "Fetched listing page {} ({} entries, total {}, {:?})",
            cursor,
            page.items.len(),
            page.total_count,
            start_time.elapsed()
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::HttpClientConfig;
    use crate::test_utils::serve_canned;

    fn client() -> Arc<HttpClient> {
        Arc::new(HttpClient::new(HttpClientConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn listing_body_becomes_page_result() {
        let base = serve_canned(
            200,
            r#"{
                "count": 1302,
                "next": "https://pokeapi.co/api/v2/pokemon?offset=2&limit=2",
                "previous": null,
                "results": [
                    {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                    {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"}
                ]
            }"#,
        )
        .await;
        let fetcher = ListPageFetcher::new(client());

        let page = fetcher.fetch(&format!("{base}/pokemon?limit=2")).await.unwrap();
        assert_eq!(page.total_count, 1302);
        assert_eq!(
            page.next_cursor.as_deref(),
            Some("https://pokeapi.co/api/v2/pokemon?offset=2&limit=2")
        );
        let names: Vec<_> = page.items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["bulbasaur", "ivysaur"]);
    }

    #[tokio::test]
    async fn server_error_is_reported_with_status() {
        let base = serve_canned(503, "{}").await;
        let fetcher = ListPageFetcher::new(client());

        let result = fetcher.fetch(&format!("{base}/pokemon?limit=5")).await;
        assert!(matches!(result, Err(TransportError::HttpStatus { status: 503, .. })));
    }

    #[tokio::test]
    async fn non_url_cursor_fails_without_network() {
        let client = Arc::new(HttpClient::new(HttpClientConfig::default()).unwrap());
        let fetcher = ListPageFetcher::new(client);

        let result = fetcher.fetch("page-2").await;
        assert!(matches!(result, Err(TransportError::InvalidUrl { .. })));
    }
}
