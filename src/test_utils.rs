//! Test utilities for the catalog loader
//!
//! [`InMemoryCatalog`] plays both the listing and the detail endpoint from
//! memory, so engine behaviour can be exercised without a network. Pages,
//! failures and completion timing can be shaped per test.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::crawling::workers::{DetailResolver, PageFetcher, TransportError};
use crate::domain::{ItemDetail, ItemReference, PageResult};

const CURSOR_BASE: &str = "mem://catalog/pokemon";
const LOCATOR_BASE: &str = "mem://catalog/pokemon";
const TYPE_CYCLE: [&str; 4] = ["grass", "fire", "water", "bug"];

#[derive(Debug, Default)]
struct CatalogData {
    pages: HashMap<String, PageResult>,
    details: HashMap<String, ItemDetail>,
    failing_cursors: HashSet<String>,
    failing_locators: HashSet<String>,
    yields: HashMap<String, usize>,
}

/// In-memory listing + detail endpoint
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    data: Mutex<CatalogData>,
    first_cursor: String,
    page_fetches: AtomicUsize,
    detail_fetches: AtomicUsize,
}

impl InMemoryCatalog {
    /// `total` items with ids `1..=total`, split into pages of `page_size`.
    #[must_use]
    pub fn paged(total: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let mut data = CatalogData::default();

        for id in 1..=total {
            data.details.insert(Self::locator_for(id), sample_detail(id));
        }

        let mut offset = 0;
        loop {
            let end = (offset + page_size).min(total);
            let next_cursor = (end < total).then(|| Self::cursor_for(end, page_size));
            let items = (offset + 1..=end)
                .map(|id| ItemReference::new(format!("pokemon-{id}"), Self::locator_for(id)))
                .collect();
            data.pages.insert(
                Self::cursor_for(offset, page_size),
                PageResult {
                    total_count: u64::from(total),
                    next_cursor,
                    items,
                },
            );
            if end >= total {
                break;
            }
            offset = end;
        }

        Self {
            data: Mutex::new(data),
            first_cursor: Self::cursor_for(0, page_size),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn cursor_for(offset: u32, page_size: u32) -> String {
        format!("{CURSOR_BASE}?offset={offset}&limit={page_size}")
    }

    #[must_use]
    pub fn locator_for(id: u32) -> String {
        format!("{LOCATOR_BASE}/{id}/")
    }

    #[must_use]
    pub fn first_cursor(&self) -> String {
        self.first_cursor.clone()
    }

    /// Replace or add the page served for `cursor`.
    pub fn set_page(&self, cursor: &str, page: PageResult) {
        self.data().pages.insert(cursor.to_string(), page);
    }

    /// Append a second copy of the entry at `index` to the page at `cursor`.
    pub fn duplicate_entry(&self, cursor: &str, index: usize) {
        let mut data = self.data();
        if let Some(page) = data.pages.get_mut(cursor) {
            if let Some(entry) = page.items.get(index).cloned() {
                page.items.push(entry);
            }
        }
    }

    pub fn fail_cursor(&self, cursor: &str) {
        self.data().failing_cursors.insert(cursor.to_string());
    }

    pub fn heal_cursor(&self, cursor: &str) {
        self.data().failing_cursors.remove(cursor);
    }

    pub fn fail_locator(&self, locator: &str) {
        self.data().failing_locators.insert(locator.to_string());
    }

    pub fn heal_locator(&self, locator: &str) {
        self.data().failing_locators.remove(locator);
    }

    /// Make the detail lookup for `locator` yield `count` times before answering.
    pub fn set_yields(&self, locator: &str, count: usize) {
        self.data().yields.insert(locator.to_string(), count);
    }

    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }

    pub fn detail_fetches(&self) -> usize {
        self.detail_fetches.load(Ordering::SeqCst)
    }

    fn data(&self) -> MutexGuard<'_, CatalogData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PageFetcher for InMemoryCatalog {
    async fn fetch(&self, cursor: &str) -> Result<PageResult, TransportError> {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let data = self.data();
        if data.failing_cursors.contains(cursor) {
            return Err(server_error(cursor));
        }
        data.pages
            .get(cursor)
            .cloned()
            .ok_or_else(|| not_found(cursor))
    }
}

#[async_trait]
impl DetailResolver for InMemoryCatalog {
    async fn resolve(&self, reference: &ItemReference) -> Result<ItemDetail, TransportError> {
        self.detail_fetches.fetch_add(1, Ordering::SeqCst);

        let yields = self.data().yields.get(&reference.locator).copied().unwrap_or(0);
        for _ in 0..yields {
            tokio::task::yield_now().await;
        }

        let data = self.data();
        if data.failing_locators.contains(&reference.locator) {
            return Err(server_error(&reference.locator));
        }
        data.details
            .get(&reference.locator)
            .cloned()
            .ok_or_else(|| not_found(&reference.locator))
    }
}

/// Detail record with deterministic name, artwork and types for `id`.
#[must_use]
pub fn sample_detail(id: u32) -> ItemDetail {
    ItemDetail {
        id,
        name: format!("pokemon-{id}"),
        image_url: format!("https://example.test/artwork/{id}.png"),
        categories: vec![TYPE_CYCLE[id as usize % TYPE_CYCLE.len()].to_string()],
    }
}

fn server_error(url: &str) -> TransportError {
    TransportError::HttpStatus {
        status: 500,
        url: url.to_string(),
    }
}

fn not_found(url: &str) -> TransportError {
    TransportError::HttpStatus {
        status: 404,
        url: url.to_string(),
    }
}

/// Serve `body` with `status` to every connection on a local port and
/// return the base URL (`http://127.0.0.1:{port}`).
#[cfg(test)]
pub(crate) async fn serve_canned(status: u16, body: impl Into<String>) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}")
}
