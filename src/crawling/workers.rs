//! # Fetch Workers
//!
//! Leaf I/O components of the catalog pipeline:
//! - [`PageFetcher`]: cursor → one listing page
//! - [`DetailResolver`]: listing entry → full item record
//!
//! Both fail with [`TransportError`] and never retry; the engine decides
//! what a failure means for the page load.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ItemDetail, ItemReference, PageResult};

pub mod list_page_fetcher;
pub mod pokemon_detail_fetcher;

pub use list_page_fetcher::ListPageFetcher;
pub use pokemon_detail_fetcher::PokemonDetailFetcher;

/// Any failure talking to the catalog endpoints.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("HTTP error {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Fetches one page of listing results.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, cursor: &str) -> Result<PageResult, TransportError>;
}

/// Resolves a listing entry into its full record.
#[async_trait]
pub trait DetailResolver: Send + Sync {
    async fn resolve(&self, reference: &ItemReference) -> Result<ItemDetail, TransportError>;
}
