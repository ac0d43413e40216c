//! Pokedex - incremental catalog loader
//!
//! Pages through a listing endpoint, resolves every entry's detail record
//! concurrently and accumulates a deduplicated, order-preserving catalog.
//! The terminal front end in `main.rs` is one consumer of the read model.

pub mod crawling;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// In-memory fake for unit tests, integration tests and benches
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::sync::Arc;

use crate::crawling::{AggregationEngine, EngineOptions, ListPageFetcher, PokemonDetailFetcher};
use crate::infrastructure::{AppConfig, HttpClient};

/// Wire an engine against the real HTTP endpoints described by `config`.
pub fn build_engine(config: &AppConfig) -> anyhow::Result<AggregationEngine> {
    let page_request = config.page_request()?;
    let http_client = Arc::new(HttpClient::new(config.http.clone())?);

    Ok(AggregationEngine::new(
        Arc::new(ListPageFetcher::new(Arc::clone(&http_client))),
        Arc::new(PokemonDetailFetcher::new(http_client)),
        page_request.first_page_cursor(),
        EngineOptions::from(&config.catalog),
    ))
}
