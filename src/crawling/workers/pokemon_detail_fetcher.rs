//! # Pokémon Detail Fetcher Worker
//!
//! Resolves a listing entry into a full [`ItemDetail`] by following its locator.

use async_trait::async_trait;
use std::sync::Arc;

use super::{DetailResolver, TransportError};
use crate::domain::pokeapi::DetailResponse;
use crate::domain::{ItemDetail, ItemReference};
use crate::infrastructure::HttpClient;

/// Worker that fetches Pokémon detail records
pub struct PokemonDetailFetcher {
    http_client: Arc<HttpClient>,
}

impl PokemonDetailFetcher {
    pub const fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl DetailResolver for PokemonDetailFetcher {
    async fn resolve(&self, reference: &ItemReference) -> Result<ItemDetail, TransportError> {
        let response: DetailResponse = self.http_client.get_json(&reference.locator).await?;
        let detail = ItemDetail::from(response);

        tracing::debug!(
            "Resolved {} -> id {} ({} types)",
            reference.name,
            detail.id,
            detail.categories.len()
        );
        Ok(detail)
    }
}
