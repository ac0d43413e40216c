//! PokeAPI wire formats.
//!
//! Response bodies are deserialized into these DTOs first and only then
//! converted into the catalog entities, so a shape mismatch surfaces as a
//! parse error at the transport boundary rather than deep in the engine.

use serde::Deserialize;

use crate::domain::catalog_item::{ItemDetail, ItemReference, PageResult};

/// Artwork used when the detail record carries no official artwork.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/0.png";

/// `GET /pokemon?limit=N` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    pub count: u64,
    pub next: Option<String>,
    pub results: Vec<ListEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub url: String,
}

impl From<ListResponse> for PageResult {
    fn from(response: ListResponse) -> Self {
        Self {
            total_count: response.count,
            next_cursor: response.next,
            items: response
                .results
                .into_iter()
                .map(|entry| ItemReference::new(entry.name, entry.url))
                .collect(),
        }
    }
}

/// `GET /pokemon/{id}/` response, reduced to the fields the catalog keeps.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailResponse {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub sprites: Option<Sprites>,
    pub types: Vec<TypeSlot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<Artwork>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artwork {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

impl From<DetailResponse> for ItemDetail {
    fn from(response: DetailResponse) -> Self {
        let image_url = response
            .sprites
            .and_then(|sprites| sprites.other)
            .and_then(|other| other.official_artwork)
            .and_then(|artwork| artwork.front_default)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());

        Self {
            id: response.id,
            name: response.name,
            image_url,
            categories: response.types.into_iter().map(|slot| slot.kind.name).collect(),
        }
    }
}
