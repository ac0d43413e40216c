//! Terminal presentation of the catalog read model.
//!
//! Nothing here touches engine state; it only formats a [`CatalogSnapshot`].

use colored::{Color, Colorize};

use crate::crawling::CatalogSnapshot;
use crate::domain::ItemDetail;

pub const TITLE: &str = "Pokédex";
pub const LOAD_MORE_LABEL: &str = "Load more Pokémon";
pub const LOADING_LABEL: &str = "Loading...";

/// Badge colour for unmapped type tags.
pub const DEFAULT_TYPE_COLOR: Color = Color::TrueColor { r: 107, g: 114, b: 128 };

/// Badge colour for a type tag.
#[must_use]
pub const fn type_color(tag: &str) -> Color {
    let (r, g, b) = match tag.as_bytes() {
        b"grass" => (34, 197, 94),
        b"fire" => (249, 115, 22),
        b"water" => (59, 130, 246),
        b"bug" => (101, 163, 13),
        b"flying" => (129, 140, 248),
        b"poison" => (168, 85, 247),
        b"normal" => (156, 163, 175),
        b"electric" => (250, 204, 21),
        b"ground" => (161, 98, 7),
        b"fairy" => (244, 114, 182),
        b"fighting" => (185, 28, 28),
        b"psychic" => (236, 72, 153),
        b"rock" => (133, 77, 14),
        b"ice" => (34, 211, 238),
        b"dragon" => (67, 56, 202),
        b"dark" => (55, 65, 81),
        b"steel" => (107, 114, 128),
        b"ghost" => (126, 34, 206),
        _ => return DEFAULT_TYPE_COLOR,
    };
    Color::TrueColor { r, g, b }
}

#[must_use]
pub fn type_badge(tag: &str) -> String {
    format!(" {tag} ").white().on_color(type_color(tag)).to_string()
}

/// One line per item: number, name, type badges, artwork URL.
#[must_use]
pub fn render_card(item: &ItemDetail) -> String {
    let badges: Vec<String> = item.categories.iter().map(|tag| type_badge(tag)).collect();
    format!(
        "{} {:<14} {}  {}",
        item.display_number().dimmed(),
        item.display_name().bold(),
        badges.join(" "),
        item.image_url.dimmed()
    )
}

#[must_use]
pub fn render_footer(snapshot: &CatalogSnapshot) -> String {
    format!(
        "Showing {} of {} Pokémon",
        snapshot.len().to_string().bold(),
        snapshot.total_count.to_string().bold()
    )
}

/// Label of the load-more trigger, or `None` once the catalog is exhausted.
#[must_use]
pub const fn trigger_label(snapshot: &CatalogSnapshot) -> Option<&'static str> {
    if !snapshot.has_more {
        None
    } else if snapshot.loading {
        Some(LOADING_LABEL)
    } else {
        Some(LOAD_MORE_LABEL)
    }
}

/// Cards for `items[from..]`, newline separated.
#[must_use]
pub fn render_items_from(snapshot: &CatalogSnapshot, from: usize) -> String {
    snapshot
        .items
        .iter()
        .skip(from)
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n")
}

/// What a line typed at the load-more prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    LoadMore,
    Quit,
    Ignore,
}

/// Only an empty line triggers a load; `q` in either case quits.
#[must_use]
pub fn parse_prompt(line: &str) -> PromptAction {
    match line.trim() {
        "" => PromptAction::LoadMore,
        input if input.eq_ignore_ascii_case("q") => PromptAction::Quit,
        _ => PromptAction::Ignore,
    }
}
