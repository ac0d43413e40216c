//! Domain module - catalog entities, wire formats and pagination rules
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod catalog_item;
pub mod pagination;
pub mod pokeapi;

pub use catalog_item::{ItemDetail, ItemReference, PageResult};
pub use pagination::{PageRequest, DEFAULT_PAGE_SIZE};
