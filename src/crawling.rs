//! # Catalog Loading Module
//!
//! Incremental, deduplicating retrieval of a paginated catalog.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐   cursor    ┌──────────────────┐
//! │ AggregationEngine │────────────▶│   PageFetcher    │
//! │  (state + gate)   │◀────────────│ (listing page)   │
//! │                   │  PageResult └──────────────────┘
//! │                   │  refs       ┌──────────────────┐
//! │                   │────────────▶│  DetailResolver  │ × page size, concurrent
//! │                   │◀────────────│ (detail record)  │
//! │   merge_unique    │  details    └──────────────────┘
//! └───────────────────┘
//! ```

pub mod engine;
pub mod merge;
pub mod state;
pub mod workers;

pub use engine::{AggregationEngine, EngineOptions, LoadOutcome, PageLoadReport};
pub use merge::{merge_unique, MergeStats};
pub use state::{AggregationState, CatalogSnapshot, PagerPhase, SkipReason};
pub use workers::{DetailResolver, ListPageFetcher, PageFetcher, PokemonDetailFetcher, TransportError};
