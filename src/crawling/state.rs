//! # Aggregation State
//!
//! Session-owned state of the catalog loader: the accumulated items, the
//! cursor, the last reported total and the loading gate. Only the
//! aggregation engine mutates it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::crawling::merge::{merge_unique, MergeStats};
use crate::domain::ItemDetail;

/// Phase of the page loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PagerPhase {
    /// A cursor is available and nothing is in flight
    Idle,
    /// One page-load cycle is in flight
    Loading,
    /// The server reported no further pages
    Exhausted,
}

impl fmt::Display for PagerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Why a load request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    InFlight,
    Exhausted,
    AlreadyStarted,
}

/// Read model handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub items: Vec<ItemDetail>,
    pub total_count: u64,
    pub loading: bool,
    pub has_more: bool,
}

impl CatalogSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug)]
pub struct AggregationState {
    accumulated: Vec<ItemDetail>,
    seen_ids: HashSet<u32>,
    cursor: Option<String>,
    total_count: u64,
    loading: bool,
}

impl AggregationState {
    #[must_use]
    pub fn new(initial_cursor: impl Into<String>) -> Self {
        Self {
            accumulated: Vec::new(),
            seen_ids: HashSet::new(),
            cursor: Some(initial_cursor.into()),
            total_count: 0,
            loading: false,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> PagerPhase {
        if self.loading {
            PagerPhase::Loading
        } else if self.cursor.is_none() {
            PagerPhase::Exhausted
        } else {
            PagerPhase::Idle
        }
    }

    /// Check-then-set of the loading gate. On success the gate is closed and
    /// the cursor to fetch is returned.
    pub fn try_begin_load(&mut self) -> Result<String, SkipReason> {
        if self.loading {
            return Err(SkipReason::InFlight);
        }
        let cursor = self.cursor.clone().ok_or(SkipReason::Exhausted)?;
        self.loading = true;
        Ok(cursor)
    }

    /// Apply a fully resolved page: merge, advance the cursor, record the
    /// total and reopen the gate.
    pub fn commit(
        &mut self,
        total_count: u64,
        next_cursor: Option<String>,
        details: Vec<ItemDetail>,
    ) -> MergeStats {
        let stats = merge_unique(&mut self.accumulated, &mut self.seen_ids, details);
        self.total_count = total_count;
        self.cursor = next_cursor;
        self.loading = false;
        stats
    }

    /// Reopen the gate without touching anything else.
    pub fn abort_load(&mut self) {
        self.loading = false;
    }

    #[must_use]
    pub fn items(&self) -> &[ItemDetail] {
        &self.accumulated
    }

    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            items: self.accumulated.clone(),
            total_count: self.total_count,
            loading: self.loading,
            has_more: self.has_more(),
        }
    }
}
