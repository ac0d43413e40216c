//! # Aggregation Engine
//!
//! Drives one page-load cycle at a time:
//! page fetch → ordered detail fan-out → dedup merge → commit.
//!
//! The loading gate is checked and closed under a single lock before the
//! first `.await`, so overlapping calls are no-ops. A failed cycle leaves
//! items, cursor and total untouched; only the gate reopens.

use futures::{stream, StreamExt, TryStreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::crawling::state::{AggregationState, CatalogSnapshot, PagerPhase, SkipReason};
use crate::crawling::workers::{DetailResolver, PageFetcher, TransportError};
use crate::domain::pagination::cursor_offset;
use crate::domain::{ItemDetail, PageResult};
use crate::infrastructure::config::{defaults, CatalogConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Detail lookups in flight at once; results are still merged in listing order
    pub detail_max_concurrent: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            detail_max_concurrent: defaults::DETAIL_MAX_CONCURRENT,
        }
    }
}

impl From<&CatalogConfig> for EngineOptions {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            detail_max_concurrent: config.detail_max_concurrent,
        }
    }
}

/// What a committed page load did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLoadReport {
    /// Entries on the fetched page
    pub fetched: usize,
    pub appended: usize,
    pub duplicates: usize,
    pub total_count: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(PageLoadReport),
    Skipped(SkipReason),
}

pub struct AggregationEngine {
    page_fetcher: Arc<dyn PageFetcher>,
    detail_resolver: Arc<dyn DetailResolver>,
    state: Mutex<AggregationState>,
    started: AtomicBool,
    options: EngineOptions,
}

impl AggregationEngine {
    pub fn new(
        page_fetcher: Arc<dyn PageFetcher>,
        detail_resolver: Arc<dyn DetailResolver>,
        initial_cursor: impl Into<String>,
        options: EngineOptions,
    ) -> Self {
        Self {
            page_fetcher,
            detail_resolver,
            state: Mutex::new(AggregationState::new(initial_cursor)),
            started: AtomicBool::new(false),
            options: EngineOptions {
                detail_max_concurrent: options.detail_max_concurrent.max(1),
            },
        }
    }

    /// Session-start load. Runs at most once per engine, however many times
    /// the host calls it.
    pub async fn start(&self) -> Result<LoadOutcome, TransportError> {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("Initial load already triggered, ignoring");
            return Ok(LoadOutcome::Skipped(SkipReason::AlreadyStarted));
        }
        info!("🚀 Starting catalog session");
        self.load_next_page().await
    }

    /// Load the next page if one exists and nothing is in flight.
    pub async fn load_next_page(&self) -> Result<LoadOutcome, TransportError> {
        let begin = self.lock_state().try_begin_load();
        let cursor = match begin {
            Ok(cursor) => cursor,
            Err(reason) => {
                debug!("Load request skipped: {:?}", reason);
                return Ok(LoadOutcome::Skipped(reason));
            }
        };
        let mut gate = LoadingGate::new(&self.state);

        let start_time = Instant::now();
        debug!("Page load started (offset {:?}): {}", cursor_offset(&cursor), cursor);

        match self.run_cycle(&cursor).await {
            Ok((page, details)) => {
                let fetched = page.items.len();
                let (stats, report) = {
                    let mut state = self.lock_state();
                    let stats = state.commit(page.total_count, page.next_cursor, details);
                    let report = PageLoadReport {
                        fetched,
                        appended: stats.appended,
                        duplicates: stats.duplicates,
                        total_count: state.total_count(),
                        has_more: state.has_more(),
                    };
                    (stats, report)
                };
                gate.disarm();

                info!(
                    "Page merged: {} appended, {} duplicates dropped, total {} ({:?})",
                    stats.appended,
                    stats.duplicates,
                    report.total_count,
                    start_time.elapsed()
                );
                if !report.has_more {
                    info!("🏁 Catalog exhausted");
                }
                Ok(LoadOutcome::Loaded(report))
            }
            Err(e) => {
                warn!("Page load failed, state unchanged: {}", e);
                Err(e)
            }
        }
    }

    async fn run_cycle(
        &self,
        cursor: &str,
    ) -> Result<(PageResult, Vec<ItemDetail>), TransportError> {
        let page = self.page_fetcher.fetch(cursor).await?;
        info!(
            "Fetched page: {} entries, total {}, next {:?}",
            page.items.len(),
            page.total_count,
            page.next_cursor
        );

        // Owned futures keep the cycle `Send` for spawned callers.
        let lookups: Vec<_> = page
            .items
            .iter()
            .map(|reference| self.detail_resolver.resolve(reference))
            .collect();
        let details: Vec<ItemDetail> = stream::iter(lookups)
            .buffered(self.options.detail_max_concurrent)
            .try_collect()
            .await?;

        Ok((page, details))
    }

    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.lock_state().snapshot()
    }

    #[must_use]
    pub fn phase(&self) -> PagerPhase {
        self.lock_state().phase()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.lock_state().has_more()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_state().items().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_state(&self) -> MutexGuard<'_, AggregationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reopens the loading gate when a cycle ends without committing, including
/// when the cycle's future is dropped.
struct LoadingGate<'a> {
    state: &'a Mutex<AggregationState>,
    armed: bool,
}

impl<'a> LoadingGate<'a> {
    const fn new(state: &'a Mutex<AggregationState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGate<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .abort_load();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryCatalog;

    fn engine_for(catalog: &Arc<InMemoryCatalog>) -> AggregationEngine {
        AggregationEngine::new(
            catalog.clone(),
            catalog.clone(),
            catalog.first_cursor(),
            EngineOptions::default(),
        )
    }

    fn ids(engine: &AggregationEngine) -> Vec<u32> {
        engine.snapshot().items.iter().map(|i| i.id).collect()
    }

    #[tokio::test]
    async fn twelve_items_in_three_pages() {
        let catalog = Arc::new(InMemoryCatalog::paged(12, 5));
        let engine = engine_for(&catalog);

        let mut lengths = Vec::new();
        for _ in 0..3 {
            let outcome = engine.load_next_page().await.unwrap();
            assert!(matches!(outcome, LoadOutcome::Loaded(_)));
            lengths.push(engine.len());
        }

        assert_eq!(lengths, vec![5, 10, 12]);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.total_count, 12);
        assert!(!snapshot.has_more);
        assert_eq!(engine.phase(), PagerPhase::Exhausted);
        assert_eq!(ids(&engine), (1..=12).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn exhausted_engine_ignores_further_loads() {
        let catalog = Arc::new(InMemoryCatalog::paged(3, 5));
        let engine = engine_for(&catalog);

        engine.load_next_page().await.unwrap();
        let before = engine.snapshot();

        let outcome = engine.load_next_page().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Skipped(SkipReason::Exhausted));
        assert_eq!(engine.snapshot(), before);
        assert_eq!(catalog.page_fetches(), 1);
    }

    #[tokio::test]
    async fn overlapping_calls_run_one_cycle() {
        let catalog = Arc::new(InMemoryCatalog::paged(12, 5));
        let engine = engine_for(&catalog);

        let (first, second) = tokio::join!(engine.load_next_page(), engine.load_next_page());
        let outcomes = [first.unwrap(), second.unwrap()];

        let loaded = outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Loaded(_)))
            .count();
        assert_eq!(loaded, 1);
        assert!(outcomes.contains(&LoadOutcome::Skipped(SkipReason::InFlight)));
        assert_eq!(catalog.page_fetches(), 1);
        assert_eq!(engine.len(), 5);
    }

    #[tokio::test]
    async fn detail_failure_rolls_back_everything() {
        let catalog = Arc::new(InMemoryCatalog::paged(12, 5));
        let engine = engine_for(&catalog);
        engine.load_next_page().await.unwrap();
        let before = engine.snapshot();

        catalog.fail_locator(&InMemoryCatalog::locator_for(8));
        let result = engine.load_next_page().await;

        assert!(matches!(result, Err(TransportError::HttpStatus { status: 500, .. })));
        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.phase(), PagerPhase::Idle);

        catalog.heal_locator(&InMemoryCatalog::locator_for(8));
        engine.load_next_page().await.unwrap();
        assert_eq!(engine.len(), 10);
    }

    #[tokio::test]
    async fn page_failure_keeps_cursor_for_retry() {
        let catalog = Arc::new(InMemoryCatalog::paged(12, 5));
        let engine = engine_for(&catalog);

        catalog.fail_cursor(&catalog.first_cursor());
        assert!(engine.load_next_page().await.is_err());
        assert!(engine.is_empty());
        assert!(!engine.is_loading());
        assert_eq!(engine.snapshot().total_count, 0);

        catalog.heal_cursor(&catalog.first_cursor());
        engine.load_next_page().await.unwrap();
        assert_eq!(ids(&engine), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn merge_follows_listing_order_not_completion_order() {
        let catalog = Arc::new(InMemoryCatalog::paged(5, 5));
        for id in 1..=5 {
            // earlier entries finish later
            catalog.set_yields(&InMemoryCatalog::locator_for(id), (6 - id) as usize * 3);
        }
        let engine = engine_for(&catalog);

        engine.load_next_page().await.unwrap();
        assert_eq!(ids(&engine), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn duplicate_reference_within_page_kept_once() {
        let catalog = Arc::new(InMemoryCatalog::paged(12, 5));
        catalog.duplicate_entry(&catalog.first_cursor(), 1);
        let engine = engine_for(&catalog);

        let outcome = engine.load_next_page().await.unwrap();
        let LoadOutcome::Loaded(report) = outcome else {
            panic!("expected a committed page, got {outcome:?}");
        };
        assert_eq!(report.fetched, 6);
        assert_eq!(report.appended, 5);
        assert_eq!(report.duplicates, 1);
        assert_eq!(ids(&engine), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn start_runs_only_once() {
        let catalog = Arc::new(InMemoryCatalog::paged(12, 5));
        let engine = engine_for(&catalog);

        assert!(matches!(engine.start().await.unwrap(), LoadOutcome::Loaded(_)));
        assert_eq!(
            engine.start().await.unwrap(),
            LoadOutcome::Skipped(SkipReason::AlreadyStarted)
        );
        assert_eq!(catalog.page_fetches(), 1);
        assert_eq!(engine.len(), 5);
    }

    #[tokio::test]
    async fn dropped_cycle_reopens_gate() {
        let catalog = Arc::new(InMemoryCatalog::paged(12, 5));
        let engine = engine_for(&catalog);

        {
            let mut pending = Box::pin(engine.load_next_page());
            // poll once so the gate closes, then abandon the cycle
            assert!(futures::poll!(pending.as_mut()).is_pending());
            assert!(engine.is_loading());
        }

        assert!(!engine.is_loading());
        assert!(engine.is_empty());
        engine.load_next_page().await.unwrap();
        assert_eq!(engine.len(), 5);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn load_and_start_futures_are_send() {
        let catalog = Arc::new(InMemoryCatalog::paged(5, 5));
        let engine = engine_for(&catalog);
        assert_send(&engine.load_next_page());
        assert_send(&engine.start());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn spawned_cycle_commits_page() {
        let catalog = Arc::new(InMemoryCatalog::paged(12, 5));
        let engine = Arc::new(engine_for(&catalog));

        let task_engine = Arc::clone(&engine);
        let outcome = tokio::spawn(async move { task_engine.load_next_page().await })
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(outcome, LoadOutcome::Loaded(_)));
        assert_eq!(ids(&engine), vec![1, 2, 3, 4, 5]);
    }
}
