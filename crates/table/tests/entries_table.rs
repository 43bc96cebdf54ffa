//! Controller behavior against an in-memory entry source.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use vitrine_core::entry::Entry;
use vitrine_core::error::CoreError;
use vitrine_core::pagination::PaginationInfo;
use vitrine_core::sorting::SortDirection;
use vitrine_core::source::{EntryPage, EntrySource, LoadEntriesParams};
use vitrine_core::status::{EntryStatus, StatusCounts, StatusFilter};
use vitrine_core::types::DbId;
use vitrine_events::{SyncBus, SyncEvent};
use vitrine_table::{EntriesTable, LoadState, TableConfig};

// ---------------------------------------------------------------------------
// In-memory source
// ---------------------------------------------------------------------------

const FORM: DbId = DbId::from_u128(7);

struct MemorySource {
    entries: Vec<Entry>,
    page_calls: AtomicUsize,
    count_calls: AtomicUsize,
    fail: AtomicBool,
    /// Artificial latency per requested page number.
    delays: Mutex<Vec<(i64, Duration)>>,
    requested: Mutex<Vec<LoadEntriesParams>>,
    /// Entries currently returned, from the front of `entries`.
    visible: AtomicUsize,
    /// Scripted `(latency, em_analise count)` replies for status counts.
    count_replies: Mutex<VecDeque<(Duration, i64)>>,
}

impl MemorySource {
    fn with_entries(n: usize) -> Arc<Self> {
        let now = chrono::Utc::now();
        let entries = (0..n)
            .map(|i| Entry {
                id: DbId::from_u128(1000 + i as u128),
                form_id: FORM,
                status: if i % 2 == 0 {
                    EntryStatus::EmAnalise
                } else {
                    EntryStatus::Verificado
                },
                created_at: now,
                updated_at: now,
                created_by: None,
                values: Default::default(),
                notes: Vec::new(),
                publisher: None,
            })
            .collect();
        Arc::new(Self {
            entries,
            page_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            delays: Mutex::new(Vec::new()),
            requested: Mutex::new(Vec::new()),
            visible: AtomicUsize::new(n),
            count_replies: Mutex::new(VecDeque::new()),
        })
    }

    fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    fn delay_page(&self, page: i64, delay: Duration) {
        self.delays.lock().unwrap().push((page, delay));
    }
}

#[async_trait]
impl EntrySource for MemorySource {
    async fn load_entries_paginated(
        &self,
        params: &LoadEntriesParams,
    ) -> Result<EntryPage, CoreError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(params.clone());

        let delay = self
            .delays
            .lock()
            .unwrap()
            .iter()
            .find(|(page, _)| *page == params.page)
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::Unavailable("connection refused".into()));
        }

        let matching: Vec<Entry> = self
            .entries
            .iter()
            .take(self.visible.load(Ordering::SeqCst))
            .filter(|e| params.status_filter.status().map_or(true, |s| s == e.status))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(((params.page - 1) * params.limit) as usize)
            .take(params.limit as usize)
            .collect();
        Ok(EntryPage {
            data,
            pagination: PaginationInfo::compute(params.page, params.limit, total),
        })
    }

    async fn load_status_counts(&self, _form_id: Option<DbId>) -> Result<StatusCounts, CoreError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.count_replies.lock().unwrap().pop_front();
        if let Some((delay, em_analise)) = scripted {
            tokio::time::sleep(delay).await;
            return Ok(StatusCounts::from_pairs([(EntryStatus::EmAnalise, em_analise)]));
        }
        Ok(StatusCounts::from_pairs(
            self.entries.iter().map(|e| (e.status, 1)).fold(
                Vec::<(EntryStatus, i64)>::new(),
                |mut acc, (status, n)| {
                    match acc.iter_mut().find(|(s, _)| *s == status) {
                        Some(slot) => slot.1 += n,
                        None => acc.push((status, n)),
                    }
                    acc
                },
            ),
        ))
    }
}

fn table(source: &Arc<MemorySource>) -> EntriesTable<MemorySource> {
    EntriesTable::new(Arc::clone(source), Some(FORM), TableConfig::default())
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn repeated_params_within_max_age_hit_the_source_once() {
    let source = MemorySource::with_entries(25);
    let table = table(&source);

    table.handle_page_change(2).await.unwrap();
    table.handle_page_change(3).await.unwrap();
    table.handle_page_change(2).await.unwrap();

    assert_eq!(source.page_calls(), 2);
    assert_eq!(table.load_state(), LoadState::Loaded);
    assert_eq!(table.view().entries.len(), 10);
}

#[tokio::test(start_paused = true)]
async fn expired_pages_are_refetched() {
    let source = MemorySource::with_entries(5);
    let table = table(&source);

    table.load().await.unwrap();
    tokio::time::advance(Duration::from_secs(3 * 60 + 1)).await;
    table.load().await.unwrap();

    assert_eq!(source.page_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn refresh_bypasses_cache_and_reloads_counts() {
    let source = MemorySource::with_entries(5);
    let table = table(&source);

    table.load().await.unwrap();
    table.refresh_entries().await.unwrap();

    assert_eq!(source.page_calls(), 2);
    assert_eq!(source.count_calls.load(Ordering::SeqCst), 1);
    let counts = table.counts();
    assert_eq!(counts.todos, 5);
    assert_eq!(counts.em_analise, 3);
    assert_eq!(counts.verificado, 2);
}

#[tokio::test]
async fn clear_cache_forces_a_reload() {
    let source = MemorySource::with_entries(5);
    let table = table(&source);

    table.load().await.unwrap();
    table.clear_cache();
    table.load().await.unwrap();

    assert_eq!(source.page_calls(), 2);
}

// ---------------------------------------------------------------------------
// Parameter handlers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn filters_and_page_size_reset_to_first_page() {
    let source = MemorySource::with_entries(40);
    let table = table(&source);

    table.handle_page_change(3).await.unwrap();
    table.handle_search("loja").await.unwrap();
    assert_eq!(table.params().page, 1);
    assert_eq!(table.params().search_term.as_deref(), Some("loja"));

    table.handle_page_change(2).await.unwrap();
    table
        .handle_status_filter(StatusFilter::Only(EntryStatus::Verificado))
        .await
        .unwrap();
    assert_eq!(table.params().page, 1);
    assert_eq!(table.pagination().total_items, 20);

    table.handle_page_change(2).await.unwrap();
    table.handle_page_size(25).await.unwrap();
    assert_eq!(table.params().page, 1);
    assert_eq!(table.params().limit, 25);
}

#[tokio::test]
async fn sort_keeps_page_and_toggles_direction() {
    let source = MemorySource::with_entries(40);
    let table = table(&source);
    table.handle_page_change(2).await.unwrap();

    table.handle_sort("status").await.unwrap();
    let sort = table.view().sort;
    assert_eq!(sort.field.as_deref(), Some("status"));
    assert_eq!(sort.direction, SortDirection::Asc);
    assert_eq!(table.params().page, 2);

    table.handle_sort("status").await.unwrap();
    assert_eq!(table.view().sort.direction, SortDirection::Desc);

    table.handle_sort("created_at").await.unwrap();
    let sort = table.view().sort;
    assert_eq!(sort.field.as_deref(), Some("created_at"));
    assert_eq!(sort.direction, SortDirection::Asc);

    let last = source.requested.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.sort_field.as_deref(), Some("created_at"));
    assert_eq!(last.sort_direction, SortDirection::Asc);
}

#[tokio::test]
async fn configured_initial_direction_is_used() {
    let source = MemorySource::with_entries(3);
    let config = TableConfig {
        initial_sort_direction: SortDirection::Desc,
        ..TableConfig::default()
    };
    let table = EntriesTable::new(Arc::clone(&source), Some(FORM), config);

    table.handle_sort("updated_at").await.unwrap();
    assert_eq!(table.view().sort.direction, SortDirection::Desc);
}

// ---------------------------------------------------------------------------
// Errors and overlapping requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failures_surface_as_retryable_error_state() {
    let source = MemorySource::with_entries(3);
    let table = table(&source);
    source.fail.store(true, Ordering::SeqCst);

    let err = table.load().await.unwrap_err();
    assert_matches!(err, CoreError::Unavailable(_));
    assert_matches!(table.load_state(), LoadState::Error(msg) if msg.contains("connection refused"));

    source.fail.store(false, Ordering::SeqCst);
    table.refresh_entries().await.unwrap();
    assert_eq!(table.load_state(), LoadState::Loaded);
}

#[tokio::test(start_paused = true)]
async fn stale_responses_are_discarded() {
    let source = MemorySource::with_entries(40);
    let table = table(&source);
    source.delay_page(2, Duration::from_millis(100));
    source.delay_page(3, Duration::from_millis(10));

    let (slow, fast) = tokio::join!(table.handle_page_change(2), table.handle_page_change(3));
    slow.unwrap();
    fast.unwrap();

    let view = table.view();
    assert_eq!(view.page, 3);
    assert_eq!(view.pagination.current_page, 3);
    assert_eq!(view.entries[0].id, DbId::from_u128(1020));
    assert_eq!(view.load_state, LoadState::Loaded);
}

#[tokio::test(start_paused = true)]
async fn cache_hit_does_not_discard_an_inflight_refresh() {
    let source = MemorySource::with_entries(5);
    let table = table(&source);
    table.load().await.unwrap();

    source.visible.store(4, Ordering::SeqCst);
    source.delay_page(1, Duration::from_millis(100));
    let (refreshed, reloaded) = tokio::join!(table.refresh_entries(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        table.load().await
    });
    refreshed.unwrap();
    reloaded.unwrap();

    assert_eq!(source.page_calls(), 2);
    assert_eq!(table.pagination().total_items, 4);

    // The refreshed page replaced the cached one.
    table.load().await.unwrap();
    assert_eq!(source.page_calls(), 2);
    assert_eq!(table.pagination().total_items, 4);
}

#[tokio::test(start_paused = true)]
async fn older_status_counts_do_not_overwrite_newer_ones() {
    let source = MemorySource::with_entries(1);
    let table = table(&source);
    {
        let mut replies = source.count_replies.lock().unwrap();
        replies.push_back((Duration::from_millis(100), 1));
        replies.push_back((Duration::from_millis(10), 2));
    }

    let (first, second) = tokio::join!(table.refresh_counts(), table.refresh_counts());
    first.unwrap();
    second.unwrap();

    assert_eq!(table.counts().em_analise, 2);
    assert_eq!(table.counts().todos, 2);
}

#[tokio::test(start_paused = true)]
async fn page_loaded_across_an_invalidation_is_shown_but_not_cached() {
    let source = MemorySource::with_entries(5);
    let table = table(&source);
    source.delay_page(1, Duration::from_millis(100));

    let (loaded, ()) = tokio::join!(table.load(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        table.cache().invalidate_form(FORM);
    });
    loaded.unwrap();

    assert_eq!(table.load_state(), LoadState::Loaded);
    assert!(table.cache().is_empty());
}

// ---------------------------------------------------------------------------
// Sync bus
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_event_for_the_form_invalidates_and_refreshes() {
    let source = MemorySource::with_entries(5);
    let table = table(&source);
    let bus = SyncBus::new();
    table.attach(&bus);

    table.load().await.unwrap();
    assert_eq!(source.page_calls(), 1);

    let report = bus.emit(SyncEvent::updated(DbId::new_v4(), FORM)).await;
    assert_eq!(report.delivered, 1);
    assert_eq!(source.page_calls(), 2);
    assert_eq!(source.count_calls.load(Ordering::SeqCst), 1);

    // Other forms do not reach this table.
    bus.emit(SyncEvent::updated(DbId::new_v4(), DbId::from_u128(99))).await;
    assert_eq!(source.page_calls(), 2);
}

#[tokio::test]
async fn dropping_the_table_unsubscribes() {
    let source = MemorySource::with_entries(1);
    let bus = SyncBus::new();
    {
        let table = table(&source);
        table.attach(&bus);
        assert_eq!(bus.listener_count(), 1);
    }
    assert_eq!(bus.listener_count(), 0);

    let table = table(&source);
    table.attach(&bus);
    table.detach();
    assert_eq!(bus.listener_count(), 0);
}
