//! Pagination and cache controller for an entries table.
//!
//! [`EntriesTable`] owns the query parameters of one table, serves pages
//! from its [`PageCache`] when fresh, and otherwise loads them from an
//! [`EntrySource`]. Every source load takes a generation number; a response
//! is applied only while its generation is the latest issued and its key is
//! still the current key, so overlapping requests resolve to the last one
//! issued. Status counts carry their own generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use vitrine_core::error::CoreError;
use vitrine_core::pagination::PaginationInfo;
use vitrine_core::sorting::{SortDirection, SortState};
use vitrine_core::source::{EntryPage, EntrySource, LoadEntriesParams};
use vitrine_core::status::{StatusCounts, StatusFilter};
use vitrine_core::types::DbId;
use vitrine_events::{ListenerError, ListenerSpec, Subscription, SyncBus, SyncEvent};

use crate::cache::PageCache;
use crate::config::TableConfig;
use crate::state::{LoadState, TableView};

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

struct TableState {
    params: LoadEntriesParams,
    sort: SortState,
    load_state: LoadState,
    page: EntryPage,
    counts: StatusCounts,
}

struct Inner<S> {
    id: u64,
    source: Arc<S>,
    cache: PageCache,
    initial_sort_direction: SortDirection,
    state: Mutex<TableState>,
    generation: AtomicU64,
    counts_generation: AtomicU64,
    subscription: Mutex<Option<Subscription>>,
}

/// Handle to one entries table. Clones share state.
pub struct EntriesTable<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for EntriesTable<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: EntrySource> EntriesTable<S> {
    /// A table over one form (or all forms when `form_id` is `None`). Nothing
    /// is loaded until the first handler call or [`load`](Self::load).
    pub fn new(source: Arc<S>, form_id: Option<DbId>, config: TableConfig) -> Self {
        let sort = SortState {
            field: None,
            direction: SortDirection::Desc,
        };
        let params = LoadEntriesParams {
            form_id,
            page: 1,
            limit: config.page_size,
            sort_field: sort.field.clone(),
            sort_direction: sort.direction,
            search_term: None,
            status_filter: StatusFilter::All,
        };
        let page = EntryPage::empty(1, config.page_size);

        Self {
            inner: Arc::new(Inner {
                id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
                source,
                cache: PageCache::new(config.cache_max_age, config.cache_max_entries),
                initial_sort_direction: config.initial_sort_direction,
                state: Mutex::new(TableState {
                    params,
                    sort,
                    load_state: LoadState::Idle,
                    page,
                    counts: StatusCounts::default(),
                }),
                generation: AtomicU64::new(0),
                counts_generation: AtomicU64::new(0),
                subscription: Mutex::new(None),
            }),
        }
    }

    pub fn form_id(&self) -> Option<DbId> {
        lock(&self.inner.state).params.form_id
    }

    pub fn params(&self) -> LoadEntriesParams {
        lock(&self.inner.state).params.clone()
    }

    pub fn load_state(&self) -> LoadState {
        lock(&self.inner.state).load_state.clone()
    }

    pub fn view(&self) -> TableView {
        let state = lock(&self.inner.state);
        TableView {
            load_state: state.load_state.clone(),
            entries: state.page.data.clone(),
            pagination: state.page.pagination,
            counts: state.counts,
            page: state.params.page,
            page_size: state.params.limit,
            sort: state.sort.clone(),
            search_term: state.params.search_term.clone(),
            status_filter: state.params.status_filter,
        }
    }

    pub fn pagination(&self) -> PaginationInfo {
        lock(&self.inner.state).page.pagination
    }

    pub fn counts(&self) -> StatusCounts {
        lock(&self.inner.state).counts
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    /// Apply a search term and return to the first page.
    pub async fn handle_search(&self, term: &str) -> Result<(), CoreError> {
        let term = term.trim();
        self.update(|state| {
            state.params.search_term = (!term.is_empty()).then(|| term.to_string());
            state.params.page = 1;
        });
        self.load().await
    }

    /// Apply a status filter and return to the first page.
    pub async fn handle_status_filter(&self, filter: StatusFilter) -> Result<(), CoreError> {
        self.update(|state| {
            state.params.status_filter = filter;
            state.params.page = 1;
        });
        self.load().await
    }

    /// Change the page size and return to the first page.
    pub async fn handle_page_size(&self, page_size: i64) -> Result<(), CoreError> {
        self.update(|state| {
            state.params.limit = page_size;
            state.params.page = 1;
        });
        self.load().await
    }

    pub async fn handle_page_change(&self, page: i64) -> Result<(), CoreError> {
        self.update(|state| state.params.page = page);
        self.load().await
    }

    /// Click on a column header. The current page is kept.
    pub async fn handle_sort(&self, field: &str) -> Result<(), CoreError> {
        let initial = self.inner.initial_sort_direction;
        self.update(|state| {
            state.sort.toggle(field, initial);
            state.params.sort_field = state.sort.field.clone();
            state.params.sort_direction = state.sort.direction;
        });
        self.load().await
    }

    /// Reload the current page bypassing the cache, together with the status
    /// counts.
    pub async fn refresh_entries(&self) -> Result<(), CoreError> {
        let (page, counts) = futures::join!(self.fetch(true), self.refresh_counts());
        page.and(counts)
    }

    /// Reload the status counts of the table's form. Only the latest of
    /// overlapping reloads is applied.
    pub async fn refresh_counts(&self) -> Result<(), CoreError> {
        let generation = self.inner.counts_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let form_id = self.form_id();
        let counts = self.inner.source.load_status_counts(form_id).await?;

        let mut state = lock(&self.inner.state);
        if self.inner.counts_generation.load(Ordering::SeqCst) == generation {
            state.counts = counts;
        } else {
            tracing::debug!(generation, "Discarding stale status counts");
        }
        Ok(())
    }

    /// Load the current page, from cache when fresh.
    pub async fn load(&self) -> Result<(), CoreError> {
        self.fetch(false).await
    }

    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    pub fn cache(&self) -> &PageCache {
        &self.inner.cache
    }

    // -----------------------------------------------------------------------
    // Sync
    // -----------------------------------------------------------------------

    /// Listen for changes on the bus. Changes to this table's form (or any
    /// form for an unscoped table) invalidate the cache and refresh. The
    /// listener is removed when the last handle to the table is dropped or
    /// on [`detach`](Self::detach).
    pub fn attach(&self, bus: &SyncBus) {
        let weak: Weak<Inner<S>> = Arc::downgrade(&self.inner);
        let listener_id = format!("entries-table-{}", self.inner.id);
        let mut spec = ListenerSpec::new(listener_id, move |event: SyncEvent| {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return Ok(());
                };
                let table = EntriesTable { inner };
                table.inner.cache.invalidate_form(event.form_id);
                tracing::debug!(
                    table = table.inner.id,
                    kind = %event.kind,
                    entry_id = %event.entry_id,
                    "Refreshing table after sync event"
                );
                table
                    .refresh_entries()
                    .await
                    .map_err(|err| Box::new(err) as ListenerError)
            }
        });
        if let Some(form_id) = self.form_id() {
            spec = spec.for_form(form_id);
        }

        let subscription = bus.add_listener(spec);
        *lock(&self.inner.subscription) = Some(subscription);
    }

    /// Stop listening to the bus.
    pub fn detach(&self) {
        lock(&self.inner.subscription).take();
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn update(&self, apply: impl FnOnce(&mut TableState)) {
        apply(&mut lock(&self.inner.state));
    }

    /// Cache hits do not take a generation, so they never discard a load
    /// already in flight. A loaded page is cached under its own key even when
    /// it is too late to be shown.
    async fn fetch(&self, bypass_cache: bool) -> Result<(), CoreError> {
        let (generation, params, ticket) = {
            let mut state = lock(&self.inner.state);
            if !bypass_cache {
                if let Some(page) = self.inner.cache.get(&state.params) {
                    state.page = page;
                    state.load_state = LoadState::Loaded;
                    return Ok(());
                }
            }
            state.load_state = LoadState::Loading;
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (generation, state.params.clone(), self.inner.cache.ticket())
        };
        let key = params.cache_key();

        let result = self.inner.source.load_entries_paginated(&params).await;
        if let Ok(page) = &result {
            self.inner.cache.insert(ticket, &params, page.clone());
        }

        let mut state = lock(&self.inner.state);
        let latest = self.inner.generation.load(Ordering::SeqCst);
        if generation != latest || state.params.cache_key() != key {
            tracing::debug!(generation, latest, "Discarding stale entry page");
            return Ok(());
        }

        match result {
            Ok(page) => {
                state.page = page;
                state.load_state = LoadState::Loaded;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, page = params.page, "Failed to load entry page");
                state.load_state = LoadState::Error(err.to_string());
                Err(err)
            }
        }
    }
}
