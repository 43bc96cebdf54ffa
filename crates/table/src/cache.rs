//! Bounded, age-limited cache of entry pages keyed by query parameters.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use vitrine_core::source::{EntryPage, LoadEntriesParams};
use vitrine_core::types::DbId;

/// Pages older than this are treated as missing.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3 * 60);

/// Entries kept before the oldest is evicted.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

struct CachedPage {
    page: EntryPage,
    form_id: Option<DbId>,
    inserted_at: Instant,
}

/// Invalidation clock read before a load and checked on insert.
///
/// A page loaded under a ticket is only stored if nothing that could
/// include it was invalidated since the ticket was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTicket(u64);

#[derive(Default)]
struct Store {
    pages: HashMap<String, CachedPage>,
    /// Bumped by every invalidation.
    clock: u64,
    cleared_at: u64,
    /// Last invalidation of any form, for unscoped pages.
    any_form_at: u64,
    form_invalidated_at: HashMap<DbId, u64>,
}

impl Store {
    fn invalidated_since(&self, ticket: CacheTicket, form_id: Option<DbId>) -> bool {
        let since = match form_id {
            Some(id) => self.form_invalidated_at.get(&id).copied().unwrap_or(0),
            None => self.any_form_at,
        };
        self.cleared_at.max(since) > ticket.0
    }
}

/// Thread-safe page cache shared by a table or by HTTP handlers.
pub struct PageCache {
    max_age: Duration,
    max_entries: usize,
    store: Mutex<Store>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE, DEFAULT_MAX_ENTRIES)
    }
}

impl PageCache {
    /// A `max_entries` of zero disables caching.
    pub fn new(max_age: Duration, max_entries: usize) -> Self {
        Self {
            max_age,
            max_entries,
            store: Mutex::new(Store::default()),
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached page for these parameters if it is younger than the max
    /// age. Expired pages are dropped on lookup.
    pub fn get(&self, params: &LoadEntriesParams) -> Option<EntryPage> {
        let key = params.cache_key();
        let mut store = self.store();
        let fresh = store.pages.get(&key)?.inserted_at.elapsed() < self.max_age;
        if fresh {
            store.pages.get(&key).map(|cached| cached.page.clone())
        } else {
            store.pages.remove(&key);
            None
        }
    }

    /// Take a ticket before starting a load whose result will be inserted.
    pub fn ticket(&self) -> CacheTicket {
        CacheTicket(self.store().clock)
    }

    /// Store a page loaded under `ticket`, evicting the oldest entries beyond
    /// capacity. Returns `false` without storing when the page's form (or
    /// any form, for an unscoped page) was invalidated after the ticket was
    /// taken.
    pub fn insert(&self, ticket: CacheTicket, params: &LoadEntriesParams, page: EntryPage) -> bool {
        if self.max_entries == 0 {
            return false;
        }
        let mut store = self.store();
        if store.invalidated_since(ticket, params.form_id) {
            tracing::debug!(form_id = ?params.form_id, "Not caching page loaded before invalidation");
            return false;
        }
        store.pages.insert(
            params.cache_key(),
            CachedPage {
                page,
                form_id: params.form_id,
                inserted_at: Instant::now(),
            },
        );
        while store.pages.len() > self.max_entries {
            let oldest = store
                .pages
                .iter()
                .min_by_key(|(_, cached)| cached.inserted_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    store.pages.remove(&key);
                }
                None => break,
            }
        }
        true
    }

    /// Drop every page that may include entries of this form: the form's own
    /// pages and unscoped pages. Loads already in flight for those pages
    /// will not be cached. Returns the number of pages removed.
    pub fn invalidate_form(&self, form_id: DbId) -> usize {
        let mut store = self.store();
        store.clock += 1;
        let now = store.clock;
        store.any_form_at = now;
        store.form_invalidated_at.insert(form_id, now);

        let before = store.pages.len();
        store
            .pages
            .retain(|_, cached| cached.form_id.is_some_and(|id| id != form_id));
        let removed = before - store.pages.len();
        if removed > 0 {
            tracing::debug!(%form_id, removed, "Invalidated cached entry pages");
        }
        removed
    }

    pub fn clear(&self) {
        let mut store = self.store();
        store.clock += 1;
        store.cleared_at = store.clock;
        store.form_invalidated_at.clear();
        store.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.store().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
