use std::sync::Arc;

use vitrine_db::PgEntrySource;
use vitrine_events::{ListenerError, ListenerSpec, SyncBus, SyncEvent};
use vitrine_table::PageCache;

use crate::config::ServerConfig;

/// Listener id of the page cache invalidator.
pub const PAGE_CACHE_LISTENER: &str = "api-page-cache";

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: vitrine_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Entry query service.
    pub entries: Arc<PgEntrySource>,
    /// Entry change notifications. Mutating handlers emit here.
    pub sync_bus: Arc<SyncBus>,
    /// Cached list responses, invalidated per form by the sync bus.
    pub page_cache: Arc<PageCache>,
}

impl AppState {
    /// Build the state and register the cache invalidator on a fresh bus.
    pub fn new(pool: vitrine_db::DbPool, config: ServerConfig) -> Self {
        let page_cache = Arc::new(PageCache::new(
            config.page_cache_max_age(),
            config.page_cache_max_entries,
        ));
        let sync_bus = Arc::new(SyncBus::new());

        let cache = Arc::clone(&page_cache);
        sync_bus
            .add_listener(
                ListenerSpec::new(PAGE_CACHE_LISTENER, move |event: SyncEvent| {
                    cache.invalidate_form(event.form_id);
                    async { Ok::<(), ListenerError>(()) }
                })
                .with_priority(100),
            )
            .detach();

        Self {
            entries: Arc::new(PgEntrySource::new(pool.clone())),
            pool,
            config: Arc::new(config),
            sync_bus,
            page_cache,
        }
    }
}
