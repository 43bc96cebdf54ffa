pub mod entries;
pub mod health;
pub mod pricing;
pub mod sync;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /forms/{form_id}/entries                        paginated list
/// /forms/{form_id}/entries/counts                 status counts
/// /forms/{form_id}/entries/export                 CSV export
/// /forms/{form_id}/fields                         field definitions
///
/// /entries/{id}/status                            change status (PATCH)
/// /entries/{id}/notes                             add note (POST)
/// /entries/{id}                                   delete (DELETE)
///
/// /pricing/simulate                               price simulation (POST)
///
/// /admin/sync/stats                               sync bus diagnostics
/// /admin/sync/history                             recent sync events
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/forms", entries::forms_router())
        .nest("/entries", entries::entries_router())
        .nest("/pricing", pricing::router())
        .nest("/admin/sync", sync::router())
}
