//! Entry review routes.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::entries;
use crate::state::AppState;

/// Form-scoped routes, registered as `/forms`.
///
/// ```text
/// GET    /{form_id}/entries          list_entries
/// GET    /{form_id}/entries/counts   status_counts
/// GET    /{form_id}/entries/export   export_entries
/// GET    /{form_id}/fields           list_fields
/// ```
pub fn forms_router() -> Router<AppState> {
    Router::new()
        .route("/{form_id}/entries", get(entries::list_entries))
        .route("/{form_id}/entries/counts", get(entries::status_counts))
        .route("/{form_id}/entries/export", get(entries::export_entries))
        .route("/{form_id}/fields", get(entries::list_fields))
}

/// Entry actions, registered as `/entries`.
///
/// ```text
/// PATCH  /{id}/status                update_status
/// POST   /{id}/notes                 add_note
/// DELETE /{id}                       delete_entry
/// ```
pub fn entries_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/status", patch(entries::update_status))
        .route("/{id}/notes", post(entries::add_note))
        .route("/{id}", delete(entries::delete_entry))
}
