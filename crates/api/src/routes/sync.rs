use axum::routing::get;
use axum::Router;

use crate::handlers::sync;
use crate::state::AppState;

/// Sync bus diagnostics, registered as `/admin/sync`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(sync::stats))
        .route("/history", get(sync::history))
}
