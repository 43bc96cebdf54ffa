//! Sync bus diagnostics.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::response::DataResponse;
use crate::state::AppState;

/// GET /admin/sync/stats
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(DataResponse {
        data: state.sync_bus.stats(),
    })
}

/// GET /admin/sync/history
///
/// The most recent sync events, oldest first.
pub async fn history(State(state): State<AppState>) -> impl IntoResponse {
    Json(DataResponse {
        data: state.sync_bus.history(),
    })
}
