use axum::routing::post;
use axum::Router;

use crate::handlers::pricing;
use crate::state::AppState;

/// Pricing routes, registered as `/pricing`.
pub fn router() -> Router<AppState> {
    Router::new().route("/simulate", post(pricing::simulate))
}
