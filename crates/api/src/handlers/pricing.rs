//! Handler for the price simulation endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use vitrine_core::pricing::{format_currency, simulate_value, Commission, PriceMode, PriceSimulation};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SimulatePriceRequest {
    /// A stored product value: a price object, a bare amount, or a string.
    pub value: serde_json::Value,
    /// Percentage in `0..=1000`. Defaults to no commission.
    pub commission: Option<f64>,
    #[serde(default)]
    pub mode: PriceMode,
}

/// Simulation plus the strings a listing renders.
#[derive(Debug, Serialize)]
pub struct SimulatePriceResponse {
    #[serde(flatten)]
    pub simulation: PriceSimulation,
    pub displayed_price_text: String,
    pub comparison_price_text: Option<String>,
}

/// POST /pricing/simulate
///
/// Returns `{"data": null}` when the value carries no usable price.
pub async fn simulate(
    State(_state): State<AppState>,
    Json(input): Json<SimulatePriceRequest>,
) -> AppResult<impl IntoResponse> {
    let commission = match input.commission {
        Some(percent) => Commission::new(percent)?,
        None => Commission::ZERO,
    };

    let data = simulate_value(&input.value, commission, input.mode).map(|simulation| {
        SimulatePriceResponse {
            displayed_price_text: format_currency(simulation.displayed_price()),
            comparison_price_text: simulation.comparison_price.map(format_currency),
            simulation,
        }
    });

    Ok(Json(DataResponse { data }))
}
