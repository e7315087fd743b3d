use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::{error::ApiResult, main_lib::AppState};
use encargos_core::cdi::RateSample;

/// Diagnostic passthrough: the most recent CDI samples as the ERP reports
/// them.
async fn latest_rates(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<RateSample>>> {
    let samples = state.rate_source.latest_rates().await?;
    Ok(Json(samples))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/cdi", get(latest_rates))
}
