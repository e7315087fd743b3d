use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};
use encargos_core::calculations::{CalculationInput, CalculationRecord, CalculationResult};
use encargos_core::errors::{DatabaseError, Error};

async fn run_calculation(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CalculationInput>,
) -> ApiResult<Json<CalculationResult>> {
    let result = state.calculation_service.calculate(input).await?;
    Ok(Json(result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    limit: Option<i64>,
    process_id: Option<String>,
}

async fn list_calculations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<CalculationRecord>>> {
    let records = state
        .calculation_service
        .list_calculations(params.limit.unwrap_or(100), params.process_id.as_deref())?;
    Ok(Json(records))
}

async fn get_calculation(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CalculationRecord>> {
    let record = state
        .calculation_service
        .get_calculation(&id)?
        .ok_or_else(|| {
            Error::Database(DatabaseError::NotFound(format!(
                "no calculation for '{}'",
                id
            )))
        })?;
    Ok(Json(record))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SubmitBody {
    emission_date: Option<NaiveDate>,
}

async fn submit_calculation(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<SubmitBody>>,
) -> ApiResult<Json<CalculationRecord>> {
    let emission_date = body
        .and_then(|Json(b)| b.emission_date)
        .unwrap_or_else(|| Utc::now().date_naive());
    let record = state
        .calculation_service
        .submit_charges(&id, emission_date)
        .await?;
    Ok(Json(record))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/calculations",
            get(list_calculations).post(run_calculation),
        )
        .route("/calculations/{id}", get(get_calculation))
        .route("/calculations/{id}/submit", post(submit_calculation))
}
