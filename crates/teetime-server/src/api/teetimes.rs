use axum::{extract::State, Extension, Json};
use teetime_core::ConsolidatedRecord;
use teetime_store::TeeTimeQuery;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

/// Rejects inverted ranges and ranges longer than `max_days`.
fn validate_range(query: &TeeTimeQuery, max_days: u32) -> Result<(), String> {
    if query.start_date > query.end_date {
        return Err(format!(
            "start_date {} is after end_date {}",
            query.start_date, query.end_date
        ));
    }
    if query.day_count() > i64::from(max_days) {
        return Err(format!("date range may cover at most {max_days} days"));
    }
    Ok(())
}

pub(super) async fn query_teetimes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(query): Json<TeeTimeQuery>,
) -> Result<Json<ApiResponse<Vec<ConsolidatedRecord>>>, ApiError> {
    if let Err(message) = validate_range(&query, state.max_query_days) {
        return Err(ApiError::new(req_id.0, "validation_error", message));
    }

    let records = teetime_store::query(&state.store, &query).await;
    Ok(Json(ApiResponse::new(records, req_id)))
}
