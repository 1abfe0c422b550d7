use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;
use crate::scheduler::TriggerOutcome;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct RefreshAccepted {
    status: TriggerOutcome,
}

/// Starts a sweep and returns without waiting for it.
pub(super) async fn trigger_refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> (StatusCode, Json<ApiResponse<RefreshAccepted>>) {
    let status = state.refresh.fire();
    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(RefreshAccepted { status }, req_id)),
    )
}
