use axum::{extract::State, Extension, Json};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

/// Every club display name, sorted. Served straight from the directory.
pub(super) async fn list_clubs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::new(state.clubs.display_names(), req_id))
}
