mod clubs;
mod refresh;
mod teetimes;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use teetime_core::ClubDirectory;
use teetime_scraper::{BreakerStatus, CircuitBreaker, CircuitState};
use teetime_store::CacheStore;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{request_id, RequestId};
use crate::scheduler::TriggerOutcome;

/// Fire-and-forget handle onto the refresh scheduler.
#[derive(Clone)]
pub struct RefreshTrigger(Arc<dyn Fn() -> TriggerOutcome + Send + Sync>);

impl RefreshTrigger {
    pub fn new(fire: impl Fn() -> TriggerOutcome + Send + Sync + 'static) -> Self {
        Self(Arc::new(fire))
    }

    fn fire(&self) -> TriggerOutcome {
        (self.0)()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: CacheStore,
    pub clubs: Arc<ClubDirectory>,
    pub refresh: RefreshTrigger,
    pub source_b_breaker: Arc<CircuitBreaker>,
    pub max_query_days: u32,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: RequestId) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id.0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    /// `None` when the cache lock could not be taken in time.
    cached_dates: Option<usize>,
    source_b_circuit: BreakerStatus,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/clubs", get(clubs::list_clubs))
        .route("/api/v1/teetimes/query", post(teetimes::query_teetimes))
        .route("/api/v1/refresh", post(refresh::trigger_refresh))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let cached_dates = match state.store.cached_dates().await {
        Ok(dates) => Some(dates.len()),
        Err(e) => {
            tracing::warn!(error = %e, "health check: cache busy");
            None
        }
    };
    let circuit = state.source_b_breaker.status();
    let status = if cached_dates.is_some() && circuit.state == CircuitState::Closed {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::new(
        HealthData {
            status,
            cached_dates,
            source_b_circuit: circuit,
        },
        req_id,
    ))
}
