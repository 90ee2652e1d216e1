//! System routes: `/v1/sys/*`

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Build the `/v1/sys` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// Response body for `GET /v1/sys/health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ready: bool,
    pub admin_mode: bool,
    pub notifier: &'static str,
}

/// 200 once the settings store is hydrated, 503 before.
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ready = state.store.is_ready();
    let body = HealthResponse {
        ready,
        admin_mode: state.admin_gate.is_enabled(),
        notifier: state.notifier.name(),
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
