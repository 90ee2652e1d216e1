//! Admin mode routes: `/v1/admin/*`
//!
//! Admin mode only shows or hides the site's editing controls. The footer
//! posts every click of its hidden control to `/click`; the fifth click
//! inside five seconds flips the mode.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/v1/admin` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/mode", get(read_mode).put(set_mode))
        .route("/click", post(click))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

// ── Request / Response types ─────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeResponse {
    pub enabled: bool,
    pub authenticated: bool,
    pub pending_clicks: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickResponse {
    pub enabled: bool,
    /// Whether this click completed the sequence and flipped the mode.
    pub toggled: bool,
    pub pending_clicks: usize,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

async fn mode_response(state: &AppState) -> Result<ModeResponse, AppError> {
    Ok(ModeResponse {
        enabled: state.admin_gate.is_enabled(),
        authenticated: state.admin_login.is_authenticated().await?,
        pending_clicks: state.admin_gate.pending_clicks(Instant::now()).await,
    })
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn read_mode(State(state): State<Arc<AppState>>) -> Result<Json<ModeResponse>, AppError> {
    Ok(Json(mode_response(&state).await?))
}

async fn set_mode(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetModeRequest>,
) -> Result<Json<ModeResponse>, AppError> {
    state.admin_gate.set(body.enabled).await?;
    Ok(Json(mode_response(&state).await?))
}

async fn click(State(state): State<Arc<AppState>>) -> Result<Json<ClickResponse>, AppError> {
    let now = Instant::now();
    let flipped = state.admin_gate.register_click(now).await?;
    Ok(Json(ClickResponse {
        enabled: state.admin_gate.is_enabled(),
        toggled: flipped.is_some(),
        pending_clicks: state.admin_gate.pending_clicks(now).await,
    }))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ModeResponse>, AppError> {
    if !state.admin_login.login(&body.password, &state.admin_gate).await? {
        return Err(AppError::Unauthorized("invalid admin password".to_owned()));
    }
    Ok(Json(mode_response(&state).await?))
}

async fn logout(State(state): State<Arc<AppState>>) -> Result<Json<ModeResponse>, AppError> {
    state.admin_login.logout(&state.admin_gate).await?;
    Ok(Json(mode_response(&state).await?))
}
