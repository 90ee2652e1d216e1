//! Settings group routes: `/v1/settings/*`
//!
//! Groups are addressed by name (`hero-background`, `loan-cards`, ...). Reads
//! and writes go through the settings store, so a write replaces the whole
//! group, persists it and notifies subscribers. Writes are not gated on admin
//! mode: admin mode only decides whether the site shows its editing controls.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use lendfront_core::group::GroupId;
use lendfront_core::schema::DeviceClass;
use lendfront_core::style::{StyleBlock, Surface};

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/v1/settings` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_groups))
        .route("/{group}", get(read_group).put(replace_group).delete(reset_group))
        .route("/{group}/default", get(read_default))
        .route("/{group}/preview", get(preview_group))
}

// ── Request / Response types ─────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEntry {
    pub name: &'static str,
    pub storage_key: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GroupListResponse {
    pub ready: bool,
    pub groups: Vec<GroupEntry>,
}

/// Query of `GET /v1/settings/{group}/preview`. `device` wins over `width`;
/// with neither the desktop styles are rendered.
#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub device: Option<String>,
    pub width: Option<u32>,
    pub surface: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub group: &'static str,
    pub device: DeviceClass,
    pub surface: Surface,
    pub blocks: Vec<StyleBlock>,
    pub css: String,
}

fn parse_group(name: &str) -> Result<GroupId, AppError> {
    name.parse().map_err(AppError::NotFound)
}

// ── Handlers ─────────────────────────────────────────────────────────

/// List every group name.
async fn list_groups(State(state): State<Arc<AppState>>) -> Json<GroupListResponse> {
    let groups = GroupId::ALL
        .into_iter()
        .map(|id| GroupEntry {
            name: id.name(),
            storage_key: id.storage_key(),
        })
        .collect();
    Json(GroupListResponse {
        ready: state.store.is_ready(),
        groups,
    })
}

/// Current value of a group.
async fn read_group(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_group(&name)?;
    Ok(Json(state.store.snapshot_json(id)?))
}

/// Hard-coded default of a group.
async fn read_default(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_group(&name)?;
    Ok(Json(state.store.default_json(id)?))
}

/// Replace a group with the request body. The body must be a complete value
/// of the group's shape.
async fn replace_group(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let id = parse_group(&name)?;
    let stored = state.store.replace_json(id, body).await?;
    tracing::info!(group = %id, "settings group replaced");
    Ok(Json(stored))
}

/// Reset a group to its default.
async fn reset_group(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_group(&name)?;
    let default = state.store.default_json(id)?;
    let stored = state.store.replace_json(id, default).await?;
    tracing::info!(group = %id, "settings group reset to default");
    Ok(Json(stored))
}

/// Styles derived from the current value.
async fn preview_group(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<PreviewResponse>, AppError> {
    let id = parse_group(&name)?;
    if !state.store.is_ready() {
        return Err(AppError::NotReady);
    }

    let device = match (query.device.as_deref(), query.width) {
        (Some(device), _) => device.parse().map_err(AppError::BadRequest)?,
        (None, Some(width)) => DeviceClass::from_viewport_width(width),
        (None, None) => DeviceClass::Desktop,
    };
    let surface = match query.surface.as_deref() {
        Some(surface) => surface.parse().map_err(AppError::BadRequest)?,
        None => Surface::Page,
    };

    let blocks = state.store.preview(id, device, surface);
    let css = blocks
        .iter()
        .map(StyleBlock::to_css)
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Json(PreviewResponse {
        group: id.name(),
        device,
        surface,
        blocks,
        css,
    }))
}
