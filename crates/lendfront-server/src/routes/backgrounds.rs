//! Section background routes: `/v1/backgrounds/*`
//!
//! A section's background settings plus the list of images previously
//! uploaded for it, which the background dialog offers as choices.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use lendfront_core::schema::{BackgroundSettings, Section};

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/v1/backgrounds` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{section}", get(read_section))
        .route("/{section}/custom", post(add_custom).delete(remove_custom))
}

// ── Request / Response types ─────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub section: Section,
    pub settings: BackgroundSettings,
    pub custom: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomListResponse {
    pub section: Section,
    pub custom: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomPath {
    pub path: String,
}

fn parse_section(name: &str) -> Result<Section, AppError> {
    name.parse().map_err(AppError::NotFound)
}

fn check_path(path: &str) -> Result<&str, AppError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(AppError::BadRequest("path must not be empty".to_owned()));
    }
    Ok(path)
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn read_section(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<SectionResponse>, AppError> {
    let section = parse_section(&name)?;
    let settings = state.store.background(section).current().ok_or(AppError::NotReady)?;
    let custom = state
        .store
        .custom_backgrounds(section)
        .current()
        .ok_or(AppError::NotReady)?;
    Ok(Json(SectionResponse {
        section,
        settings,
        custom,
    }))
}

/// Record an image path as a custom background of the section.
async fn add_custom(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(body): Json<CustomPath>,
) -> Result<Json<CustomListResponse>, AppError> {
    let section = parse_section(&name)?;
    let path = check_path(&body.path)?;
    let custom = state.store.add_custom_background(section, path).await?;
    Ok(Json(CustomListResponse { section, custom }))
}

/// Forget a custom background. `?path=` names the image.
async fn remove_custom(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<CustomPath>,
) -> Result<Json<CustomListResponse>, AppError> {
    let section = parse_section(&name)?;
    let path = check_path(&query.path)?;
    let custom = state.store.remove_custom_background(section, path).await?;
    Ok(Json(CustomListResponse { section, custom }))
}
