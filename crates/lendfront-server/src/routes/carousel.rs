//! Carousel routes: `/v1/carousel/*`

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use lendfront_core::schema::CarouselImage;
use lendfront_core::upload::UploadPolicy;

use crate::error::AppError;
use crate::routes::uploads::{body_limit, UploadForm};
use crate::state::AppState;

/// Category the carousel's uploads are stored under.
const CAROUSEL_CATEGORY: &str = "carousel";

/// Build the `/v1/carousel` router.
pub fn router(policy: &UploadPolicy) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_slides).post(upload_slides))
        .route("/{id}", delete(remove_slide))
        .layer(body_limit(policy))
}

#[derive(Debug, Serialize)]
pub struct SlidesResponse {
    pub slides: Vec<CarouselImage>,
}

#[derive(Debug, Serialize)]
pub struct AddedResponse {
    pub added: Vec<CarouselImage>,
    pub slides: Vec<CarouselImage>,
}

async fn list_slides(State(state): State<Arc<AppState>>) -> Result<Json<SlidesResponse>, AppError> {
    let slides = state.store.carousel().current().ok_or(AppError::NotReady)?;
    Ok(Json(SlidesResponse { slides }))
}

/// Upload one or more images and append them as slides.
async fn upload_slides(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AddedResponse>, AppError> {
    if !state.store.is_ready() {
        return Err(AppError::NotReady);
    }
    let mut form = UploadForm::read(&mut multipart).await?;
    form.category = Some(CAROUSEL_CATEGORY.to_owned());
    let uploads = form.into_uploads(&state.upload_policy)?;

    let received_at = Utc::now();
    let mut variants = Vec::new();
    // Offset each file by a millisecond so equal file names get distinct variants.
    for (offset, upload) in (0_i64..).zip(uploads) {
        let at = received_at + chrono::Duration::milliseconds(offset);
        variants.extend(state.resizer.store_variants(upload, at).await?);
    }

    let added = state.store.add_carousel_images(&variants, received_at).await?;
    let slides = state.store.carousel().current().ok_or(AppError::NotReady)?;
    Ok(Json(AddedResponse { added, slides }))
}

async fn remove_slide(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SlidesResponse>, AppError> {
    let slides = state.store.remove_carousel_image(&id).await?;
    Ok(Json(SlidesResponse { slides }))
}
