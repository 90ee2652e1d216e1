//! Image upload route: `/v1/uploads`
//!
//! Accepts a multipart form with a `file` part and an optional `category`
//! text part. The file is checked against the upload policy before it is
//! decoded, then stored as WebP variants.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use lendfront_core::error::UploadError;
use lendfront_core::upload::{ImageUpload, ImageVariant, UploadPolicy};

use crate::error::AppError;
use crate::state::AppState;

/// Headroom for multipart framing and the text parts above the file ceiling.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the `/v1/uploads` router.
pub fn router(policy: &UploadPolicy) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(upload))
        .layer(body_limit(policy))
}

/// Request body limit for routes that take uploads. Larger files still reach
/// the policy check so they get its error instead of a bare 413.
pub fn body_limit(policy: &UploadPolicy) -> DefaultBodyLimit {
    DefaultBodyLimit::max(policy.max_bytes.saturating_mul(2).saturating_add(FORM_OVERHEAD_BYTES))
}

// ── Request / Response types ─────────────────────────────────────────

/// Response body of a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub files: Vec<ImageVariant>,
    pub message: String,
}

/// One file part of a multipart form.
#[derive(Debug)]
pub struct FilePart {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// File parts (`file` or `files`) and the `category` text part of a form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<FilePart>,
    pub category: Option<String>,
}

impl UploadForm {
    /// Drain a multipart stream. Unknown parts are skipped.
    ///
    /// # Errors
    ///
    /// [`AppError::BadRequest`] if the stream is malformed.
    pub async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            match field.name() {
                Some("file" | "files") => {
                    let file_name = field.file_name().unwrap_or("upload").to_owned();
                    let mime = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_owned();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    form.files.push(FilePart {
                        file_name,
                        mime,
                        bytes: bytes.to_vec(),
                    });
                }
                Some("category") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    form.category = Some(text);
                }
                _ => {}
            }
        }
        Ok(form)
    }

    /// Validate every file part against `policy`.
    ///
    /// # Errors
    ///
    /// [`UploadError::Empty`] without file parts, otherwise the first policy
    /// violation.
    pub fn into_uploads(self, policy: &UploadPolicy) -> Result<Vec<ImageUpload>, UploadError> {
        if self.files.is_empty() {
            return Err(UploadError::Empty);
        }
        let category = self.category;
        self.files
            .into_iter()
            .map(|part| ImageUpload::new(policy, &part.file_name, &part.mime, category.as_deref(), part.bytes))
            .collect()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────

/// Store one uploaded image and return its variants.
async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = UploadForm::read(&mut multipart).await?;
    if form.files.len() > 1 {
        return Err(AppError::BadRequest("upload one file at a time".to_owned()));
    }
    let mut uploads = form.into_uploads(&state.upload_policy)?;
    let Some(upload) = uploads.pop() else {
        return Err(UploadError::Empty.into());
    };

    let files = state.resizer.store_variants(upload, Utc::now()).await?;
    Ok(Json(UploadResponse {
        success: true,
        files,
        message: "이미지가 성공적으로 업로드되었습니다.".to_owned(),
    }))
}
