//! Image upload contract.
//!
//! Uploaded images are checked against an [`UploadPolicy`], then re-encoded
//! as WebP in four variants (see [`PRESETS`]) by an [`ImageResizer`]. The
//! variants are written under `images/{category}/` of the public directory
//! and returned as site-relative paths that settings records can point at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UploadError;
use crate::schema::Dimensions;

/// MIME types accepted for upload.
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Category used when the upload names none.
pub const DEFAULT_CATEGORY: &str = "general";

/// Limits applied before any decoding happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Check a declared MIME type and payload size.
    ///
    /// # Errors
    ///
    /// - [`UploadError::Empty`] for a zero-length payload.
    /// - [`UploadError::UnsupportedType`] for a MIME type outside [`ALLOWED_MIME_TYPES`].
    /// - [`UploadError::TooLarge`] above `max_bytes`.
    pub fn check(&self, mime: &str, size: usize) -> Result<(), UploadError> {
        if size == 0 {
            return Err(UploadError::Empty);
        }
        if !ALLOWED_MIME_TYPES.contains(&mime) {
            return Err(UploadError::UnsupportedType { mime: mime.to_owned() });
        }
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Which variant of an upload a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTag {
    Original,
    Mobile,
    Tablet,
    Desktop,
}

impl SizeTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

/// Resize target of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePreset {
    pub tag: SizeTag,
    /// Width ceiling in pixels; `None` keeps the source size.
    pub max_width: Option<u32>,
    /// Lossy WebP quality, 0–100.
    pub quality: u8,
}

/// The variants produced for every upload, in output order.
pub const PRESETS: [ResizePreset; 4] = [
    ResizePreset {
        tag: SizeTag::Original,
        max_width: None,
        quality: 85,
    },
    ResizePreset {
        tag: SizeTag::Mobile,
        max_width: Some(768),
        quality: 80,
    },
    ResizePreset {
        tag: SizeTag::Tablet,
        max_width: Some(1024),
        quality: 82,
    },
    ResizePreset {
        tag: SizeTag::Desktop,
        max_width: Some(1920),
        quality: 85,
    },
];

/// Output size for a source image under a width ceiling. Never enlarges and
/// keeps the aspect ratio; height rounds to the nearest pixel, minimum 1.
#[must_use]
pub fn target_dimensions(source: Dimensions, max_width: Option<u32>) -> Dimensions {
    match max_width {
        Some(max) if source.width > max && source.width > 0 => {
            let height = (u64::from(source.height) * u64::from(max) + u64::from(source.width) / 2)
                / u64::from(source.width);
            Dimensions::new(max, u32::try_from(height).unwrap_or(u32::MAX).max(1))
        }
        _ => source,
    }
}

/// Sanitize an uploaded file name into a stem: characters outside
/// `[A-Za-z0-9.-]` become `_`, then the last extension is dropped.
#[must_use]
pub fn sanitize_file_stem(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    match cleaned.rfind('.') {
        Some(dot) if dot > 0 => cleaned[..dot].to_owned(),
        _ => cleaned,
    }
}

/// Sanitize a category into a single path segment of `[a-z0-9_-]`.
/// Blank input yields [`DEFAULT_CATEGORY`].
#[must_use]
pub fn sanitize_category(category: Option<&str>) -> String {
    let cleaned: String = category
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        DEFAULT_CATEGORY.to_owned()
    } else {
        cleaned
    }
}

/// File name of one variant: `{stem}_{timestamp_ms}[_{tag}].webp`.
#[must_use]
pub fn variant_file_name(stem: &str, received_at: DateTime<Utc>, tag: SizeTag) -> String {
    let timestamp = received_at.timestamp_millis();
    match tag {
        SizeTag::Original => format!("{stem}_{timestamp}.webp"),
        tag => format!("{stem}_{timestamp}_{}.webp", tag.as_str()),
    }
}

/// Site-relative URL of a stored variant.
#[must_use]
pub fn variant_path(category: &str, file_name: &str) -> String {
    format!("/images/{category}/{file_name}")
}

/// One stored variant, as returned to the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    pub size: SizeTag,
    pub path: String,
    pub width: u32,
    pub height: u32,
}

/// The `original` variant, which dialogs put into settings.
#[must_use]
pub fn original_variant(variants: &[ImageVariant]) -> Option<&ImageVariant> {
    variants.iter().find(|v| v.size == SizeTag::Original)
}

/// A validated upload ready for resizing.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub category: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check `bytes` and `mime` against `policy` and sanitize the category.
    ///
    /// # Errors
    ///
    /// See [`UploadPolicy::check`].
    pub fn new(
        policy: &UploadPolicy,
        file_name: &str,
        mime: &str,
        category: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        policy.check(mime, bytes.len())?;
        Ok(Self {
            file_name: file_name.to_owned(),
            mime: mime.to_owned(),
            category: sanitize_category(category),
            bytes,
        })
    }
}

/// Produces and stores the WebP variants of an upload.
#[async_trait::async_trait]
pub trait ImageResizer: Send + Sync {
    /// Decode, resize and store every preset. Returns variants in
    /// [`PRESETS`] order.
    ///
    /// # Errors
    ///
    /// [`UploadError::Decode`] if the bytes are not an image,
    /// [`UploadError::Store`] if encoding or writing a variant fails.
    async fn store_variants(
        &self,
        upload: ImageUpload,
        received_at: DateTime<Utc>,
    ) -> Result<Vec<ImageVariant>, UploadError>;
}
