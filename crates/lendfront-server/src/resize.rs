//! On-disk image variants.
//!
//! [`DiskResizer`] decodes an upload, produces every [`PRESETS`] variant as
//! lossy WebP at the preset's quality and writes them under
//! `{public_dir}/images/{category}/`. Decoding and encoding are CPU-bound and
//! run on the blocking pool.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use image::imageops::FilterType;
use image::GenericImageView;
use tracing::info;

use lendfront_core::error::UploadError;
use lendfront_core::schema::Dimensions;
use lendfront_core::upload::{
    sanitize_file_stem, target_dimensions, variant_file_name, variant_path, ImageResizer, ImageUpload,
    ImageVariant, ResizePreset, PRESETS,
};

/// One encoded variant waiting to be written.
struct Encoded {
    preset: ResizePreset,
    dimensions: Dimensions,
    bytes: Vec<u8>,
}

/// Writes upload variants below a public directory.
#[derive(Debug, Clone)]
pub struct DiskResizer {
    public_dir: PathBuf,
}

impl DiskResizer {
    #[must_use]
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }
}

/// Lossy WebP of `source` at the preset's quality.
fn encode_webp(source: &image::DynamicImage, preset: &ResizePreset) -> Result<Vec<u8>, UploadError> {
    let rgba = source.to_rgba8();
    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(false, f32::from(preset.quality))
        .map_err(|e| UploadError::Store {
            variant: preset.tag.as_str().to_owned(),
            reason: format!("webp encoding failed: {e:?}"),
        })?;
    Ok(encoded.to_vec())
}

/// Decode `bytes` and encode every preset.
fn encode_variants(bytes: &[u8]) -> Result<Vec<Encoded>, UploadError> {
    let source = image::load_from_memory(bytes).map_err(|e| UploadError::Decode {
        reason: e.to_string(),
    })?;
    let (width, height) = source.dimensions();
    let source_dims = Dimensions::new(width, height);

    PRESETS
        .iter()
        .map(|preset| {
            let dimensions = target_dimensions(source_dims, preset.max_width);
            let resized = if dimensions == source_dims {
                source.clone()
            } else {
                source.resize_exact(dimensions.width, dimensions.height, FilterType::Lanczos3)
            };
            let bytes = encode_webp(&resized, preset)?;
            Ok(Encoded {
                preset: *preset,
                dimensions,
                bytes,
            })
        })
        .collect()
}

#[async_trait::async_trait]
impl ImageResizer for DiskResizer {
    async fn store_variants(
        &self,
        upload: ImageUpload,
        received_at: DateTime<Utc>,
    ) -> Result<Vec<ImageVariant>, UploadError> {
        let ImageUpload {
            file_name,
            category,
            bytes,
            ..
        } = upload;

        let encoded = tokio::task::spawn_blocking(move || encode_variants(&bytes))
            .await
            .map_err(|e| UploadError::Store {
                variant: "all".to_owned(),
                reason: format!("encoder task failed: {e}"),
            })??;

        let dir = self.public_dir.join("images").join(&category);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| UploadError::Store {
                variant: "all".to_owned(),
                reason: format!("failed to create {}: {e}", dir.display()),
            })?;

        let stem = sanitize_file_stem(&file_name);
        let mut variants = Vec::with_capacity(encoded.len());
        for item in encoded {
            let name = variant_file_name(&stem, received_at, item.preset.tag);
            tokio::fs::write(dir.join(&name), &item.bytes)
                .await
                .map_err(|e| UploadError::Store {
                    variant: item.preset.tag.as_str().to_owned(),
                    reason: e.to_string(),
                })?;
            variants.push(ImageVariant {
                size: item.preset.tag,
                path: variant_path(&category, &name),
                width: item.dimensions.width,
                height: item.dimensions.height,
            });
        }

        info!(
            category = %category,
            file = %file_name,
            variants = variants.len(),
            "stored upload variants"
        );
        Ok(variants)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::codecs::webp::WebPEncoder;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use lendfront_core::upload::{SizeTag, UploadPolicy};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([20, 60, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn writes_all_variants() {
        let dir = tempfile::tempdir().unwrap();
        let resizer = DiskResizer::new(dir.path());
        let upload = ImageUpload::new(
            &UploadPolicy::default(),
            "wide banner.png",
            "image/png",
            Some("hero"),
            png(1200, 300),
        )
        .unwrap();
        let at = Utc::now();

        let variants = resizer.store_variants(upload, at).await.unwrap();
        let tags: Vec<SizeTag> = variants.iter().map(|v| v.size).collect();
        assert_eq!(
            tags,
            vec![SizeTag::Original, SizeTag::Mobile, SizeTag::Tablet, SizeTag::Desktop]
        );

        assert_eq!((variants[0].width, variants[0].height), (1200, 300));
        assert_eq!((variants[1].width, variants[1].height), (768, 192));
        assert_eq!((variants[2].width, variants[2].height), (1024, 256));
        // Never enlarged past the source.
        assert_eq!((variants[3].width, variants[3].height), (1200, 300));

        let stamp = at.timestamp_millis();
        assert_eq!(variants[0].path, format!("/images/hero/wide_banner_{stamp}.webp"));
        for variant in &variants {
            let file = dir.path().join(variant.path.trim_start_matches('/'));
            let bytes = std::fs::read(&file).unwrap();
            assert_eq!(&bytes[..4], b"RIFF");
            assert_eq!(&bytes[8..12], b"WEBP");
        }
    }

    /// Smooth gradients with per-pixel grain, closer to a photo than a flat fill.
    fn photo_like(width: u32, height: u32) -> RgbaImage {
        let mut seed: u32 = 0x2545_f491;
        RgbaImage::from_fn(width, height, |x, y| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let grain = (seed >> 27) as u8;
            let r = ((x * 255) / width) as u8;
            let g = ((y * 255) / height) as u8;
            Rgba([r.saturating_add(grain), g.saturating_add(grain), 120u8.saturating_add(grain), 255])
        })
    }

    #[tokio::test]
    async fn variants_are_lossy_and_smaller_than_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let resizer = DiskResizer::new(dir.path());
        let source = photo_like(1200, 800);
        let mut png = Cursor::new(Vec::new());
        source.write_to(&mut png, ImageFormat::Png).unwrap();
        let upload = ImageUpload::new(
            &UploadPolicy::default(),
            "photo.png",
            "image/png",
            Some("loan"),
            png.into_inner(),
        )
        .unwrap();

        let variants = resizer.store_variants(upload, Utc::now()).await.unwrap();
        let mobile = variants.iter().find(|v| v.size == SizeTag::Mobile).unwrap();
        assert_eq!((mobile.width, mobile.height), (768, 512));
        let stored = std::fs::read(dir.path().join(mobile.path.trim_start_matches('/'))).unwrap();
        // Lossless WebP starts with a "VP8L" chunk.
        assert_ne!(&stored[12..16], b"VP8L");

        let resized = DynamicImage::ImageRgba8(source).resize_exact(768, 512, FilterType::Lanczos3);
        let mut lossless = Vec::new();
        resized
            .write_with_encoder(WebPEncoder::new_lossless(&mut lossless))
            .unwrap();
        assert!(
            stored.len() < lossless.len(),
            "lossy {} bytes vs lossless {} bytes",
            stored.len(),
            lossless.len()
        );
    }

    #[tokio::test]
    async fn garbage_bytes_fail_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let resizer = DiskResizer::new(dir.path());
        let upload = ImageUpload::new(
            &UploadPolicy::default(),
            "fake.png",
            "image/png",
            None,
            b"not an image".to_vec(),
        )
        .unwrap();

        let err = resizer.store_variants(upload, Utc::now()).await.unwrap_err();
        assert!(matches!(err, UploadError::Decode { .. }));
        assert!(!dir.path().join("images").exists());
    }
}
