//! Image optimization: bounded downscale plus fixed-quality JPEG
//! re-encode.
//!
//! Pure with respect to input pixels: the same input always yields the
//! same size-bounded output, and the raw image is never mutated.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};

use afval_core::{AppError, OptimizedPhoto};

/// Downscales into a maximum bounding box (aspect ratio preserved,
/// never upscales) and re-encodes as JPEG at a fixed quality factor.
#[derive(Debug, Clone, Copy)]
pub struct PhotoOptimizer {
    max_width: u32,
    max_height: u32,
    jpeg_quality: u8,
}

impl PhotoOptimizer {
    pub fn new(max_width: u32, max_height: u32, jpeg_quality: u8) -> Self {
        Self {
            max_width,
            max_height,
            jpeg_quality,
        }
    }

    /// Optimize a raw image. Decode failures (corrupt input) surface as
    /// [`AppError::ImageProcessingFailed`]; the input is left untouched.
    pub fn optimize(&self, raw: &[u8]) -> Result<OptimizedPhoto, AppError> {
        let img = ImageReader::new(Cursor::new(raw))
            .with_guessed_format()
            .map_err(|e| AppError::ImageProcessingFailed(format!("format detection: {}", e)))?
            .decode()
            .map_err(|e| AppError::ImageProcessingFailed(format!("decode: {}", e)))?;

        let (width, height) = img.dimensions();
        let resized = if width > self.max_width || height > self.max_height {
            img.resize(self.max_width, self.max_height, FilterType::Triangle)
        } else {
            // Already within bounds; re-encode only, never upscale
            img
        };

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
        let (out_width, out_height) = rgb.dimensions();

        let mut buffer = Vec::with_capacity((out_width * out_height * 3) as usize / 4);
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), self.jpeg_quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| AppError::ImageProcessingFailed(format!("encode: {}", e)))?;

        Ok(OptimizedPhoto {
            data: Bytes::from(buffer),
            width: out_width,
            height: out_height,
        })
    }

    /// Async wrapper: decode and encode are CPU-bound, so run off the
    /// async pool.
    pub async fn optimize_blocking(&self, raw: Bytes) -> Result<OptimizedPhoto, AppError> {
        let optimizer = *self;
        tokio::task::spawn_blocking(move || optimizer.optimize(&raw))
            .await
            .map_err(|e| AppError::Internal(format!("optimization task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([40, 120, 80]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_downscale_preserves_aspect_ratio() {
        let optimizer = PhotoOptimizer::new(800, 600, 80);
        let raw = encode_png(1600, 1200);

        let out = optimizer.optimize(&raw).unwrap();
        assert_eq!((out.width, out.height), (800, 600));
        assert!(!out.data.is_empty());
    }

    #[test]
    fn test_wide_image_bounded_by_width() {
        let optimizer = PhotoOptimizer::new(800, 600, 80);
        let raw = encode_png(3200, 800);

        let out = optimizer.optimize(&raw).unwrap();
        assert_eq!(out.width, 800);
        assert_eq!(out.height, 200);
    }

    #[test]
    fn test_never_upscales() {
        let optimizer = PhotoOptimizer::new(800, 600, 80);
        let raw = encode_png(100, 80);

        let out = optimizer.optimize(&raw).unwrap();
        assert_eq!((out.width, out.height), (100, 80));
    }

    #[test]
    fn test_idempotent_within_bounds() {
        // Re-optimizing an already-optimized image must not shrink it
        let optimizer = PhotoOptimizer::new(800, 600, 80);
        let raw = encode_png(1600, 1200);

        let first = optimizer.optimize(&raw).unwrap();
        let second = optimizer.optimize(&first.data).unwrap();
        assert_eq!((second.width, second.height), (first.width, first.height));
    }

    #[test]
    fn test_input_untouched() {
        let optimizer = PhotoOptimizer::new(800, 600, 80);
        let raw = encode_png(1600, 1200);
        let before = raw.clone();

        optimizer.optimize(&raw).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn test_corrupt_input_reported() {
        let optimizer = PhotoOptimizer::new(800, 600, 80);
        let result = optimizer.optimize(b"definitely not an image");
        assert!(matches!(result, Err(AppError::ImageProcessingFailed(_))));
    }

    #[tokio::test]
    async fn test_optimize_blocking() {
        let optimizer = PhotoOptimizer::new(800, 600, 80);
        let raw = Bytes::from(encode_png(1600, 1200));

        let out = optimizer.optimize_blocking(raw).await.unwrap();
        assert_eq!((out.width, out.height), (800, 600));
    }
}
