//! Photo capture pipeline: camera or file selection, validation, then
//! optimization.
//!
//! Device and permission errors are reported, never retried
//! automatically; the reporter retries explicitly or falls back to file
//! selection. Failures leave any previously captured photo untouched.

use std::sync::Arc;

use bytes::Bytes;

use afval_core::{AppError, Config, PhotoAttachment};

use crate::device::{CameraDevice, CameraStream, PhotoPicker, RawPhoto};
use crate::optimizer::PhotoOptimizer;
use crate::validator::PhotoValidator;

pub struct PhotoCapturePipeline {
    camera: Arc<dyn CameraDevice>,
    validator: PhotoValidator,
    optimizer: PhotoOptimizer,
    stream: Option<Box<dyn CameraStream>>,
}

impl PhotoCapturePipeline {
    pub fn new(camera: Arc<dyn CameraDevice>, config: &Config) -> Self {
        Self {
            camera,
            validator: PhotoValidator::new(config.max_photo_size_bytes),
            optimizer: PhotoOptimizer::new(
                config.photo_max_width,
                config.photo_max_height,
                config.photo_jpeg_quality,
            ),
            stream: None,
        }
    }

    /// Request a live camera stream. On [`AppError::CameraUnavailable`]
    /// the caller falls back to file selection; this is not fatal to the
    /// procedure.
    pub async fn start_capture(&mut self) -> Result<(), AppError> {
        self.cancel().await;
        match self.camera.acquire().await {
            Ok(stream) => {
                tracing::debug!("Camera stream acquired");
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Camera acquisition failed");
                Err(e)
            }
        }
    }

    pub fn has_active_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Take a still frame from the live stream and optimize it. The
    /// stream stays active so the reporter can retake.
    pub async fn capture(&mut self) -> Result<PhotoAttachment, AppError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| AppError::CameraUnavailable("no active stream".to_string()))?;

        let frame = stream.capture_frame().await?;
        self.finish(frame).await
    }

    /// Accept a user-chosen file: MIME and size checks, then
    /// optimization.
    pub async fn select_from_file(
        &self,
        data: Bytes,
        content_type: &str,
    ) -> Result<PhotoAttachment, AppError> {
        self.validator.validate_all(content_type, data.len())?;
        self.finish(RawPhoto::new(data, content_type)).await
    }

    /// Run a platform file picker and process the chosen file. `None`
    /// when the reporter dismissed the picker.
    pub async fn select_with_picker(
        &self,
        picker: &dyn PhotoPicker,
    ) -> Result<Option<PhotoAttachment>, AppError> {
        match picker.pick().await? {
            Some(raw) => {
                self.validator.validate_all(&raw.content_type, raw.data.len())?;
                Ok(Some(self.finish(raw).await?))
            }
            None => Ok(None),
        }
    }

    async fn finish(&self, raw: RawPhoto) -> Result<PhotoAttachment, AppError> {
        let optimized = self.optimizer.optimize_blocking(raw.data.clone()).await?;
        tracing::debug!(
            raw_bytes = raw.data.len(),
            optimized_bytes = optimized.size_bytes(),
            width = optimized.width,
            height = optimized.height,
            "Photo optimized"
        );

        let mut attachment = PhotoAttachment::new(raw.data, raw.content_type);
        attachment.optimized = Some(optimized);
        Ok(attachment)
    }

    /// Stop any live stream and release device resources. Always safe to
    /// call; idempotent.
    pub async fn cancel(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release().await;
            tracing::debug!("Camera stream released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_jpeg(width: u32, height: u32) -> Bytes {
        let img = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        Bytes::from(buffer)
    }

    struct FakeStream {
        frame: Bytes,
        releases: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CameraStream for FakeStream {
        async fn capture_frame(&mut self) -> Result<RawPhoto, AppError> {
            Ok(RawPhoto::new(self.frame.clone(), "image/jpeg"))
        }

        async fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeCamera {
        available: bool,
        releases: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CameraDevice for FakeCamera {
        async fn acquire(&self) -> Result<Box<dyn CameraStream>, AppError> {
            if !self.available {
                return Err(AppError::CameraUnavailable("permission denied".into()));
            }
            Ok(Box::new(FakeStream {
                frame: test_jpeg(1280, 720),
                releases: self.releases.clone(),
            }))
        }
    }

    fn pipeline(available: bool, releases: Arc<AtomicUsize>) -> PhotoCapturePipeline {
        let camera = Arc::new(FakeCamera {
            available,
            releases,
        });
        PhotoCapturePipeline::new(camera, &Config::default())
    }

    #[tokio::test]
    async fn test_capture_produces_optimized_attachment() {
        let mut p = pipeline(true, Arc::new(AtomicUsize::new(0)));
        p.start_capture().await.unwrap();

        let attachment = p.capture().await.unwrap();
        let optimized = attachment.optimized.unwrap();
        assert!(optimized.width <= 800 && optimized.height <= 600);
        assert!(!attachment.raw.is_empty());
    }

    #[tokio::test]
    async fn test_camera_denied_is_reported_not_fatal() {
        let mut p = pipeline(false, Arc::new(AtomicUsize::new(0)));
        let err = p.start_capture().await.unwrap_err();
        assert!(matches!(err, AppError::CameraUnavailable(_)));

        // File selection still works as the fallback path
        let attachment = p
            .select_from_file(test_jpeg(1600, 1200), "image/jpeg")
            .await
            .unwrap();
        assert!(attachment.optimized.is_some());
    }

    #[tokio::test]
    async fn test_select_from_file_rejects_bad_input() {
        let p = pipeline(true, Arc::new(AtomicUsize::new(0)));

        let err = p
            .select_from_file(Bytes::from_static(b"x"), "video/mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));

        let too_big = Bytes::from(vec![0u8; 10 * 1024 * 1024 + 1]);
        let err = p.select_from_file(too_big, "image/jpeg").await.unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_file_reported_as_processing_failure() {
        let p = pipeline(true, Arc::new(AtomicUsize::new(0)));
        let err = p
            .select_from_file(Bytes::from_static(b"not an image"), "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ImageProcessingFailed(_)));
    }

    #[tokio::test]
    async fn test_picker_dismissal_yields_nothing() {
        struct DismissedPicker;

        #[async_trait]
        impl PhotoPicker for DismissedPicker {
            async fn pick(&self) -> Result<Option<RawPhoto>, AppError> {
                Ok(None)
            }
        }

        let p = pipeline(true, Arc::new(AtomicUsize::new(0)));
        let picked = p.select_with_picker(&DismissedPicker).await.unwrap();
        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn test_picker_result_is_validated_and_optimized() {
        struct JpegPicker;

        #[async_trait]
        impl PhotoPicker for JpegPicker {
            async fn pick(&self) -> Result<Option<RawPhoto>, AppError> {
                Ok(Some(RawPhoto::new(test_jpeg(1600, 1200), "image/jpeg")))
            }
        }

        let p = pipeline(true, Arc::new(AtomicUsize::new(0)));
        let attachment = p.select_with_picker(&JpegPicker).await.unwrap().unwrap();
        let optimized = attachment.optimized.unwrap();
        assert_eq!((optimized.width, optimized.height), (800, 600));
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut p = pipeline(true, releases.clone());
        p.start_capture().await.unwrap();
        assert!(p.has_active_stream());

        p.cancel().await;
        p.cancel().await;
        assert!(!p.has_active_stream());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
}
