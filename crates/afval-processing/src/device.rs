//! Device capture traits.
//!
//! The platform camera is exposed as a promise-style async primitive;
//! implementations wrap the actual device API. The pipeline only ever
//! talks to these traits.

use async_trait::async_trait;
use bytes::Bytes;

use afval_core::AppError;

/// A still frame taken from a live stream or picked from storage.
#[derive(Debug, Clone)]
pub struct RawPhoto {
    pub data: Bytes,
    pub content_type: String,
}

impl RawPhoto {
    pub fn new(data: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }
}

/// Live camera stream handle. Frames are captured from it; `release`
/// stops the stream and frees the device, and must be idempotent.
#[async_trait]
pub trait CameraStream: Send {
    /// Take a still frame from the live stream.
    async fn capture_frame(&mut self) -> Result<RawPhoto, AppError>;

    /// Stop the stream and release device resources. Safe to call more
    /// than once.
    async fn release(&mut self);
}

/// Camera acquisition primitive.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Request a live camera stream. Fails with
    /// [`AppError::CameraUnavailable`] on permission denial or device
    /// absence; callers fall back to file selection.
    async fn acquire(&self) -> Result<Box<dyn CameraStream>, AppError>;
}

/// File selection primitive, the fallback when no camera is available.
/// `None` means the reporter dismissed the picker.
#[async_trait]
pub trait PhotoPicker: Send + Sync {
    async fn pick(&self) -> Result<Option<RawPhoto>, AppError>;
}
