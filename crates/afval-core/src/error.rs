//! Error types module
//!
//! All failure paths in the reporting procedure are modeled as values of
//! `AppError`. Pipelines never panic on domain failures; the procedure
//! state machine consumes these and decides whether to block navigation,
//! offer retry, or fall back to manual input.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Step-gating failure. Local, never a system failure; blocks
    /// `advance()` and is shown inline at the current step.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Camera stream could not be acquired (permission denied or no
    /// device). Recoverable via file selection.
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Device permission denied for a non-camera capability.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Geolocation fix could not be obtained (denied or timed out).
    /// Recoverable via address search or map selection.
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Image processing failed: {0}")]
    ImageProcessingFailed(String),

    /// Business-rule rejection: the coordinate falls outside the
    /// configured service area. Not a bug.
    #[error("Location ({latitude}, {longitude}) is outside the service area")]
    OutOfServiceArea { latitude: f64, longitude: f64 },

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    /// Network-level failure or 5xx response. Retryable with backoff.
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    /// 4xx rejection from the backend. Never retried; surfaced verbatim.
    #[error("Server rejected request ({status}): {message}")]
    TerminalServer { status: u16, message: String },

    #[error("Draft has expired and can no longer be submitted")]
    DraftExpired,

    #[error("Draft is not ready for submission: {0}")]
    DraftIncomplete(String),

    #[error("No network connection")]
    Offline,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the submission orchestrator may retry after this error.
    /// Terminal errors end the attempt permanently.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::TransientNetwork(_) | AppError::Offline
        )
    }

    /// Classify an HTTP status code from the submission or geocoding
    /// backend: 5xx is retryable, everything else in the error range is
    /// terminal.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 {
            AppError::TransientNetwork(format!("HTTP {}: {}", status, message))
        } else {
            AppError::TerminalServer { status, message }
        }
    }

    /// Error type name for logging and client-facing error codes.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation",
            AppError::CameraUnavailable(_) => "CameraUnavailable",
            AppError::PermissionDenied(_) => "PermissionDenied",
            AppError::PositionUnavailable(_) => "PositionUnavailable",
            AppError::FileTooLarge { .. } => "FileTooLarge",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::ImageProcessingFailed(_) => "ImageProcessingFailed",
            AppError::OutOfServiceArea { .. } => "OutOfServiceArea",
            AppError::Geocoding(_) => "Geocoding",
            AppError::TransientNetwork(_) => "TransientNetwork",
            AppError::TerminalServer { .. } => "TerminalServer",
            AppError::DraftExpired => "DraftExpired",
            AppError::DraftIncomplete(_) => "DraftIncomplete",
            AppError::Offline => "Offline",
            AppError::Cancelled => "Cancelled",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
