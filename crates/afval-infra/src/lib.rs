//! Afval Infrastructure Library
//!
//! Shared infrastructure for the reporting procedure:
//! - Telemetry initialization
//! - Retry backoff computation

pub mod backoff;
pub mod telemetry;

// Re-export commonly used types
pub use backoff::{compute_backoff, BackoffPolicy};
pub use telemetry::init_telemetry;
