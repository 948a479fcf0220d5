//! Photo capture and optimization pipeline.
//!
//! Acquires a camera stream or a user-chosen file, validates it,
//! downscales and re-encodes it, and hands the result to the waste
//! classifier. Device primitives sit behind async traits so the
//! pipeline logic stays sequential.

pub mod classify;
pub mod device;
pub mod optimizer;
pub mod pipeline;
pub mod validator;

pub use classify::{ClassificationOutcome, Classifier};
pub use device::{CameraDevice, CameraStream, PhotoPicker, RawPhoto};
pub use optimizer::PhotoOptimizer;
pub use pipeline::PhotoCapturePipeline;
pub use validator::PhotoValidator;
