//! HTTP transport for the reporting backend.
//!
//! Two clients: multipart report submission and waste classification.
//! Both map transport failures and 5xx responses to retryable errors
//! and 4xx responses to terminal errors.

pub mod classification;
pub mod submission;

pub use classification::ClassificationClient;
pub use submission::{HttpSubmissionClient, SubmissionRequest, SubmissionTransport};
