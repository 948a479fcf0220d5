//! Afval Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration
//! and validation primitives shared by all components of the litter
//! reporting procedure.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, ProcedureConfig};
pub use error::AppError;
pub use models::{
    AddressCandidate, ClassifiedLabel, ContactChoice, ContactDetails, Coordinate, DraftStatus,
    LocationInfo, OptimizedPhoto, PhotoAttachment, ReportDraft, ServiceArea, Step,
    StructuredAddress, SubmissionReceipt, WasteType,
};
pub use validation::is_valid_email;
