//! Data models for the reporting procedure
//!
//! Each sub-module covers one domain area: the in-progress draft, the
//! step sequence, location data and the waste classification result.

mod draft;
mod location;
mod step;
mod waste;

// Re-export all models for convenient imports
pub use draft::*;
pub use location::*;
pub use step::*;
pub use waste::*;
