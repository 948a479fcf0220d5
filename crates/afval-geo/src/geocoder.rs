//! Geocoding and geolocation collaborator traits.

use async_trait::async_trait;

use afval_core::{AddressCandidate, AppError, Coordinate, StructuredAddress};

/// Geocoding collaborator: free-text forward search and coordinate
/// reverse lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Forward-geocode a query into an ordered candidate list.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<AddressCandidate>, AppError>;

    /// Reverse-geocode a coordinate into structured address fields.
    async fn reverse(&self, coordinate: Coordinate) -> Result<StructuredAddress, AppError>;
}

/// Device geolocation primitive. Implementations wrap the platform
/// position API including its permission prompt.
#[async_trait]
pub trait GeolocationDevice: Send + Sync {
    /// Obtain the current position. Fails with
    /// [`AppError::PositionUnavailable`] on permission denial; the
    /// resolution service adds the timeout bound.
    async fn current_position(&self) -> Result<Coordinate, AppError>;
}
