//! Location resolution service.
//!
//! Three entry points (device GPS, forward address search, map-chosen
//! point) converge on a single `produce_location_info` that performs the
//! service-area check and composes the display address. Forward search
//! follows a last-request-wins rule: each call takes a monotonically
//! increasing token and a response is discarded when a newer request was
//! issued while it was in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use afval_core::{AddressCandidate, AppError, Config, Coordinate, LocationInfo, ServiceArea};

use crate::formatter::compose_address;
use crate::geocoder::{Geocoder, GeolocationDevice};

/// Outcome of a forward address search.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressSearch {
    /// A newer search was issued while this one was in flight; the
    /// result must not be committed.
    Superseded,
    Candidates(Vec<AddressCandidate>),
}

pub struct LocationResolutionService {
    geocoder: Arc<dyn Geocoder>,
    geolocation: Arc<dyn GeolocationDevice>,
    service_area: ServiceArea,
    geolocation_timeout: Duration,
    search_limit: usize,
    min_query_len: usize,
    search_token: AtomicU64,
}

impl LocationResolutionService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        geolocation: Arc<dyn GeolocationDevice>,
        config: &Config,
    ) -> Self {
        Self {
            geocoder,
            geolocation,
            service_area: config.service_area.clone(),
            geolocation_timeout: Duration::from_secs(config.geolocation_timeout_secs),
            search_limit: config.geocoding_search_limit,
            min_query_len: config.geocoding_min_query_len,
            search_token: AtomicU64::new(0),
        }
    }

    /// Resolve the device's current position to a validated location.
    /// Bounded by the geolocation timeout; denial and timeout both
    /// surface as [`AppError::PositionUnavailable`].
    pub async fn resolve_current_position(&self) -> Result<LocationInfo, AppError> {
        let position = tokio::time::timeout(
            self.geolocation_timeout,
            self.geolocation.current_position(),
        )
        .await
        .map_err(|_| AppError::PositionUnavailable("geolocation timed out".to_string()))??;

        self.produce_location_info(position).await
    }

    /// Forward-geocode a free-text query. Returns
    /// [`AddressSearch::Superseded`] when a newer search was issued
    /// while this one was in flight.
    pub async fn search_address(&self, query: &str) -> Result<AddressSearch, AppError> {
        let query = query.trim();
        if query.len() < self.min_query_len {
            return Err(AppError::Validation(format!(
                "search query must be at least {} characters",
                self.min_query_len
            )));
        }

        let token = self.search_token.fetch_add(1, Ordering::SeqCst) + 1;
        let candidates = self.geocoder.search(query, self.search_limit).await?;

        // Last-issued request wins, regardless of response arrival order
        if self.search_token.load(Ordering::SeqCst) != token {
            tracing::debug!(query = %query, "Discarding stale search response");
            return Ok(AddressSearch::Superseded);
        }
        Ok(AddressSearch::Candidates(candidates))
    }

    /// Resolve a search candidate the reporter picked.
    pub async fn resolve_candidate(
        &self,
        candidate: &AddressCandidate,
    ) -> Result<LocationInfo, AppError> {
        self.produce_location_info(Coordinate::new(candidate.latitude, candidate.longitude))
            .await
    }

    /// Resolve a point chosen on the map surface.
    pub async fn select_from_map(&self, coordinate: Coordinate) -> Result<LocationInfo, AppError> {
        self.produce_location_info(coordinate).await
    }

    /// Single convergence point: service-area check, reverse geocode,
    /// deterministic address composition. Rejected coordinates produce
    /// no `LocationInfo` at all.
    async fn produce_location_info(
        &self,
        coordinate: Coordinate,
    ) -> Result<LocationInfo, AppError> {
        if !self
            .service_area
            .contains(coordinate.latitude, coordinate.longitude)
        {
            tracing::info!(
                latitude = coordinate.latitude,
                longitude = coordinate.longitude,
                "Coordinate outside service area"
            );
            return Err(AppError::OutOfServiceArea {
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
            });
        }

        let structured = self.geocoder.reverse(coordinate).await?;
        let address = compose_address(&structured);
        if address.is_empty() {
            return Err(AppError::Geocoding(
                "no address found for coordinate".to_string(),
            ));
        }

        let optional = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        Ok(LocationInfo {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            address,
            district: optional(&structured.district),
            neighbourhood: optional(&structured.neighbourhood),
            municipality: optional(&structured.municipality),
        })
    }
}
