//! Nominatim geocoding client.
//!
//! Implements the [`Geocoder`] trait against a Nominatim-compatible
//! HTTP API with bounded request timeouts.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use afval_core::{AddressCandidate, AppError, Coordinate, StructuredAddress};

use crate::geocoder::Geocoder;

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    #[serde(default)]
    road: Option<String>,
    #[serde(default)]
    house_number: Option<String>,
    #[serde(default)]
    postcode: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    municipality: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    neighbourhood: Option<String>,
    #[serde(default)]
    quarter: Option<String>,
    #[serde(default)]
    suburb: Option<String>,
}

impl NominatimAddress {
    fn into_structured(self) -> StructuredAddress {
        let first = |fields: &[Option<&str>]| -> String {
            fields
                .iter()
                .filter_map(|f| *f)
                .find(|s| !s.trim().is_empty())
                .unwrap_or("")
                .to_string()
        };

        StructuredAddress {
            road: self.road.clone().unwrap_or_default(),
            house_number: self.house_number.clone().unwrap_or_default(),
            postcode: self.postcode.clone().unwrap_or_default(),
            locality: first(&[
                self.city.as_deref(),
                self.town.as_deref(),
                self.village.as_deref(),
            ]),
            region: self.state.clone().unwrap_or_default(),
            district: first(&[self.quarter.as_deref(), self.suburb.as_deref()]),
            neighbourhood: self.neighbourhood.clone().unwrap_or_default(),
            municipality: first(&[self.municipality.as_deref(), self.city.as_deref()]),
        }
    }
}

/// Geocoder backed by a Nominatim-compatible endpoint.
pub struct NominatimGeocoder {
    http_client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for geocoding")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .http_client
            .get(url)
            .header("User-Agent", "afval-alert")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    AppError::TransientNetwork(format!("geocoding request: {}", e))
                } else {
                    AppError::Geocoding(format!("geocoding request: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::from_http_status(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Geocoding(format!("geocoding response parse: {}", e)))
    }
}

fn parse_coordinate(lat: &str, lon: &str) -> Result<(f64, f64), AppError> {
    let latitude: f64 = lat
        .parse()
        .map_err(|_| AppError::Geocoding(format!("invalid latitude: {}", lat)))?;
    let longitude: f64 = lon
        .parse()
        .map_err(|_| AppError::Geocoding(format!("invalid longitude: {}", lon)))?;
    Ok((latitude, longitude))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<AddressCandidate>, AppError> {
        let url = format!(
            "{}/search?format=json&q={}&addressdetails=1&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );

        let places: Vec<NominatimPlace> = self.get_json(&url).await?;
        tracing::debug!(query = %query, results = places.len(), "Forward geocode");

        let mut candidates = Vec::with_capacity(places.len());
        for place in places {
            let (latitude, longitude) = parse_coordinate(&place.lat, &place.lon)?;
            candidates.push(AddressCandidate {
                address: place.display_name.unwrap_or_default(),
                latitude,
                longitude,
            });
        }
        Ok(candidates)
    }

    async fn reverse(&self, coordinate: Coordinate) -> Result<StructuredAddress, AppError> {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}&zoom=18&addressdetails=1",
            self.base_url, coordinate.latitude, coordinate.longitude
        );

        let place: NominatimPlace = self.get_json(&url).await?;
        tracing::debug!(
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            "Reverse geocode"
        );

        Ok(place
            .address
            .map(NominatimAddress::into_structured)
            .unwrap_or_default())
    }
}
