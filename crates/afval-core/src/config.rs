//! Configuration module
//!
//! Environment-driven configuration for the reporting procedure:
//! photo limits, geocoding endpoints and timeouts, submission retry
//! policy, the draft lifetime and the service area.

use std::env;

use anyhow::Context;

use crate::models::ServiceArea;

// Defaults
const MAX_PHOTO_SIZE_MB: usize = 10;
const PHOTO_MAX_WIDTH: u32 = 800;
const PHOTO_MAX_HEIGHT: u32 = 600;
const PHOTO_JPEG_QUALITY: u8 = 80;
const CLASSIFICATION_MIN_CONFIDENCE: f32 = 0.5;
const GEOCODING_TIMEOUT_SECS: u64 = 5;
const GEOCODING_SEARCH_LIMIT: usize = 5;
const GEOCODING_MIN_QUERY_LEN: usize = 3;
const GEOLOCATION_TIMEOUT_SECS: u64 = 10;
const SUBMISSION_TIMEOUT_SECS: u64 = 30;
const SUBMISSION_MAX_RETRIES: u32 = 3;
const SUBMISSION_BACKOFF_BASE_MS: u64 = 500;
const SUBMISSION_BACKOFF_CAP_SECS: u64 = 30;
const DRAFT_LIFETIME_MINUTES: i64 = 30;

// Service area default: the municipality of Groningen.
const DEFAULT_SERVICE_AREA: (f64, f64, f64, f64) = (53.13, 53.31, 6.41, 6.75);

/// Full procedure configuration.
#[derive(Clone, Debug)]
pub struct ProcedureConfig {
    // Photo pipeline
    pub max_photo_size_bytes: usize,
    pub photo_max_width: u32,
    pub photo_max_height: u32,
    pub photo_jpeg_quality: u8,
    pub classification_min_confidence: f32,
    // Location resolution
    pub geocoding_base_url: String,
    pub geocoding_timeout_secs: u64,
    pub geocoding_search_limit: usize,
    pub geocoding_min_query_len: usize,
    pub geolocation_timeout_secs: u64,
    pub service_area: ServiceArea,
    // Submission
    pub submission_base_url: String,
    pub submission_timeout_secs: u64,
    pub submission_max_retries: u32,
    pub submission_backoff_base_ms: u64,
    pub submission_backoff_cap_secs: u64,
    // Draft lifecycle
    pub draft_lifetime_minutes: i64,
}

impl Default for ProcedureConfig {
    fn default() -> Self {
        let (min_latitude, max_latitude, min_longitude, max_longitude) = DEFAULT_SERVICE_AREA;
        Self {
            max_photo_size_bytes: MAX_PHOTO_SIZE_MB * 1024 * 1024,
            photo_max_width: PHOTO_MAX_WIDTH,
            photo_max_height: PHOTO_MAX_HEIGHT,
            photo_jpeg_quality: PHOTO_JPEG_QUALITY,
            classification_min_confidence: CLASSIFICATION_MIN_CONFIDENCE,
            geocoding_base_url: "https://nominatim.openstreetmap.org".to_string(),
            geocoding_timeout_secs: GEOCODING_TIMEOUT_SECS,
            geocoding_search_limit: GEOCODING_SEARCH_LIMIT,
            geocoding_min_query_len: GEOCODING_MIN_QUERY_LEN,
            geolocation_timeout_secs: GEOLOCATION_TIMEOUT_SECS,
            service_area: ServiceArea::BoundingBox {
                min_latitude,
                max_latitude,
                min_longitude,
                max_longitude,
            },
            submission_base_url: "http://localhost:8080/api".to_string(),
            submission_timeout_secs: SUBMISSION_TIMEOUT_SECS,
            submission_max_retries: SUBMISSION_MAX_RETRIES,
            submission_backoff_base_ms: SUBMISSION_BACKOFF_BASE_MS,
            submission_backoff_cap_secs: SUBMISSION_BACKOFF_CAP_SECS,
            draft_lifetime_minutes: DRAFT_LIFETIME_MINUTES,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config(pub Box<ProcedureConfig>);

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // Load .env if present; ignore absence
        let _ = dotenvy::dotenv();

        let mut cfg = ProcedureConfig::default();

        if let Ok(v) = env::var("MAX_PHOTO_SIZE_MB") {
            cfg.max_photo_size_bytes = v
                .parse::<usize>()
                .context("MAX_PHOTO_SIZE_MB must be a number")?
                * 1024
                * 1024;
        }
        if let Ok(v) = env::var("PHOTO_MAX_WIDTH") {
            cfg.photo_max_width = v.parse().context("PHOTO_MAX_WIDTH must be a number")?;
        }
        if let Ok(v) = env::var("PHOTO_MAX_HEIGHT") {
            cfg.photo_max_height = v.parse().context("PHOTO_MAX_HEIGHT must be a number")?;
        }
        if let Ok(v) = env::var("PHOTO_JPEG_QUALITY") {
            cfg.photo_jpeg_quality = v.parse().context("PHOTO_JPEG_QUALITY must be 0-100")?;
        }
        if let Ok(v) = env::var("GEOCODING_BASE_URL") {
            cfg.geocoding_base_url = v;
        }
        if let Ok(v) = env::var("GEOCODING_TIMEOUT_SECS") {
            cfg.geocoding_timeout_secs =
                v.parse().context("GEOCODING_TIMEOUT_SECS must be a number")?;
        }
        if let Ok(v) = env::var("GEOLOCATION_TIMEOUT_SECS") {
            cfg.geolocation_timeout_secs = v
                .parse()
                .context("GEOLOCATION_TIMEOUT_SECS must be a number")?;
        }
        if let Ok(v) = env::var("SERVICE_AREA_BBOX") {
            cfg.service_area = parse_bbox(&v)?;
        }
        if let Ok(v) = env::var("SUBMISSION_BASE_URL") {
            cfg.submission_base_url = v;
        }
        if let Ok(v) = env::var("SUBMISSION_TIMEOUT_SECS") {
            cfg.submission_timeout_secs = v
                .parse()
                .context("SUBMISSION_TIMEOUT_SECS must be a number")?;
        }
        if let Ok(v) = env::var("SUBMISSION_MAX_RETRIES") {
            cfg.submission_max_retries =
                v.parse().context("SUBMISSION_MAX_RETRIES must be a number")?;
        }
        if let Ok(v) = env::var("DRAFT_LIFETIME_MINUTES") {
            cfg.draft_lifetime_minutes =
                v.parse().context("DRAFT_LIFETIME_MINUTES must be a number")?;
        }

        let config = Config(Box::new(cfg));
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let cfg = &self.0;
        if cfg.photo_jpeg_quality == 0 || cfg.photo_jpeg_quality > 100 {
            anyhow::bail!("PHOTO_JPEG_QUALITY must be between 1 and 100");
        }
        if cfg.photo_max_width == 0 || cfg.photo_max_height == 0 {
            anyhow::bail!("photo bounding box must be non-zero");
        }
        if cfg.draft_lifetime_minutes <= 0 {
            anyhow::bail!("DRAFT_LIFETIME_MINUTES must be positive");
        }
        Ok(())
    }
}

impl std::ops::Deref for Config {
    type Target = ProcedureConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Parse "min_lat,max_lat,min_lon,max_lon" into a bounding box.
fn parse_bbox(s: &str) -> Result<ServiceArea, anyhow::Error> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .context("SERVICE_AREA_BBOX must be four comma-separated numbers")?;
    if parts.len() != 4 {
        anyhow::bail!("SERVICE_AREA_BBOX must be min_lat,max_lat,min_lon,max_lon");
    }
    if parts[0] >= parts[1] || parts[2] >= parts[3] {
        anyhow::bail!("SERVICE_AREA_BBOX min values must be below max values");
    }
    Ok(ServiceArea::BoundingBox {
        min_latitude: parts[0],
        max_latitude: parts[1],
        min_longitude: parts[2],
        max_longitude: parts[3],
    })
}
