use serde::{Deserialize, Serialize};

/// A point in double-precision degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A resolved, validated location: coordinate plus human-readable
/// address. Produced only by the location resolution service and
/// immutable once produced; a new resolution yields a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbourhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
}

impl LocationInfo {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Structured fields returned by a reverse geocode. Field names follow
/// the geocoder response; empty strings mean the field was absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredAddress {
    #[serde(default)]
    pub road: String,
    #[serde(default)]
    pub house_number: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub neighbourhood: String,
    #[serde(default)]
    pub municipality: String,
}

/// One candidate from a forward address search, in geocoder ranking
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressCandidate {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// The geographic area within which reports are accepted.
///
/// A bounding box covers the common municipal case; a polygon supports
/// irregular boundaries. The polygon test is a standard ray cast over
/// `(latitude, longitude)` vertex pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ServiceArea {
    BoundingBox {
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    },
    Polygon { vertices: Vec<(f64, f64)> },
}

impl ServiceArea {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        match self {
            ServiceArea::BoundingBox {
                min_latitude,
                max_latitude,
                min_longitude,
                max_longitude,
            } => {
                latitude >= *min_latitude
                    && latitude <= *max_latitude
                    && longitude >= *min_longitude
                    && longitude <= *max_longitude
            }
            ServiceArea::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return false;
                }
                let mut inside = false;
                let mut j = vertices.len() - 1;
                for i in 0..vertices.len() {
                    let (lat_i, lon_i) = vertices[i];
                    let (lat_j, lon_j) = vertices[j];
                    if ((lon_i > longitude) != (lon_j > longitude))
                        && (latitude
                            < (lat_j - lat_i) * (longitude - lon_i) / (lon_j - lon_i) + lat_i)
                    {
                        inside = !inside;
                    }
                    j = i;
                }
                inside
            }
        }
    }
}
