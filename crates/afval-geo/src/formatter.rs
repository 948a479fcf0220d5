//! Deterministic address composition from structured geocoder fields.
//!
//! Fixed field order: road plus house number, locality, region. Empty
//! fields are omitted entirely rather than emitting blank separators.

use afval_core::StructuredAddress;

/// Compose a display address from structured fields.
pub fn compose_address(address: &StructuredAddress) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(3);

    let street = match (address.road.trim(), address.house_number.trim()) {
        ("", _) => String::new(),
        (road, "") => road.to_string(),
        (road, number) => format!("{} {}", road, number),
    };
    if !street.is_empty() {
        segments.push(street);
    }
    if !address.locality.trim().is_empty() {
        segments.push(address.locality.trim().to_string());
    }
    if !address.region.trim().is_empty() {
        segments.push(address.region.trim().to_string());
    }

    segments.join(", ")
}
