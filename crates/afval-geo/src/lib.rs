//! Location resolution for the reporting procedure.
//!
//! Resolves a geographic point plus human-readable address through
//! device GPS, forward address search or a map-chosen coordinate, and
//! validates every result against the configured service area.

pub mod formatter;
pub mod geocoder;
pub mod nominatim;
pub mod resolver;

pub use formatter::compose_address;
pub use geocoder::{Geocoder, GeolocationDevice};
pub use nominatim::NominatimGeocoder;
pub use resolver::{AddressSearch, LocationResolutionService};
