mod geocoding_service;
mod location_resolver;

pub use geocoding_service::GeocodingService;
pub use location_resolver::{Geocoder, LocationResolver};
