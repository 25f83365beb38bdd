//! Postal-code and address geocoding through Nominatim.
//!
//! Lookups degrade instead of failing: the configured default centre stands
//! in for unresolved locations and a coordinate label for unknown addresses.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/geocode/postal-codes/{code}` | Centre of a postal code |
//! | GET | `/api/geocode/search` | Locate an address |
//! | GET | `/api/geocode/reverse` | Address of a coordinate |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::{GeocodingService, LocationResolver};
