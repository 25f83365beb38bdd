use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::board::geo::LatLon;
use crate::features::board::map_sync::{CenterSource, MapCenter};

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddressSearchQuery {
    #[validate(regex(
        path = "*crate::shared::validation::POSTAL_CODE_REGEX",
        message = "Postal code must be exactly 6 digits"
    ))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReverseGeocodeQuery {
    pub lat: f64,
    pub lon: f64,
}

/// Resolved map centre; `source` is `fallback` when geocoding failed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeocodeCenterDto {
    pub postal_code: String,
    pub center: LatLon,
    pub source: CenterSource,
}

impl GeocodeCenterDto {
    pub fn new(postal_code: impl Into<String>, center: MapCenter) -> Self {
        Self {
            postal_code: postal_code.into(),
            center: center.point,
            source: center.source,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReverseGeocodeDto {
    pub lat: f64,
    pub lon: f64,
    pub address: String,
}
