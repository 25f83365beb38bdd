use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::board::geo::LatLon;
use crate::features::geocoding::dtos::{
    AddressSearchQuery, GeocodeCenterDto, ReverseGeocodeDto, ReverseGeocodeQuery,
};
use crate::features::geocoding::services::LocationResolver;
use crate::shared::types::ApiResponse;
use crate::shared::validation::is_valid_postal_code;

/// Map centre of a postal code
///
/// Never fails on geocoder errors; `source` is `fallback` when the default
/// centre was used.
#[utoipa::path(
    get,
    path = "/api/geocode/postal-codes/{code}",
    tag = "geocoding",
    params(
        ("code" = String, Path, description = "6-digit postal code")
    ),
    responses(
        (status = 200, description = "Centre resolved", body = ApiResponse<GeocodeCenterDto>),
        (status = 400, description = "Invalid postal code")
    )
)]
pub async fn locate_postal_code(
    State(resolver): State<Arc<LocationResolver>>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<GeocodeCenterDto>>> {
    if !is_valid_postal_code(&code) {
        return Err(AppError::Validation(
            "Postal code must be exactly 6 digits".to_string(),
        ));
    }

    let center = resolver.resolve_postal_code(&code).await;
    Ok(Json(ApiResponse::success(
        Some(GeocodeCenterDto::new(code, center)),
        None,
        None,
    )))
}

/// Locate an address within a postal code
#[utoipa::path(
    get,
    path = "/api/geocode/search",
    tag = "geocoding",
    params(AddressSearchQuery),
    responses(
        (status = 200, description = "Location resolved", body = ApiResponse<GeocodeCenterDto>),
        (status = 400, description = "Invalid query")
    )
)]
pub async fn search_address(
    State(resolver): State<Arc<LocationResolver>>,
    Query(query): Query<AddressSearchQuery>,
) -> Result<Json<ApiResponse<GeocodeCenterDto>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let center = resolver
        .resolve_address(query.address.trim(), &query.postal_code)
        .await;
    Ok(Json(ApiResponse::success(
        Some(GeocodeCenterDto::new(query.postal_code, center)),
        None,
        None,
    )))
}

/// Display address of a coordinate
#[utoipa::path(
    get,
    path = "/api/geocode/reverse",
    tag = "geocoding",
    params(ReverseGeocodeQuery),
    responses(
        (status = 200, description = "Address resolved", body = ApiResponse<ReverseGeocodeDto>),
        (status = 400, description = "Coordinate out of range")
    )
)]
pub async fn reverse_geocode(
    State(resolver): State<Arc<LocationResolver>>,
    Query(query): Query<ReverseGeocodeQuery>,
) -> Result<Json<ApiResponse<ReverseGeocodeDto>>> {
    let point = LatLon::checked(query.lat, query.lon)
        .ok_or_else(|| AppError::Validation("Coordinates are out of range".to_string()))?;

    let address = resolver.describe(point).await;
    Ok(Json(ApiResponse::success(
        Some(ReverseGeocodeDto {
            lat: point.lat,
            lon: point.lng,
            address,
        }),
        None,
        None,
    )))
}
