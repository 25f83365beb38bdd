//! Coordinates and great-circle distances.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LatLon {
    pub lat: f64,
    pub lng: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// A point only when both components are finite and inside geographic range
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }

    pub fn distance_km(&self, other: &LatLon) -> f64 {
        haversine_km(*self, *other)
    }
}

/// Haversine distance between two points in kilometres
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// One coordinate component as supplied by a client or the data store.
///
/// Older records and hand-written clients send coordinates as strings, so
/// both shapes deserialize; parsing happens only when the value is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            CoordinateValue::Number(n) => *n,
            CoordinateValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for CoordinateValue {
    fn from(value: f64) -> Self {
        CoordinateValue::Number(value)
    }
}

/// Possibly missing or malformed latitude/longitude of an issue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawCoordinates {
    pub latitude: Option<CoordinateValue>,
    pub longitude: Option<CoordinateValue>,
}

impl RawCoordinates {
    pub fn from_columns(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            latitude: latitude.map(CoordinateValue::Number),
            longitude: longitude.map(CoordinateValue::Number),
        }
    }

    /// The plottable point, or `None` when either component is missing,
    /// non-numeric, non-finite or out of range
    pub fn resolve(&self) -> Option<LatLon> {
        let lat = self.latitude.as_ref()?.as_f64()?;
        let lng = self.longitude.as_ref()?.as_f64()?;
        LatLon::checked(lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let p = LatLon::new(22.3072, 73.1812);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_small_latitude_offset() {
        // 0.045 degrees of latitude is about 5 km
        let a = LatLon::new(22.3072, 73.1812);
        let b = LatLon::new(22.3072 + 0.045, 73.1812);
        let d = haversine_km(a, b);
        assert!((d - 5.0).abs() / 5.0 < 0.01, "distance was {}", d);
    }

    #[test]
    fn test_haversine_around_anand() {
        let anand = LatLon::new(22.5645, 72.9289);
        assert_eq!(haversine_km(anand, anand), 0.0);

        let north = LatLon::new(22.5645 + 0.045, 72.9289);
        let d = haversine_km(anand, north);
        assert!((d - 5.0).abs() / 5.0 < 0.01, "distance was {}", d);
        assert!((d - north.distance_km(&anand)).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_known_cities() {
        // Mumbai to Pune, roughly 120 km great-circle
        let mumbai = LatLon::new(19.0760, 72.8777);
        let pune = LatLon::new(18.5204, 73.8567);
        let d = mumbai.distance_km(&pune);
        assert!(d > 115.0 && d < 125.0, "distance was {}", d);
    }

    #[test]
    fn test_coordinate_value_parsing() {
        assert_eq!(CoordinateValue::Number(22.5).as_f64(), Some(22.5));
        assert_eq!(CoordinateValue::Text(" 22.5 ".into()).as_f64(), Some(22.5));
        assert_eq!(CoordinateValue::Text("abc".into()).as_f64(), None);
        assert_eq!(CoordinateValue::Text("NaN".into()).as_f64(), None);
        assert_eq!(CoordinateValue::Number(f64::INFINITY).as_f64(), None);
    }

    #[test]
    fn test_raw_coordinates_resolve() {
        let ok = RawCoordinates::from_columns(Some(22.3), Some(73.1));
        assert_eq!(ok.resolve(), Some(LatLon::new(22.3, 73.1)));

        let missing = RawCoordinates::from_columns(Some(22.3), None);
        assert_eq!(missing.resolve(), None);

        let text = RawCoordinates {
            latitude: Some(CoordinateValue::Text("abc".into())),
            longitude: Some(CoordinateValue::Number(73.1)),
        };
        assert_eq!(text.resolve(), None);

        let out_of_range = RawCoordinates::from_columns(Some(91.0), Some(73.1));
        assert_eq!(out_of_range.resolve(), None);
    }

    #[test]
    fn test_raw_coordinates_deserialize_mixed_shapes() {
        let raw: RawCoordinates =
            serde_json::from_str(r#"{"latitude": "22.31", "longitude": 73.18}"#).unwrap();
        assert_eq!(raw.resolve(), Some(LatLon::new(22.31, 73.18)));

        let raw: RawCoordinates = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(raw.resolve(), None);
    }
}
