mod geocode_dto;

pub use geocode_dto::{AddressSearchQuery, GeocodeCenterDto, ReverseGeocodeDto, ReverseGeocodeQuery};
