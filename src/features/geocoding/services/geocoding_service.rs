use async_trait::async_trait;
use serde::Deserialize;

use crate::core::config::GeocodingConfig;
use crate::core::error::{AppError, Result};
use crate::features::board::geo::LatLon;
use crate::features::geocoding::services::Geocoder;

/// Nominatim search result
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
}

impl NominatimPlace {
    /// The place as a point, when Nominatim returned parseable coordinates
    pub fn point(&self) -> Option<LatLon> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lng = self.lon.trim().parse::<f64>().ok()?;
        LatLon::checked(lat, lng)
    }
}

/// Nominatim reverse lookup result; `error` is set when nothing was found
#[derive(Debug, Deserialize)]
pub struct NominatimReverse {
    pub display_name: Option<String>,
    pub error: Option<String>,
}

/// Geocoding client for the public Nominatim API
pub struct GeocodingService {
    client: reqwest::Client,
    base_url: String,
    country: String,
}

impl GeocodingService {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            country: config.country.clone(),
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?format=json&limit=1&q={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    /// Free-form search for a postal code, e.g. "388001, India"
    pub async fn search_postal_code(&self, postal_code: &str) -> Result<Option<NominatimPlace>> {
        let query = format!("{}, {}", postal_code, self.country);
        let url = self.search_url(&query);
        tracing::debug!("Geocoding postal code: {} -> {}", postal_code, url);
        self.execute_search(&url).await
    }

    /// Free-form search for a street address within a postal code
    pub async fn search_address(
        &self,
        address: &str,
        postal_code: &str,
    ) -> Result<Option<NominatimPlace>> {
        let query = format!("{}, {}, {}", address, postal_code, self.country);
        let url = self.search_url(&query);
        tracing::debug!("Geocoding address: {} -> {}", query, url);
        self.execute_search(&url).await
    }

    /// Human readable address for a point
    pub async fn reverse_lookup(&self, point: LatLon) -> Result<Option<String>> {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}",
            self.base_url, point.lat, point.lng
        );
        tracing::debug!("Reverse geocoding: {:?} -> {}", point, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Nominatim reverse request failed: {:?}", e);
            AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return Ok(None);
        }

        let result: NominatimReverse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim reverse response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })?;

        if let Some(error) = result.error {
            tracing::debug!("Nominatim reverse lookup found nothing: {}", error);
            return Ok(None);
        }
        Ok(result.display_name)
    }

    /// Execute a search request and return the first result
    async fn execute_search(&self, url: &str) -> Result<Option<NominatimPlace>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Nominatim request failed: {:?}", e);
            AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return Ok(None);
        }

        let results: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })?;

        Ok(results.into_iter().next())
    }
}

#[async_trait]
impl Geocoder for GeocodingService {
    async fn locate_postal_code(&self, postal_code: &str) -> Result<Option<LatLon>> {
        Ok(self
            .search_postal_code(postal_code)
            .await?
            .and_then(|place| place.point()))
    }

    async fn locate_address(&self, address: &str, postal_code: &str) -> Result<Option<LatLon>> {
        Ok(self
            .search_address(address, postal_code)
            .await?
            .and_then(|place| place.point()))
    }

    async fn reverse(&self, point: LatLon) -> Result<Option<String>> {
        self.reverse_lookup(point).await
    }
}
