use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::core::error::Result;
use crate::features::board::geo::LatLon;
use crate::features::board::map_sync::MapCenter;

/// Forward and reverse geocoding backend
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate_postal_code(&self, postal_code: &str) -> Result<Option<LatLon>>;
    async fn locate_address(&self, address: &str, postal_code: &str) -> Result<Option<LatLon>>;
    async fn reverse(&self, point: LatLon) -> Result<Option<String>>;
}

/// Wraps a `Geocoder` so that lookups never fail.
///
/// Errors, empty results and timeouts degrade to the default centre (or a
/// coordinate label for reverse lookups) and are logged as warnings.
/// Resolved postal-code centres are cached for the life of the process.
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    fallback: LatLon,
    timeout: Duration,
    postal_code_cache: RwLock<HashMap<String, LatLon>>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, fallback: LatLon, timeout: Duration) -> Self {
        Self {
            geocoder,
            fallback,
            timeout,
            postal_code_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn fallback(&self) -> LatLon {
        self.fallback
    }

    async fn bounded<T, F>(&self, what: &str, lookup: F) -> Option<T>
    where
        F: Future<Output = Result<Option<T>>>,
    {
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(Some(value))) => Some(value),
            Ok(Ok(None)) => {
                tracing::warn!("Geocoding found no result for {}", what);
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("Geocoding failed for {}: {}", what, e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Geocoding timed out after {:?} for {}",
                    self.timeout,
                    what
                );
                None
            }
        }
    }

    async fn lookup_postal_code(&self, postal_code: &str) -> Option<LatLon> {
        if let Some(point) = self.postal_code_cache.read().await.get(postal_code) {
            return Some(*point);
        }

        let what = format!("postal code {}", postal_code);
        let point = self
            .bounded(&what, self.geocoder.locate_postal_code(postal_code))
            .await?;
        self.postal_code_cache
            .write()
            .await
            .insert(postal_code.to_string(), point);
        Some(point)
    }

    /// Centre of a postal code, or the default centre
    pub async fn resolve_postal_code(&self, postal_code: &str) -> MapCenter {
        match self.lookup_postal_code(postal_code).await {
            Some(point) => MapCenter::resolved(point),
            None => {
                tracing::warn!(
                    "Using default center for postal code {}",
                    postal_code
                );
                MapCenter::fallback(self.fallback)
            }
        }
    }

    /// Location of an address, else its postal code centre, else the default centre
    pub async fn resolve_address(&self, address: &str, postal_code: &str) -> MapCenter {
        let what = format!("address '{}'", address);
        if let Some(point) = self
            .bounded(&what, self.geocoder.locate_address(address, postal_code))
            .await
        {
            return MapCenter::resolved(point);
        }
        self.resolve_postal_code(postal_code).await
    }

    /// Display address for `point`, or a coordinate label
    pub async fn describe(&self, point: LatLon) -> String {
        let what = format!("{:.6}, {:.6}", point.lat, point.lng);
        self.bounded(&what, self.geocoder.reverse(point))
            .await
            .unwrap_or_else(|| format!("Location at {:.6}, {:.6}", point.lat, point.lng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::features::board::map_sync::CenterSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DEFAULT: LatLon = LatLon::new(20.5937, 78.9629);
    const ANAND: LatLon = LatLon::new(22.5645, 72.9289);

    #[derive(Default)]
    struct FakeGeocoder {
        postal_calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn locate_postal_code(&self, postal_code: &str) -> Result<Option<LatLon>> {
            self.postal_calls.fetch_add(1, Ordering::SeqCst);
            match postal_code {
                "388001" => Ok(Some(ANAND)),
                "999999" => Err(AppError::ExternalServiceError("offline".to_string())),
                "111111" => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(Some(ANAND))
                }
                _ => Ok(None),
            }
        }

        async fn locate_address(&self, address: &str, _postal_code: &str) -> Result<Option<LatLon>> {
            if address == "Station Road" {
                Ok(Some(LatLon::new(22.556, 72.951)))
            } else {
                Ok(None)
            }
        }

        async fn reverse(&self, point: LatLon) -> Result<Option<String>> {
            if point == ANAND {
                Ok(Some("Anand, Gujarat, India".to_string()))
            } else {
                Err(AppError::ExternalServiceError("offline".to_string()))
            }
        }
    }

    fn resolver(geocoder: Arc<FakeGeocoder>) -> LocationResolver {
        LocationResolver::new(geocoder, DEFAULT, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_resolved_postal_code() {
        let resolver = resolver(Arc::new(FakeGeocoder::default()));
        let center = resolver.resolve_postal_code("388001").await;
        assert_eq!(center, MapCenter::resolved(ANAND));
    }

    #[tokio::test]
    async fn test_failure_empty_and_timeout_fall_back() {
        let resolver = resolver(Arc::new(FakeGeocoder::default()));
        for code in ["999999", "000000", "111111"] {
            let center = resolver.resolve_postal_code(code).await;
            assert_eq!(center.source, CenterSource::Fallback, "code {}", code);
            assert_eq!(center.point, DEFAULT);
        }
    }

    #[tokio::test]
    async fn test_resolved_postal_codes_are_cached() {
        let geocoder = Arc::new(FakeGeocoder::default());
        let resolver = resolver(Arc::clone(&geocoder));
        resolver.resolve_postal_code("388001").await;
        resolver.resolve_postal_code("388001").await;
        assert_eq!(geocoder.postal_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_address_chain() {
        let resolver = resolver(Arc::new(FakeGeocoder::default()));
        let exact = resolver.resolve_address("Station Road", "388001").await;
        assert_eq!(exact.point, LatLon::new(22.556, 72.951));

        let by_code = resolver.resolve_address("Unknown Lane", "388001").await;
        assert_eq!(by_code, MapCenter::resolved(ANAND));

        let fallback = resolver.resolve_address("Unknown Lane", "000000").await;
        assert_eq!(fallback, MapCenter::fallback(DEFAULT));
    }

    #[tokio::test]
    async fn test_describe_falls_back_to_coordinates() {
        let resolver = resolver(Arc::new(FakeGeocoder::default()));
        assert_eq!(resolver.describe(ANAND).await, "Anand, Gujarat, India");
        assert_eq!(
            resolver.describe(LatLon::new(22.3, 73.18)).await,
            "Location at 22.300000, 73.180000"
        );
    }
}
