use std::env;
use std::time::Duration;

use crate::features::board::geo::LatLon;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub board: BoardConfig,
    pub upload: UploadConfig,
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    /// Claim key under which the identity provider places `roles`
    pub claims_namespace: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for issue photos
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Public endpoint URL used in photo links (defaults to endpoint)
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Prefix that receives an anonymous read policy
    pub public_prefix: String,
}

/// Issue board behaviour: page size, map defaults and moderation threshold
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub issues_per_page: usize,
    pub default_radius_km: f64,
    pub radius_options_km: Vec<f64>,
    pub default_center: LatLon,
    /// Spam reports after which an issue is hidden from citizens
    pub spam_threshold: i32,
    pub session_idle_timeout: Duration,
}

/// Photo upload limits
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_photos_per_issue: usize,
    pub max_photo_size: usize,
    pub allowed_photo_types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Appended to free-form queries to keep lookups inside one country
    pub country: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            board: BoardConfig::from_env()?,
            upload: UploadConfig::from_env()?,
            geocoding: GeocodingConfig::from_env()?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", name)),
        _ => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins =
            parse_list(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()));

        let max_request_body_size =
            parse_var("MAX_REQUEST_BODY_SIZE", Self::DEFAULT_MAX_REQUEST_BODY_SIZE)?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_var("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_var("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60; // 1 minute
    const DEFAULT_CLAIMS_NAMESPACE: &'static str = "https://civictrack.app/claims";

    pub fn from_env() -> Result<Self, String> {
        let issuer = env::var("OIDC_ISSUER")
            .map_err(|_| "OIDC_ISSUER environment variable is required".to_string())?;

        let audience = env::var("OIDC_AUDIENCE")
            .map_err(|_| "OIDC_AUDIENCE environment variable is required".to_string())?;

        let jwks_url = env::var("OIDC_JWKS_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("{}/jwks", issuer.trim_end_matches('/')));

        let claims_namespace = env::var("OIDC_CLAIMS_NAMESPACE")
            .unwrap_or_else(|_| Self::DEFAULT_CLAIMS_NAMESPACE.to_string());

        let jwks_cache_ttl_secs = parse_var("JWKS_CACHE_TTL", Self::DEFAULT_JWKS_CACHE_TTL_SECS)?;
        let jwt_leeway_secs = parse_var("JWT_LEEWAY", Self::DEFAULT_JWT_LEEWAY_SECS)?;

        Ok(Self {
            issuer,
            audience,
            jwks_url,
            claims_namespace,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "CivicTrack API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for CivicTrack".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());
        let public_endpoint =
            env::var("MINIO_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key: env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            bucket: env::var("MINIO_BUCKET").unwrap_or_else(|_| "civictrack-photos".to_string()),
            region: env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            public_prefix: env::var("MINIO_PUBLIC_PREFIX")
                .unwrap_or_else(|_| "public".to_string()),
        })
    }
}

impl BoardConfig {
    pub const DEFAULT_ISSUES_PER_PAGE: usize = 9;
    pub const DEFAULT_RADIUS_KM: f64 = 5.0;
    pub const DEFAULT_RADIUS_OPTIONS_KM: [f64; 3] = [1.0, 3.0, 5.0];
    // Geographic centre of India
    pub const DEFAULT_CENTER_LAT: f64 = 20.5937;
    pub const DEFAULT_CENTER_LNG: f64 = 78.9629;
    pub const DEFAULT_SPAM_THRESHOLD: i32 = 5;
    const DEFAULT_SESSION_IDLE_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let issues_per_page = parse_var("ISSUES_PER_PAGE", Self::DEFAULT_ISSUES_PER_PAGE)?;
        if issues_per_page == 0 {
            return Err("ISSUES_PER_PAGE must be greater than zero".to_string());
        }

        let default_radius_km = parse_var("DEFAULT_RADIUS_KM", Self::DEFAULT_RADIUS_KM)?;
        if !(default_radius_km.is_finite() && default_radius_km > 0.0) {
            return Err("DEFAULT_RADIUS_KM must be a positive number".to_string());
        }

        let radius_options_km = match env::var("RADIUS_OPTIONS_KM") {
            Ok(raw) if !raw.trim().is_empty() => parse_list(&raw)
                .iter()
                .map(|s| {
                    s.parse::<f64>()
                        .map_err(|_| "RADIUS_OPTIONS_KM must be a list of numbers".to_string())
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => Self::DEFAULT_RADIUS_OPTIONS_KM.to_vec(),
        };

        let lat = parse_var("DEFAULT_CENTER_LAT", Self::DEFAULT_CENTER_LAT)?;
        let lng = parse_var("DEFAULT_CENTER_LNG", Self::DEFAULT_CENTER_LNG)?;
        let default_center = LatLon::checked(lat, lng)
            .ok_or_else(|| "DEFAULT_CENTER_LAT/LNG must be a valid coordinate".to_string())?;

        let spam_threshold = parse_var("SPAM_THRESHOLD", Self::DEFAULT_SPAM_THRESHOLD)?;
        let idle_secs = parse_var("BOARD_SESSION_IDLE_SECS", Self::DEFAULT_SESSION_IDLE_SECS)?;

        Ok(Self {
            issues_per_page,
            default_radius_km,
            radius_options_km,
            default_center,
            spam_threshold,
            session_idle_timeout: Duration::from_secs(idle_secs),
        })
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            issues_per_page: Self::DEFAULT_ISSUES_PER_PAGE,
            default_radius_km: Self::DEFAULT_RADIUS_KM,
            radius_options_km: Self::DEFAULT_RADIUS_OPTIONS_KM.to_vec(),
            default_center: LatLon::new(Self::DEFAULT_CENTER_LAT, Self::DEFAULT_CENTER_LNG),
            spam_threshold: Self::DEFAULT_SPAM_THRESHOLD,
            session_idle_timeout: Duration::from_secs(Self::DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

impl UploadConfig {
    pub const DEFAULT_MAX_PHOTOS_PER_ISSUE: usize = 5;
    pub const DEFAULT_MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024; // 5MB
    pub const DEFAULT_ALLOWED_PHOTO_TYPES: [&'static str; 3] =
        ["image/jpeg", "image/png", "image/webp"];

    pub fn from_env() -> Result<Self, String> {
        let allowed_photo_types = match env::var("ALLOWED_PHOTO_TYPES") {
            Ok(raw) if !raw.trim().is_empty() => parse_list(&raw),
            _ => Self::default().allowed_photo_types,
        };

        Ok(Self {
            max_photos_per_issue: parse_var(
                "MAX_PHOTOS_PER_ISSUE",
                Self::DEFAULT_MAX_PHOTOS_PER_ISSUE,
            )?,
            max_photo_size: parse_var("MAX_PHOTO_SIZE", Self::DEFAULT_MAX_PHOTO_SIZE)?,
            allowed_photo_types,
        })
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_photos_per_issue: Self::DEFAULT_MAX_PHOTOS_PER_ISSUE,
            max_photo_size: Self::DEFAULT_MAX_PHOTO_SIZE,
            allowed_photo_types: Self::DEFAULT_ALLOWED_PHOTO_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl GeocodingConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 5;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("NOMINATIM_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string())
            .trim_end_matches('/')
            .to_string();

        let user_agent = env::var("GEOCODING_USER_AGENT")
            .unwrap_or_else(|_| "CivicTrackCore/1.0 (civic-issue-reporting)".to_string());

        let country = env::var("GEOCODING_COUNTRY").unwrap_or_else(|_| "India".to_string());
        let timeout_secs = parse_var("GEOCODING_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            base_url,
            user_agent,
            country,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
