//! MinIO/S3-compatible storage for issue photos.
//!
//! Photos live under the public prefix and are served by direct URL; the
//! bucket gets an anonymous read policy for that prefix on startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::core::config::MinIOConfig;
use crate::core::error::AppError;
use crate::modules::storage::ObjectStorage;

type HmacSha256 = Hmac<Sha256>;

/// Maps object keys to URLs and back for one bucket
#[derive(Debug, Clone)]
pub struct ObjectUrls {
    public_base: String,
    internal_base: String,
}

impl ObjectUrls {
    pub fn new(public_endpoint: &str, endpoint: &str, bucket: &str) -> Self {
        Self {
            public_base: format!("{}/{}/", public_endpoint.trim_end_matches('/'), bucket),
            internal_base: format!("{}/{}/", endpoint.trim_end_matches('/'), bucket),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}{}", self.public_base, key)
    }

    /// Object key of a URL on either endpoint of this bucket
    pub fn key_for_url(&self, url: &str) -> Option<String> {
        [&self.public_base, &self.internal_base]
            .into_iter()
            .find_map(|base| url.strip_prefix(base.as_str()))
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

/// Anonymous `s3:GetObject` on `{bucket}/{prefix}/*`
fn public_read_policy(bucket: &str, prefix: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": {"AWS": "*"},
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{bucket}/{prefix}/*")]
            }
        ]
    })
    .to_string()
}

/// AWS Signature v4 signer for the few admin calls rust-s3 does not cover
struct SigV4<'a> {
    access_key: &'a str,
    secret_key: &'a str,
    region: &'a str,
}

impl SigV4<'_> {
    fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, AppError> {
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn signature(&self, date_stamp: &str, string_to_sign: &str) -> Result<String, AppError> {
        let k_date = Self::hmac_sha256(
            format!("AWS4{}", self.secret_key).as_bytes(),
            date_stamp.as_bytes(),
        )?;
        let k_region = Self::hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = Self::hmac_sha256(&k_region, b"s3")?;
        let k_signing = Self::hmac_sha256(&k_service, b"aws4_request")?;
        Ok(hex::encode(Self::hmac_sha256(
            &k_signing,
            string_to_sign.as_bytes(),
        )?))
    }

    /// `Authorization` header for a PUT on `/{bucket}?{query}=`
    fn authorize_put(
        &self,
        now: DateTime<Utc>,
        host: &str,
        bucket: &str,
        query: &str,
        payload_hash: &str,
    ) -> Result<String, AppError> {
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let signed_headers = "host;x-amz-content-sha256;x-amz-date";

        let canonical_request = format!(
            "PUT\n/{}\n{}=\nhost:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n\n{}\n{}",
            bucket, query, host, payload_hash, amz_date, signed_headers, payload_hash
        );

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            credential_scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        Ok(format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.access_key,
            credential_scope,
            signed_headers,
            self.signature(&date_stamp, &string_to_sign)?
        ))
    }
}

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_prefix: String,
    urls: ObjectUrls,
    access_key: String,
    secret_key: String,
    region_name: String,
    http_client: Client,
}

impl MinIOClient {
    /// Connect, create the bucket if missing and open the public prefix for reads
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;
        bucket.set_path_style();

        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let urls = ObjectUrls::new(&config.public_endpoint, &config.endpoint, &config.bucket);

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_prefix: config.public_prefix,
            urls,
            access_key: config.access_key,
            secret_key: config.secret_key,
            region_name: config.region,
            http_client,
        };

        client.ensure_bucket_exists().await;
        client.set_public_read_policy().await;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, public_prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.public_prefix
        );

        Ok(client)
    }

    /// Create the bucket; an existing bucket is fine
    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created successfully", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    async fn set_public_read_policy(&self) {
        let bucket_name = self.bucket.name();
        let policy = public_read_policy(&bucket_name, &self.public_prefix);

        match self.put_bucket_policy(&bucket_name, &policy).await {
            Ok(()) => info!(
                "Set public read policy for {}/{}/*",
                bucket_name, self.public_prefix
            ),
            Err(e) => warn!(
                "Failed to set bucket policy for '{}': {}. \
                Set it manually with: mc anonymous set download minio/{}/{}",
                bucket_name, e, bucket_name, self.public_prefix
            ),
        }
    }

    async fn put_bucket_policy(&self, bucket_name: &str, policy: &str) -> Result<(), AppError> {
        let endpoint_url = Url::parse(&self.endpoint)
            .map_err(|e| AppError::Internal(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| AppError::Internal("Endpoint URL has no host".to_string()))?;
        let host_header = match endpoint_url.port() {
            Some(p) => format!("{}:{}", host, p),
            None => host.to_string(),
        };

        let now = Utc::now();
        let payload_hash = hex::encode(Sha256::digest(policy.as_bytes()));
        let signer = SigV4 {
            access_key: &self.access_key,
            secret_key: &self.secret_key,
            region: &self.region_name,
        };
        let authorization =
            signer.authorize_put(now, &host_header, bucket_name, "policy", &payload_hash)?;

        let response = self
            .http_client
            .put(format!("{}/{}?policy", self.endpoint, bucket_name))
            .header("Host", &host_header)
            .header("x-amz-date", now.format("%Y%m%dT%H%M%SZ").to_string())
            .header("x-amz-content-sha256", &payload_hash)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send policy request: {}", e)))?;

        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(AppError::Internal(format!(
            "Failed to set bucket policy: {} - {}",
            status, body
        )))
    }
}

#[async_trait]
impl ObjectStorage for MinIOClient {
    fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;

        debug!("Uploaded file '{}' to bucket '{}'", key, self.bucket.name());
        Ok(self.urls.public_url(key))
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file '{}': {}", key, e)))?;

        debug!("Deleted file '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        self.urls.key_for_url(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_object_urls_round_trip_both_endpoints() {
        let urls = ObjectUrls::new(
            "https://cdn.civictrack.app/",
            "http://minio:9000",
            "civictrack-photos",
        );
        let url = urls.public_url("public/issues/u1/a.jpg");
        assert_eq!(
            url,
            "https://cdn.civictrack.app/civictrack-photos/public/issues/u1/a.jpg"
        );
        assert_eq!(
            urls.key_for_url(&url).as_deref(),
            Some("public/issues/u1/a.jpg")
        );
        assert_eq!(
            urls.key_for_url("http://minio:9000/civictrack-photos/public/x.png")
                .as_deref(),
            Some("public/x.png")
        );
    }

    #[test]
    fn test_foreign_urls_have_no_key() {
        let urls = ObjectUrls::new("http://localhost:9000", "http://minio:9000", "photos");
        assert!(urls.key_for_url("https://example.com/photos/a.jpg").is_none());
        assert!(urls.key_for_url("http://localhost:9000/other/a.jpg").is_none());
        assert!(urls.key_for_url("http://localhost:9000/photos/").is_none());
    }

    #[test]
    fn test_public_read_policy_scopes_prefix() {
        let policy: serde_json::Value =
            serde_json::from_str(&public_read_policy("photos", "public")).unwrap();
        assert_eq!(
            policy["Statement"][0]["Resource"][0],
            "arn:aws:s3:::photos/public/*"
        );
        assert_eq!(policy["Statement"][0]["Action"][0], "s3:GetObject");
    }

    #[test]
    fn test_sigv4_authorization_shape() {
        let signer = SigV4 {
            access_key: "minioadmin",
            secret_key: "minioadmin",
            region: "us-east-1",
        };
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap();
        let header = signer
            .authorize_put(now, "localhost:9000", "photos", "policy", "abc")
            .unwrap();
        assert!(header.starts_with(
            "AWS4-HMAC-SHA256 Credential=minioadmin/20260115/us-east-1/s3/aws4_request"
        ));
        let signature = header.rsplit("Signature=").next().unwrap();
        assert_eq!(signature.len(), 64);

        let again = signer
            .authorize_put(now, "localhost:9000", "photos", "policy", "abc")
            .unwrap();
        assert_eq!(header, again);
    }
}
