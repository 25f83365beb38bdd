//! Storage module for photo files
//!
//! Provides the MinIO/S3-compatible client behind the `ObjectStorage` trait.

use async_trait::async_trait;

use crate::core::error::AppError;

mod minio_client;

pub use minio_client::MinIOClient;

/// Object store holding publicly readable files
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Key prefix readable without credentials
    fn public_prefix(&self) -> &str;

    /// Store `data` under `key` and return its public URL
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String, AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;

    /// Key of an object URL served by this store
    fn key_for_url(&self, url: &str) -> Option<String>;
}
