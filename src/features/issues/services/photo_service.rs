use std::sync::Arc;
use uuid::Uuid;

use crate::core::config::UploadConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::ObjectStorage;

/// One photo taken from a multipart upload
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Reject the whole batch on the first bad photo; nothing is stored before this passes
pub fn validate_photo_batch(photos: &[PhotoUpload], config: &UploadConfig) -> Result<()> {
    if photos.is_empty() {
        return Err(AppError::Validation(
            "Select at least one photo to upload".to_string(),
        ));
    }
    if photos.len() > config.max_photos_per_issue {
        return Err(AppError::Validation(format!(
            "Maximum {} photos allowed",
            config.max_photos_per_issue
        )));
    }

    for (index, photo) in photos.iter().enumerate() {
        if !config
            .allowed_photo_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&photo.content_type))
        {
            return Err(AppError::Validation(format!(
                "Photo {}: Invalid file type. Please use JPEG, PNG, or WebP.",
                index + 1
            )));
        }
        if photo.data.len() > config.max_photo_size {
            return Err(AppError::Validation(format!(
                "Photo {}: File too large. Maximum size is {}MB.",
                index + 1,
                config.max_photo_size / (1024 * 1024)
            )));
        }
    }
    Ok(())
}

fn extension_for(content_type: &str, file_name: &str) -> String {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" => "jpg".to_string(),
        "image/png" => "png".to_string(),
        "image/webp" => "webp".to_string(),
        _ => file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string()),
    }
}

/// Service for issue photos in object storage
pub struct PhotoService {
    storage: Arc<dyn ObjectStorage>,
    config: UploadConfig,
}

impl PhotoService {
    pub fn new(storage: Arc<dyn ObjectStorage>, config: UploadConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Key prefix under which `owner`'s photos are stored
    fn owner_prefix(&self, owner: &str) -> String {
        format!(
            "{}/issues/{}/",
            self.storage.public_prefix(),
            urlencoding::encode(owner)
        )
    }

    fn is_owned_key(&self, owner: &str, key: &str) -> bool {
        key.starts_with(&self.owner_prefix(owner))
    }

    /// Validate and store a batch, returning public URLs in upload order.
    ///
    /// If any upload fails, photos already stored from this batch are removed.
    pub async fn upload_batch(&self, owner: &str, photos: Vec<PhotoUpload>) -> Result<Vec<String>> {
        validate_photo_batch(&photos, &self.config)?;

        let prefix = self.owner_prefix(owner);
        let mut stored: Vec<(String, String)> = Vec::with_capacity(photos.len());

        for (index, photo) in photos.into_iter().enumerate() {
            let key = format!(
                "{}{}.{}",
                prefix,
                Uuid::new_v4(),
                extension_for(&photo.content_type, &photo.file_name)
            );

            match self
                .storage
                .put(&key, photo.data, &photo.content_type)
                .await
            {
                Ok(url) => stored.push((key, url)),
                Err(e) => {
                    tracing::error!("Failed to upload photo {}: {}", index + 1, e);
                    for (key, _) in &stored {
                        if let Err(e) = self.storage.remove(key).await {
                            tracing::warn!("Failed to clean up photo '{}': {}", key, e);
                        }
                    }
                    return Err(AppError::Storage(format!(
                        "Error uploading photo {}. Please try again.",
                        index + 1
                    )));
                }
            }
        }

        tracing::info!("Uploaded {} photos for {}", stored.len(), owner);
        Ok(stored.into_iter().map(|(_, url)| url).collect())
    }

    /// Every URL must be a photo `owner` uploaded to this storage
    pub fn check_owned(&self, owner: &str, urls: &[String]) -> Result<()> {
        for url in urls {
            let owned = self
                .storage
                .key_for_url(url)
                .is_some_and(|key| self.is_owned_key(owner, &key));
            if !owned {
                return Err(AppError::Validation(format!(
                    "Photo URL is not one of your uploads: {}",
                    url
                )));
            }
        }
        Ok(())
    }

    /// Remove one of `owner`'s photos by URL
    pub async fn remove_by_url(&self, owner: &str, url: &str) -> Result<()> {
        let key = self.storage.key_for_url(url).ok_or_else(|| {
            AppError::BadRequest("Photo URL does not belong to this storage".to_string())
        })?;

        if !self.is_owned_key(owner, &key) {
            return Err(AppError::Forbidden(
                "You can only remove your own photos".to_string(),
            ));
        }

        self.storage.remove(&key).await?;
        tracing::info!("Removed photo '{}'", key);
        Ok(())
    }

    /// Best-effort removal used when issues are deleted
    pub async fn remove_many(&self, urls: &[String]) {
        for url in urls {
            let Some(key) = self.storage.key_for_url(url) else {
                tracing::warn!("Skipping photo outside storage: {}", url);
                continue;
            };
            if let Err(e) = self.storage.remove(&key).await {
                tracing::warn!("Failed to remove photo '{}': {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{jpeg, MemoryStorage, STORAGE_BASE_URL as BASE};

    fn service(storage: Arc<MemoryStorage>) -> PhotoService {
        PhotoService::new(storage, UploadConfig::default())
    }

    #[test]
    fn test_batch_validation_messages() {
        let config = UploadConfig::default();
        let gif = PhotoUpload {
            content_type: "image/gif".to_string(),
            ..jpeg(10)
        };

        let err = validate_photo_batch(&[jpeg(10), gif], &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Photo 2: Invalid file type. Please use JPEG, PNG, or WebP."
        );

        let err = validate_photo_batch(&[jpeg(5 * 1024 * 1024 + 1)], &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Photo 1: File too large. Maximum size is 5MB."
        );

        let six: Vec<_> = (0..6).map(|_| jpeg(10)).collect();
        assert!(validate_photo_batch(&six, &config).is_err());
        assert!(validate_photo_batch(&[], &config).is_err());
        assert!(validate_photo_batch(&[jpeg(5 * 1024 * 1024)], &config).is_ok());
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/webp", "x"), "webp");
        assert_eq!(extension_for("IMAGE/JPEG", "x.jpeg"), "jpg");
        assert_eq!(extension_for("application/x-foo", "scan.HEIC"), "heic");
        assert_eq!(extension_for("application/x-foo", "noext"), "bin");
    }

    #[tokio::test]
    async fn test_upload_batch_stores_under_owner_prefix() {
        let storage = Arc::new(MemoryStorage::default());
        let photos = service(Arc::clone(&storage));

        let urls = photos
            .upload_batch("auth0|citizen 7", vec![jpeg(10), jpeg(20)])
            .await
            .unwrap();

        assert_eq!(urls.len(), 2);
        assert!(urls
            .iter()
            .all(|u| u.starts_with(&format!("{}public/issues/auth0%7Ccitizen%207/", BASE))));
        assert_eq!(storage.objects.lock().await.len(), 2);
        assert!(photos.check_owned("auth0|citizen 7", &urls).is_ok());
        assert!(photos.check_owned("someone-else", &urls).is_err());
    }

    #[tokio::test]
    async fn test_failed_upload_removes_partial_batch() {
        let storage = Arc::new(MemoryStorage::failing_after(1));
        let photos = service(Arc::clone(&storage));

        let result = photos.upload_batch("u1", vec![jpeg(10), jpeg(10)]).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(storage.objects.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_by_url_checks_ownership() {
        let storage = Arc::new(MemoryStorage::default());
        let photos = service(Arc::clone(&storage));
        let urls = photos.upload_batch("u1", vec![jpeg(10)]).await.unwrap();

        assert!(matches!(
            photos.remove_by_url("u2", &urls[0]).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            photos.remove_by_url("u1", "https://elsewhere.example/a.jpg").await,
            Err(AppError::BadRequest(_))
        ));
        photos.remove_by_url("u1", &urls[0]).await.unwrap();
        assert!(storage.objects.lock().await.is_empty());
    }
}
