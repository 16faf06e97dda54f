use futures::future::join_all;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::images::dtos::{
    extension_for, is_mime_type_allowed, normalize_content_type, ImageResponseDto,
    ALLOWED_MIME_TYPES, MAX_IMAGE_SIZE,
};
use crate::features::images::models::ImageFolder;
use crate::modules::storage::ObjectStore;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Service storing content images in the object store
pub struct ImageService {
    store: Arc<dyn ObjectStore>,
    http: reqwest::Client,
}

impl ImageService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { store, http }
    }

    /// Validate and store an image, returning its key and public URL
    pub async fn upload(
        &self,
        data: &[u8],
        content_type: &str,
        folder: ImageFolder,
    ) -> Result<ImageResponseDto> {
        let content_type = normalize_content_type(content_type);
        if !is_mime_type_allowed(&content_type) {
            return Err(AppError::BadRequest(format!(
                "Image type '{}' is not allowed. Allowed types: {}",
                content_type,
                ALLOWED_MIME_TYPES.join(", ")
            )));
        }
        if data.is_empty() {
            return Err(AppError::BadRequest("Image is empty".to_string()));
        }
        if data.len() > MAX_IMAGE_SIZE {
            return Err(too_large());
        }

        let extension = extension_for(&content_type).unwrap_or("bin");
        let key = format!("{}/{}.{}", folder, Uuid::new_v4(), extension);

        self.store.put(&key, data, &content_type).await?;
        info!("Image stored: key={}, size={}", key, data.len());

        Ok(ImageResponseDto {
            url: self.store.public_url(&key),
            key,
            content_type,
            size: data.len() as u64,
        })
    }

    /// Fetch a remote image and store it like an upload
    pub async fn upload_from_url(&self, url: &str, folder: ImageFolder) -> Result<ImageResponseDto> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|_| AppError::validation("url: Invalid URL format"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::validation("url: Only http and https URLs are supported"));
        }

        let response = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to fetch image: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::BadRequest(format!(
                "Failed to fetch image: remote server answered {}",
                status
            )));
        }

        if response
            .content_length()
            .is_some_and(|len| len > MAX_IMAGE_SIZE as u64)
        {
            return Err(too_large());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        // Content-Length may be absent or wrong, so the cap is enforced while reading
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk
                .map_err(|e| AppError::BadRequest(format!("Failed to read image body: {}", e)))?;
            if body.len() + chunk.len() > MAX_IMAGE_SIZE {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        debug!("Fetched remote image: url={}, size={}", url, body.len());

        self.upload(&body, &content_type, folder).await
    }

    /// Delete a stored image by key
    pub async fn delete(&self, key: &str) -> Result<()> {
        if key.contains("..") || ImageFolder::of_key(key).is_none() {
            return Err(AppError::BadRequest(format!("Invalid image key '{}'", key)));
        }

        self.store.delete(key).await?;
        info!("Image deleted: key={}", key);
        Ok(())
    }

    /// Storage key behind a URL, `None` when the URL is hosted elsewhere
    pub fn key_from_url(&self, url: &str) -> Option<String> {
        self.store.key_from_url(url)
    }

    /// Delete every stored image among `urls`, logging failures instead of returning them.
    ///
    /// Returns how many objects were deleted.
    pub async fn delete_urls_best_effort(&self, urls: &[String]) -> usize {
        let keys: HashSet<String> = urls
            .iter()
            .filter_map(|url| self.store.key_from_url(url))
            .filter(|key| !key.contains("..") && ImageFolder::of_key(key).is_some())
            .collect();
        if keys.is_empty() {
            return 0;
        }

        let results = join_all(keys.iter().map(|key| async move {
            (key, self.store.delete(key).await)
        }))
        .await;

        let mut deleted = 0;
        for (key, result) in results {
            match result {
                Ok(()) => deleted += 1,
                Err(e) => warn!("Failed to delete image '{}': {}", key, e),
            }
        }

        debug!("Image cleanup: {}/{} deleted", deleted, keys.len());
        deleted
    }
}

fn too_large() -> AppError {
    AppError::BadRequest(format!(
        "Image too large. Maximum size is {} bytes ({} MB)",
        MAX_IMAGE_SIZE,
        MAX_IMAGE_SIZE / 1024 / 1024
    ))
}

/// URLs present in `old` but no longer in `new`
pub fn dropped_urls(old: &[String], new: &[String]) -> Vec<String> {
    old.iter()
        .filter(|url| !new.contains(url))
        .cloned()
        .collect()
}
