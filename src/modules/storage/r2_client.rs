//! Cloudflare R2 / S3-compatible storage client
//!
//! Uses rust-s3 for request signing. Objects are written under keys like
//! `places/{uuid}.jpg` and served from the configured public URL.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::{debug, info};

use crate::core::config::StorageConfig;
use crate::core::error::AppError;
use crate::modules::storage::ObjectStore;

/// S3-compatible storage client (R2 in production, MinIO in development)
pub struct R2Storage {
    bucket: Box<Bucket>,
    public_url: String,
}

impl R2Storage {
    /// Create a new client from configuration
    ///
    /// An explicit `endpoint` wins over the R2 account id.
    pub fn new(config: StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = match (&config.endpoint, &config.account_id) {
            (Some(endpoint), _) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            (None, Some(account_id)) => Region::R2 {
                account_id: account_id.clone(),
            },
            (None, None) => {
                return Err(AppError::Internal(
                    "Storage endpoint or R2 account id is required".to_string(),
                ))
            }
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Internal(format!("Failed to create storage bucket: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket/key) work for both R2 and MinIO
        bucket.set_path_style();

        info!(
            "Storage client initialized for bucket: {}, public_url: {}",
            bucket.name(),
            config.public_url
        );

        Ok(Self {
            bucket,
            public_url: config.public_url,
        })
    }

    /// Get the bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    fn check_status(action: &str, key: &str, status: u16) -> Result<(), AppError> {
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(AppError::Storage(format!(
                "Failed to {} '{}': storage responded with status {}",
                action, key, status
            )))
        }
    }
}

#[async_trait]
impl ObjectStore for R2Storage {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload '{}': {}", key, e)))?;

        Self::check_status("upload", key, response.status_code())?;

        debug!("Uploaded '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete '{}': {}", key, e)))?;

        Self::check_status("delete", key, response.status_code())?;

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    fn public_base_url(&self) -> &str {
        &self.public_url
    }
}
