use async_trait::async_trait;

use crate::core::error::AppError;

/// Blob store holding uploaded images.
///
/// Objects are addressed by key; every object is publicly readable at
/// `{public_base_url}/{key}`, so URLs and keys convert both ways.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError>;

    /// Remove the object stored under `key`
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Base URL objects are served from, without trailing slash
    fn public_base_url(&self) -> &str;

    /// Public URL for a key
    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url(), key)
    }

    /// Recover the key from a URL produced by [`ObjectStore::public_url`].
    ///
    /// Returns `None` for URLs hosted elsewhere.
    fn key_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/", self.public_base_url());
        let rest = url.strip_prefix(&prefix)?;
        let key = rest.split(['?', '#']).next().unwrap_or_default();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }
}
