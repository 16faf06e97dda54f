use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::images::models::ImageFolder;

/// Upload image request for OpenAPI documentation.
/// The handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadImageDto {
    /// The image to upload (jpeg, png, gif, webp or avif, at most 5 MiB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Target folder, defaults to "misc"
    #[schema(example = "destinations")]
    pub folder: Option<String>,
}

/// Request to copy a remote image into storage
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UploadImageFromUrlDto {
    #[validate(url(message = "Invalid URL format"))]
    #[schema(example = "https://images.example.com/beach.jpg")]
    pub url: String,
    #[serde(default)]
    pub folder: ImageFolder,
}

/// Stored image
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageResponseDto {
    /// Storage key, `{folder}/{uuid}.{ext}`
    pub key: String,
    /// Public URL derived from the key
    pub url: String,
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteImageResponseDto {
    pub key: String,
    pub deleted: bool,
}

/// Accepted image MIME types
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/avif",
];

/// Maximum image size in bytes (5 MiB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Lower-cased MIME type without parameters; `image/jpg` is folded into `image/jpeg`
pub fn normalize_content_type(content_type: &str) -> String {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence == "image/jpg" {
        "image/jpeg".to_string()
    } else {
        essence
    }
}

pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// File extension for an allowed (normalized) MIME type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}
