use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, post},
    Router,
};
use std::sync::Arc;

use crate::features::images::dtos::MAX_IMAGE_SIZE;
use crate::features::images::handlers::{delete_image, upload_image, upload_image_from_url};
use crate::features::images::services::ImageService;

/// Image routes; every route requires the editor role
pub fn routes(image_service: Arc<ImageService>) -> Router {
    Router::new()
        .route(
            "/api/images/upload",
            // Room for multipart framing on top of the image itself
            post(upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024)),
        )
        .route("/api/images/upload-from-url", post(upload_image_from_url))
        .route("/api/images/{*key}", delete(delete_image))
        .with_state(image_service)
}
