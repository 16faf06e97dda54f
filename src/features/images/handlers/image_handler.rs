use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::auth::guards::RequireEditor;
use crate::features::images::dtos::{
    DeleteImageResponseDto, ImageResponseDto, UploadImageDto, UploadImageFromUrlDto,
};
use crate::features::images::models::ImageFolder;
use crate::features::images::services::ImageService;
use crate::shared::types::ApiResponse;

/// Upload an image
///
/// Accepts multipart/form-data with:
/// - `file`: the image (required)
/// - `folder`: categories, destinations, places, ads or misc (optional, defaults to misc)
#[utoipa::path(
    post,
    path = "/api/images/upload",
    tag = "images",
    request_body(
        content = UploadImageDto,
        content_type = "multipart/form-data",
        description = "Image upload form with an optional target folder",
    ),
    responses(
        (status = 201, description = "Image uploaded", body = ApiResponse<ImageResponseDto>),
        (status = 400, description = "Invalid image or folder, or image too large"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 502, description = "Object storage failure")
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn upload_image(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<ImageService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ImageResponseDto>>), AppError> {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut folder = ImageFolder::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        match field.name().unwrap_or_default() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read image data: {}", e))
                })?;
                file = Some((data.to_vec(), content_type));
            }
            "folder" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read folder field: {}", e))
                })?;
                if !text.trim().is_empty() {
                    folder = text.parse().map_err(AppError::BadRequest)?;
                }
            }
            other => debug!("Ignoring unknown field: {}", other),
        }
    }

    let (data, content_type) =
        file.ok_or_else(|| AppError::BadRequest("Image file is required".to_string()))?;

    let image = service.upload(&data, &content_type, folder).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(image), None, None)),
    ))
}

/// Copy a remote image into storage
#[utoipa::path(
    post,
    path = "/api/images/upload-from-url",
    tag = "images",
    request_body = UploadImageFromUrlDto,
    responses(
        (status = 201, description = "Image copied", body = ApiResponse<ImageResponseDto>),
        (status = 400, description = "Invalid URL or remote content"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 502, description = "Object storage failure")
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn upload_image_from_url(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<ImageService>>,
    AppJson(dto): AppJson<UploadImageFromUrlDto>,
) -> Result<(StatusCode, Json<ApiResponse<ImageResponseDto>>), AppError> {
    dto.validate()?;

    let image = service.upload_from_url(&dto.url, dto.folder).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(image), None, None)),
    ))
}

/// Delete an image by key
#[utoipa::path(
    delete,
    path = "/api/images/{key}",
    tag = "images",
    params(
        ("key" = String, Path, description = "Storage key, e.g. places/0190b0c4-....jpg")
    ),
    responses(
        (status = 200, description = "Image deleted", body = ApiResponse<DeleteImageResponseDto>),
        (status = 400, description = "Invalid key"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 502, description = "Object storage failure")
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn delete_image(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<ImageService>>,
    AppPath(key): AppPath<String>,
) -> Result<Json<ApiResponse<DeleteImageResponseDto>>, AppError> {
    service.delete(&key).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteImageResponseDto { key, deleted: true }),
        Some("Image deleted successfully".to_string()),
        None,
    )))
}
