use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::auth::guards::RequireEditor;
use crate::features::destinations::dtos::{
    DestinationInputDto, DestinationQueryParams, DestinationResponseDto,
};
use crate::features::destinations::services::DestinationService;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

/// List destinations
#[utoipa::path(
    get,
    path = "/api/destinations",
    params(DestinationQueryParams),
    responses(
        (status = 200, description = "List of destinations", body = ApiResponse<Vec<DestinationResponseDto>>),
    ),
    tag = "destinations"
)]
pub async fn list_destinations(
    State(service): State<Arc<DestinationService>>,
    AppQuery(params): AppQuery<DestinationQueryParams>,
) -> Result<Json<ApiResponse<Vec<DestinationResponseDto>>>> {
    let (categories, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// Get destination by id
#[utoipa::path(
    get,
    path = "/api/destinations/{id}",
    params(("id" = Uuid, Path, description = "Destination ID")),
    responses(
        (status = 200, description = "Destination found", body = ApiResponse<DestinationResponseDto>),
        (status = 404, description = "Destination not found")
    ),
    tag = "destinations"
)]
pub async fn get_destination(
    State(service): State<Arc<DestinationService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DestinationResponseDto>>> {
    let destination = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(destination), None, None)))
}

/// Create a destination
#[utoipa::path(
    post,
    path = "/api/destinations",
    request_body = DestinationInputDto,
    responses(
        (status = 201, description = "Destination created", body = ApiResponse<DestinationResponseDto>),
        (status = 400, description = "Validation error or unknown category"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 409, description = "Title already used in this category")
    ),
    tag = "destinations",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_destination(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<DestinationService>>,
    AppJson(dto): AppJson<DestinationInputDto>,
) -> Result<(StatusCode, Json<ApiResponse<DestinationResponseDto>>)> {
    dto.validate()?;

    let destination = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(destination),
            Some("Destination created successfully".to_string()),
            None,
        )),
    ))
}

/// Replace a destination
#[utoipa::path(
    put,
    path = "/api/destinations/{id}",
    params(("id" = Uuid, Path, description = "Destination ID")),
    request_body = DestinationInputDto,
    responses(
        (status = 200, description = "Destination updated", body = ApiResponse<DestinationResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Destination not found")
    ),
    tag = "destinations",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_destination(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<DestinationService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<DestinationInputDto>,
) -> Result<Json<ApiResponse<DestinationResponseDto>>> {
    dto.validate()?;

    let destination = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(destination),
        Some("Destination updated successfully".to_string()),
        None,
    )))
}

/// Delete a destination with its places and ads
#[utoipa::path(
    delete,
    path = "/api/destinations/{id}",
    params(("id" = Uuid, Path, description = "Destination ID")),
    responses(
        (status = 200, description = "Destination deleted", body = ApiResponse<DeletedDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Destination not found")
    ),
    tag = "destinations",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_destination(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<DestinationService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto { id, deleted: true }),
        Some("Destination deleted successfully".to_string()),
        None,
    )))
}

/// Toggle whether a destination is shown in the book
#[utoipa::path(
    patch,
    path = "/api/destinations/{id}",
    params(("id" = Uuid, Path, description = "Destination ID")),
    responses(
        (status = 200, description = "Destination toggled", body = ApiResponse<DestinationResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Destination not found")
    ),
    tag = "destinations",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn toggle_destination(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<DestinationService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DestinationResponseDto>>> {
    let destination = service.toggle_enabled(id).await?;
    Ok(Json(ApiResponse::success(Some(destination), None, None)))
}
