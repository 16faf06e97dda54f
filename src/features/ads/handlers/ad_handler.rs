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
use crate::features::ads::dtos::{
    AdInputDto, AdQueryParams, AdResponseDto,
};
use crate::features::ads::services::AdService;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

/// List ads
#[utoipa::path(
    get,
    path = "/api/ads",
    params(AdQueryParams),
    responses(
        (status = 200, description = "List of ads", body = ApiResponse<Vec<AdResponseDto>>),
    ),
    tag = "ads"
)]
pub async fn list_ads(
    State(service): State<Arc<AdService>>,
    AppQuery(params): AppQuery<AdQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdResponseDto>>>> {
    let (categories, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// Get ad by id
#[utoipa::path(
    get,
    path = "/api/ads/{id}",
    params(("id" = Uuid, Path, description = "Ad ID")),
    responses(
        (status = 200, description = "Ad found", body = ApiResponse<AdResponseDto>),
        (status = 404, description = "Ad not found")
    ),
    tag = "ads"
)]
pub async fn get_ad(
    State(service): State<Arc<AdService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<AdResponseDto>>> {
    let ad = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(ad), None, None)))
}

/// Create an ad
#[utoipa::path(
    post,
    path = "/api/ads",
    request_body = AdInputDto,
    responses(
        (status = 201, description = "Ad created", body = ApiResponse<AdResponseDto>),
        (status = 400, description = "Validation error or unknown place"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required")
    ),
    tag = "ads",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_ad(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<AdService>>,
    AppJson(dto): AppJson<AdInputDto>,
) -> Result<(StatusCode, Json<ApiResponse<AdResponseDto>>)> {
    dto.validate()?;

    let ad = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(ad),
            Some("Ad created successfully".to_string()),
            None,
        )),
    ))
}

/// Replace an ad
#[utoipa::path(
    put,
    path = "/api/ads/{id}",
    params(("id" = Uuid, Path, description = "Ad ID")),
    request_body = AdInputDto,
    responses(
        (status = 200, description = "Ad updated", body = ApiResponse<AdResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Ad not found")
    ),
    tag = "ads",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_ad(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<AdService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<AdInputDto>,
) -> Result<Json<ApiResponse<AdResponseDto>>> {
    dto.validate()?;

    let ad = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(ad),
        Some("Ad updated successfully".to_string()),
        None,
    )))
}

/// Delete an ad
#[utoipa::path(
    delete,
    path = "/api/ads/{id}",
    params(("id" = Uuid, Path, description = "Ad ID")),
    responses(
        (status = 200, description = "Ad deleted", body = ApiResponse<DeletedDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Ad not found")
    ),
    tag = "ads",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_ad(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<AdService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto { id, deleted: true }),
        Some("Ad deleted successfully".to_string()),
        None,
    )))
}

/// Toggle whether an ad is shown on its place
#[utoipa::path(
    patch,
    path = "/api/ads/{id}",
    params(("id" = Uuid, Path, description = "Ad ID")),
    responses(
        (status = 200, description = "Ad toggled", body = ApiResponse<AdResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Ad not found")
    ),
    tag = "ads",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn toggle_ad(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<AdService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<AdResponseDto>>> {
    let ad = service.toggle_enabled(id).await?;
    Ok(Json(ApiResponse::success(Some(ad), None, None)))
}

#[cfg(test)]
mod tests {
    use crate::features::ads::{routes, AdService};
    use crate::features::images::ImageService;
    use crate::modules::storage::MemoryStore;
    use crate::shared::test_helpers::{lazy_pool, with_editor_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_invalid_contact_is_rejected() {
        let images = Arc::new(ImageService::new(Arc::new(MemoryStore::new(
            "https://cdn.tourbook.test",
        ))));
        let router = routes(Arc::new(AdService::new(lazy_pool(), images)));
        let server = TestServer::new(with_editor_auth(router)).unwrap();

        let response = server
            .post("/api/ads")
            .json(&json!({
                "place_id": Uuid::new_v4(),
                "title": "Sunset Cruise",
                "description": "Dinner on the water",
                "email": "cruise-at-example"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["details"], json!(["email: must be a valid email"]));
    }
}
