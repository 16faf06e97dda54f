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
use crate::features::places::dtos::{
    PlaceInputDto, PlaceQueryParams, PlaceResponseDto,
};
use crate::features::places::services::PlaceService;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

/// List places
#[utoipa::path(
    get,
    path = "/api/places",
    params(PlaceQueryParams),
    responses(
        (status = 200, description = "List of places", body = ApiResponse<Vec<PlaceResponseDto>>),
    ),
    tag = "places"
)]
pub async fn list_places(
    State(service): State<Arc<PlaceService>>,
    AppQuery(params): AppQuery<PlaceQueryParams>,
) -> Result<Json<ApiResponse<Vec<PlaceResponseDto>>>> {
    let (categories, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// Get place by id
#[utoipa::path(
    get,
    path = "/api/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Place found", body = ApiResponse<PlaceResponseDto>),
        (status = 404, description = "Place not found")
    ),
    tag = "places"
)]
pub async fn get_place(
    State(service): State<Arc<PlaceService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<PlaceResponseDto>>> {
    let place = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(place), None, None)))
}

/// Create a place
#[utoipa::path(
    post,
    path = "/api/places",
    request_body = PlaceInputDto,
    responses(
        (status = 201, description = "Place created", body = ApiResponse<PlaceResponseDto>),
        (status = 400, description = "Validation error or unknown destination"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 409, description = "Name already used in this destination")
    ),
    tag = "places",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_place(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<PlaceService>>,
    AppJson(dto): AppJson<PlaceInputDto>,
) -> Result<(StatusCode, Json<ApiResponse<PlaceResponseDto>>)> {
    dto.validate()?;

    let place = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(place),
            Some("Place created successfully".to_string()),
            None,
        )),
    ))
}

/// Replace a place
#[utoipa::path(
    put,
    path = "/api/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    request_body = PlaceInputDto,
    responses(
        (status = 200, description = "Place updated", body = ApiResponse<PlaceResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Place not found")
    ),
    tag = "places",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_place(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<PlaceService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<PlaceInputDto>,
) -> Result<Json<ApiResponse<PlaceResponseDto>>> {
    dto.validate()?;

    let place = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(place),
        Some("Place updated successfully".to_string()),
        None,
    )))
}

/// Delete a place with its ads
#[utoipa::path(
    delete,
    path = "/api/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Place deleted", body = ApiResponse<DeletedDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Place not found")
    ),
    tag = "places",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_place(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<PlaceService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto { id, deleted: true }),
        Some("Place deleted successfully".to_string()),
        None,
    )))
}

/// Toggle whether a place is shown on the map page
#[utoipa::path(
    patch,
    path = "/api/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Place toggled", body = ApiResponse<PlaceResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Place not found")
    ),
    tag = "places",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn toggle_place(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<PlaceService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<PlaceResponseDto>>> {
    let place = service.toggle_enabled(id).await?;
    Ok(Json(ApiResponse::success(Some(place), None, None)))
}

#[cfg(test)]
mod tests {
    use crate::features::images::ImageService;
    use crate::features::places::{routes, PlaceService};
    use crate::modules::storage::MemoryStore;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    fn server() -> TestServer {
        let images = Arc::new(ImageService::new(Arc::new(MemoryStore::new(
            "https://cdn.tourbook.test",
        ))));
        let router = routes(Arc::new(PlaceService::new(lazy_pool(), images)));
        TestServer::new(with_admin_auth(router)).unwrap()
    }

    #[tokio::test]
    async fn test_out_of_range_location_is_rejected() {
        let response = server()
            .put(&format!("/api/places/{}", Uuid::new_v4()))
            .json(&json!({
                "destination_id": Uuid::new_v4(),
                "name": "Lighthouse",
                "description": "Old lighthouse",
                "location": { "lat": 123.0, "lng": 10.0 },
                "images": ["https://cdn.tourbook.test/places/lighthouse.jpg"]
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["details"][0], "location.lat: must be between -90 and 90");
    }

    #[tokio::test]
    async fn test_admin_passes_editor_guard() {
        // Admin reaches validation, which fails before any query runs
        let response = server()
            .post("/api/places")
            .json(&json!({
                "destination_id": Uuid::new_v4(),
                "name": "",
                "description": "x",
                "location": { "lat": 0.0, "lng": 0.0 },
                "images": []
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_uuid_filter_uses_envelope() {
        let response = server().get("/api/places?category_id=nope").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid query parameter"));
    }
}
