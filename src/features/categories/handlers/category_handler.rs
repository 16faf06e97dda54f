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
use crate::features::categories::dtos::{
    CategoryInputDto, CategoryQueryParams, CategoryResponseDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

/// List categories
#[utoipa::path(
    get,
    path = "/api/categories",
    params(CategoryQueryParams),
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    AppQuery(params): AppQuery<CategoryQueryParams>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let (categories, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// Get category by id
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryInputDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 409, description = "Title already used")
    ),
    tag = "categories",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn create_category(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CategoryInputDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    dto.validate()?;

    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created successfully".to_string()),
            None,
        )),
    ))
}

/// Replace a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryInputDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn update_category(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<CategoryInputDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    dto.validate()?;

    let category = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category updated successfully".to_string()),
        None,
    )))
}

/// Delete a category with everything beneath it
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<DeletedDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn delete_category(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto { id, deleted: true }),
        Some("Category deleted successfully".to_string()),
        None,
    )))
}

/// Toggle whether a category is shown in the book
#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category toggled", body = ApiResponse<CategoryResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor role required"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories",
    security(("bearer_auth" = []), ("session_cookie" = []))
)]
pub async fn toggle_category(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.toggle_enabled(id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

#[cfg(test)]
mod tests {
    use crate::features::categories::{routes, CategoryService};
    use crate::features::images::ImageService;
    use crate::modules::storage::MemoryStore;
    use crate::shared::test_helpers::{lazy_pool, with_editor_auth, with_user_auth};
    use axum::http::StatusCode;
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;

    fn router() -> Router {
        let images = Arc::new(ImageService::new(Arc::new(MemoryStore::new(
            "https://cdn.tourbook.test",
        ))));
        routes(Arc::new(CategoryService::new(lazy_pool(), images)))
    }

    fn body(title: &str) -> serde_json::Value {
        json!({
            "title": title,
            "description": "Sun, sand and surf",
            "image": "https://cdn.tourbook.test/categories/beach.jpg",
            "icon": "tree-palm",
            "color": "#0ea5e9"
        })
    }

    #[tokio::test]
    async fn test_create_with_empty_title_is_rejected() {
        let server = TestServer::new(with_editor_auth(router())).unwrap();

        let response = server.post("/api/categories").json(&body("")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Validation failed");
        let details = body["details"].as_array().unwrap();
        assert!(details
            .iter()
            .any(|d| d.as_str().unwrap().starts_with("title:")));
    }

    #[tokio::test]
    async fn test_create_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        let response = server.post("/api/categories").json(&body("Beaches")).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_mutations_require_editor_role() {
        let server = TestServer::new(with_user_auth(router(), "viewer")).unwrap();
        let id = uuid::Uuid::new_v4();

        server
            .post("/api/categories")
            .json(&body("Beaches"))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .put(&format!("/api/categories/{}", id))
            .json(&body("Beaches"))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .delete(&format!("/api/categories/{}", id))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .patch(&format!("/api/categories/{}", id))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/categories/not-a-uuid")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_uses_envelope() {
        let server = TestServer::new(with_editor_auth(router())).unwrap();
        let response = server
            .post("/api/categories")
            .content_type("application/json")
            .bytes("{not json".into())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_malformed_query_uses_envelope() {
        let server = TestServer::new(router()).unwrap();
        let response = server.get("/api/categories?page=abc").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("page"));
    }
}
