use reqwest::{multipart, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::client::error::ClientError;
use crate::features::ads::dtos::{AdInputDto, AdQueryParams, AdResponseDto};
use crate::features::auth::dtos::{
    AuthUserDto, SessionResponseDto, SignInRequestDto, SignOutResponseDto,
};
use crate::features::categories::dtos::{
    CategoryInputDto, CategoryQueryParams, CategoryResponseDto,
};
use crate::features::destinations::dtos::{
    DestinationInputDto, DestinationQueryParams, DestinationResponseDto,
};
use crate::features::images::dtos::{
    DeleteImageResponseDto, ImageResponseDto, UploadImageFromUrlDto,
};
use crate::features::images::ImageFolder;
use crate::features::places::dtos::{PlaceInputDto, PlaceQueryParams, PlaceResponseDto};
use crate::shared::types::{ApiResponse, DeletedDto};

type ClientResult<T> = std::result::Result<T, ClientError>;

/// One page of a list endpoint
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// Total matching rows across all pages
    pub total: i64,
}

/// Client for the tourbook REST API.
///
/// Authenticated calls send the session token as a bearer token once
/// `sign_in` succeeded or a token was supplied with `with_token`.
#[derive(Debug, Clone)]
pub struct TourbookClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl TourbookClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(format!(
                "{}: scheme must be http or https",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    /// Sign in and keep the returned token for later calls
    pub async fn sign_in(&mut self, email: &str, password: &str) -> ClientResult<SessionResponseDto> {
        let body = SignInRequestDto {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session: SessionResponseDto = self
            .send_data(self.request(Method::POST, "/api/auth/sign-in").json(&body))
            .await?;

        tracing::debug!("Signed in as {}", session.user.email);
        self.token = Some(session.token.clone());
        Ok(session)
    }

    /// End the server session; the local token is dropped even if the call fails
    pub async fn sign_out(&mut self) -> ClientResult<()> {
        let result: ClientResult<SignOutResponseDto> = self
            .send_data(self.request(Method::POST, "/api/auth/sign-out"))
            .await;
        self.token = None;
        result.map(|_| ())
    }

    pub async fn session(&self) -> ClientResult<AuthUserDto> {
        self.send_data(self.request(Method::GET, "/api/auth/session"))
            .await
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    pub async fn list_categories(
        &self,
        query: &CategoryQueryParams,
    ) -> ClientResult<Listing<CategoryResponseDto>> {
        self.list("/api/categories", query).await
    }

    pub async fn get_category(&self, id: Uuid) -> ClientResult<CategoryResponseDto> {
        self.get("/api/categories", id).await
    }

    pub async fn create_category(&self, dto: &CategoryInputDto) -> ClientResult<CategoryResponseDto> {
        self.create("/api/categories", dto).await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        dto: &CategoryInputDto,
    ) -> ClientResult<CategoryResponseDto> {
        self.update("/api/categories", id, dto).await
    }

    pub async fn delete_category(&self, id: Uuid) -> ClientResult<DeletedDto> {
        self.delete("/api/categories", id).await
    }

    pub async fn toggle_category(&self, id: Uuid) -> ClientResult<CategoryResponseDto> {
        self.toggle("/api/categories", id).await
    }

    // -------------------------------------------------------------------------
    // Destinations
    // -------------------------------------------------------------------------

    pub async fn list_destinations(
        &self,
        query: &DestinationQueryParams,
    ) -> ClientResult<Listing<DestinationResponseDto>> {
        self.list("/api/destinations", query).await
    }

    pub async fn get_destination(&self, id: Uuid) -> ClientResult<DestinationResponseDto> {
        self.get("/api/destinations", id).await
    }

    pub async fn create_destination(
        &self,
        dto: &DestinationInputDto,
    ) -> ClientResult<DestinationResponseDto> {
        self.create("/api/destinations", dto).await
    }

    pub async fn update_destination(
        &self,
        id: Uuid,
        dto: &DestinationInputDto,
    ) -> ClientResult<DestinationResponseDto> {
        self.update("/api/destinations", id, dto).await
    }

    pub async fn delete_destination(&self, id: Uuid) -> ClientResult<DeletedDto> {
        self.delete("/api/destinations", id).await
    }

    pub async fn toggle_destination(&self, id: Uuid) -> ClientResult<DestinationResponseDto> {
        self.toggle("/api/destinations", id).await
    }

    // -------------------------------------------------------------------------
    // Places
    // -------------------------------------------------------------------------

    pub async fn list_places(
        &self,
        query: &PlaceQueryParams,
    ) -> ClientResult<Listing<PlaceResponseDto>> {
        self.list("/api/places", query).await
    }

    pub async fn get_place(&self, id: Uuid) -> ClientResult<PlaceResponseDto> {
        self.get("/api/places", id).await
    }

    pub async fn create_place(&self, dto: &PlaceInputDto) -> ClientResult<PlaceResponseDto> {
        self.create("/api/places", dto).await
    }

    pub async fn update_place(&self, id: Uuid, dto: &PlaceInputDto) -> ClientResult<PlaceResponseDto> {
        self.update("/api/places", id, dto).await
    }

    pub async fn delete_place(&self, id: Uuid) -> ClientResult<DeletedDto> {
        self.delete("/api/places", id).await
    }

    pub async fn toggle_place(&self, id: Uuid) -> ClientResult<PlaceResponseDto> {
        self.toggle("/api/places", id).await
    }

    // -------------------------------------------------------------------------
    // Ads
    // -------------------------------------------------------------------------

    pub async fn list_ads(&self, query: &AdQueryParams) -> ClientResult<Listing<AdResponseDto>> {
        self.list("/api/ads", query).await
    }

    pub async fn get_ad(&self, id: Uuid) -> ClientResult<AdResponseDto> {
        self.get("/api/ads", id).await
    }

    pub async fn create_ad(&self, dto: &AdInputDto) -> ClientResult<AdResponseDto> {
        self.create("/api/ads", dto).await
    }

    pub async fn update_ad(&self, id: Uuid, dto: &AdInputDto) -> ClientResult<AdResponseDto> {
        self.update("/api/ads", id, dto).await
    }

    pub async fn delete_ad(&self, id: Uuid) -> ClientResult<DeletedDto> {
        self.delete("/api/ads", id).await
    }

    pub async fn toggle_ad(&self, id: Uuid) -> ClientResult<AdResponseDto> {
        self.toggle("/api/ads", id).await
    }

    // -------------------------------------------------------------------------
    // Images
    // -------------------------------------------------------------------------

    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
        folder: ImageFolder,
    ) -> ClientResult<ImageResponseDto> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new()
            .text("folder", folder.to_string())
            .part("file", part);

        self.send_data(self.request(Method::POST, "/api/images/upload").multipart(form))
            .await
    }

    pub async fn upload_image_from_url(
        &self,
        url: &str,
        folder: ImageFolder,
    ) -> ClientResult<ImageResponseDto> {
        let body = UploadImageFromUrlDto {
            url: url.to_string(),
            folder,
        };
        self.send_data(
            self.request(Method::POST, "/api/images/upload-from-url")
                .json(&body),
        )
        .await
    }

    /// Delete a stored image by key (`{folder}/{file}`)
    pub async fn delete_image(&self, key: &str) -> ClientResult<DeleteImageResponseDto> {
        let encoded = key
            .split('/')
            .map(urlencoding::encode)
            .collect::<Vec<_>>()
            .join("/");
        self.send_data(self.request(Method::DELETE, &format!("/api/images/{}", encoded)))
            .await
    }

    // -------------------------------------------------------------------------
    // Plumbing
    // -------------------------------------------------------------------------

    async fn list<T, Q>(&self, path: &str, query: &Q) -> ClientResult<Listing<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let envelope: ApiResponse<Vec<T>> = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        let total = envelope.meta.as_ref().map(|m| m.total);
        let items = envelope.data.unwrap_or_default();
        Ok(Listing {
            total: total.unwrap_or(items.len() as i64),
            items,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, id: Uuid) -> ClientResult<T> {
        self.send_data(self.request(Method::GET, &format!("{}/{}", path, id)))
            .await
    }

    async fn create<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_data(self.request(Method::POST, path).json(body))
            .await
    }

    async fn update<T, B>(&self, path: &str, id: Uuid, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_data(
            self.request(Method::PUT, &format!("{}/{}", path, id))
                .json(body),
        )
        .await
    }

    async fn delete(&self, path: &str, id: Uuid) -> ClientResult<DeletedDto> {
        self.send_data(self.request(Method::DELETE, &format!("{}/{}", path, id)))
            .await
    }

    async fn toggle<T: DeserializeOwned>(&self, path: &str, id: Uuid) -> ClientResult<T> {
        self.send_data(self.request(Method::PATCH, &format!("{}/{}", path, id)))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<ApiResponse<T>> {
        let response = builder.send().await?;
        decode(response).await
    }

    async fn send_data<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        self.send(builder)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("response has no data".to_string()))
    }
}

/// Decode an envelope, turning error statuses and `success: false` into `ClientError::Api`
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<ApiResponse<T>> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        return Err(api_error(status, &bytes));
    }

    let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::InvalidResponse(format!("HTTP {}: {}", status, e)))?;

    if !envelope.success {
        return Err(ClientError::Api {
            status,
            message: envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "Request failed".to_string()),
            details: envelope.details.unwrap_or_default(),
        });
    }

    Ok(envelope)
}

fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ApiResponse<serde_json::Value>>(body) {
        Ok(envelope) => ClientError::Api {
            status,
            message: envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| status.to_string()),
            details: envelope.details.unwrap_or_default(),
        },
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            ClientError::Api {
                status,
                message: if text.is_empty() { status.to_string() } else { text },
                details: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::images::{self, ImageService};
    use crate::modules::storage::MemoryStore;
    use crate::shared::test_helpers::{lazy_pool, with_editor_auth};
    use crate::shared::types::Meta;
    use axum::{
        extract::Query,
        http::HeaderMap,
        routing::{get, post},
        Json, Router,
    };
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Serve a router on an ephemeral local port and return its base URL
    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn category_json(title: &str) -> serde_json::Value {
        serde_json::json!({
            "id": Uuid::new_v4(),
            "title": title,
            "description": "Sun and sand",
            "image": "https://cdn.tourbook.test/categories/beach.jpg",
            "icon": "tree-palm",
            "color": "#0ea5e9",
            "display_order": 0,
            "enabled": true,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        assert!(matches!(
            TourbookClient::new("not a url"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            TourbookClient::new("ftp://tourbook.test"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        let client = TourbookClient::new("http://tourbook.test/").unwrap();
        assert_eq!(client.base_url(), "http://tourbook.test");
        assert_eq!(client.token(), None);
    }

    #[tokio::test]
    async fn test_list_reads_items_and_total() {
        let router = Router::new().route(
            "/api/categories",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("enabled").map(String::as_str), Some("true"));
                assert!(!params.contains_key("search"));
                Json(ApiResponse::success(
                    Some(vec![category_json("Beaches"), category_json("Temples")]),
                    None,
                    Some(Meta { total: 12 }),
                ))
            }),
        );
        let client = TourbookClient::new(&spawn(router).await).unwrap();

        let listing = client
            .list_categories(&CategoryQueryParams {
                page: 1,
                page_size: 2,
                enabled: Some(true),
                search: None,
            })
            .await
            .unwrap();

        assert_eq!(listing.total, 12);
        assert_eq!(listing.items.len(), 2);
        assert_eq!(listing.items[1].title, "Temples");
    }

    #[tokio::test]
    async fn test_sign_in_stores_token_and_sign_out_clears_it() {
        let router = Router::new()
            .route(
                "/api/auth/sign-in",
                post(|| async {
                    Json(serde_json::json!({
                        "success": true,
                        "data": {
                            "token": "tok-123",
                            "expires_at": "2026-12-31T00:00:00Z",
                            "user": {
                                "id": Uuid::nil(),
                                "email": "editor@tourbook.test",
                                "name": "Editor",
                                "role": "editor"
                            }
                        }
                    }))
                }),
            )
            .route(
                "/api/auth/sign-out",
                post(|headers: HeaderMap| async move {
                    assert_eq!(headers["authorization"], "Bearer tok-123");
                    Json(serde_json::json!({ "success": true, "data": { "signed_out": true } }))
                }),
            );
        let mut client = TourbookClient::new(&spawn(router).await).unwrap();

        let session = client.sign_in("editor@tourbook.test", "secret").await.unwrap();
        assert_eq!(session.user.role, "editor");
        assert_eq!(client.token(), Some("tok-123"));

        client.sign_out().await.unwrap();
        assert_eq!(client.token(), None);
    }

    #[tokio::test]
    async fn test_validation_errors_surface_details() {
        let service = Arc::new(crate::features::categories::CategoryService::new(
            lazy_pool(),
            Arc::new(ImageService::new(Arc::new(MemoryStore::new(
                "https://cdn.tourbook.test",
            )))),
        ));
        let router = with_editor_auth(crate::features::categories::routes(service));
        let client = TourbookClient::new(&spawn(router).await).unwrap();

        let dto = CategoryInputDto {
            title: String::new(),
            description: "Sun and sand".to_string(),
            image: "https://cdn.tourbook.test/categories/beach.jpg".to_string(),
            icon: "tree-palm".to_string(),
            color: "#0ea5e9".to_string(),
            display_order: 0,
            enabled: None,
        };
        let err = client.create_category(&dto).await.unwrap_err();

        match err {
            ClientError::Api {
                status, details, ..
            } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(details.iter().any(|d| d.starts_with("title:")));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_mutation_is_api_error() {
        let service = Arc::new(crate::features::categories::CategoryService::new(
            lazy_pool(),
            Arc::new(ImageService::new(Arc::new(MemoryStore::new(
                "https://cdn.tourbook.test",
            )))),
        ));
        let client =
            TourbookClient::new(&spawn(crate::features::categories::routes(service)).await)
                .unwrap();

        let err = client.toggle_category(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_upload_and_delete_image() {
        let store = Arc::new(MemoryStore::new("https://cdn.tourbook.test"));
        let service = Arc::new(ImageService::new(store.clone()));
        let router = with_editor_auth(images::routes(service));
        let client = TourbookClient::new(&spawn(router).await)
            .unwrap()
            .with_token("ignored-by-test-auth");

        let image = client
            .upload_image(
                b"\x89PNG\r\n\x1a\n".to_vec(),
                "beach.png",
                "image/png",
                ImageFolder::Places,
            )
            .await
            .unwrap();
        assert!(image.key.starts_with("places/"));
        assert_eq!(image.content_type, "image/png");
        assert!(store.contains(&image.key));

        let deleted = client.delete_image(&image.key).await.unwrap();
        assert!(deleted.deleted);
        assert!(!store.contains(&image.key));
    }

    #[tokio::test]
    async fn test_non_json_error_body_keeps_text() {
        let router = Router::new().route(
            "/api/ads/{id}",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let client = TourbookClient::new(&spawn(router).await).unwrap();

        let err = client.get_ad(Uuid::new_v4()).await.unwrap_err();
        match err {
            ClientError::Api { status, message, .. } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_invalid_response() {
        let router = Router::new().route("/api/places/{id}", get(|| async { "ok" }));
        let client = TourbookClient::new(&spawn(router).await).unwrap();

        let err = client.get_place(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
