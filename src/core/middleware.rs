use crate::features::auth::services::session_service::extract_session_token;
use crate::features::auth::SessionService;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// MakeSpan that records the request id alongside method and uri
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    if allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(Any);
    }

    // Explicit origins so the admin panel can send the session cookie
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::list(origins))
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let supplied = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Basic "))
                .and_then(|encoded| BASE64_STANDARD.decode(encoded).ok())
                .and_then(|decoded| String::from_utf8(decoded).ok());

            if supplied.as_deref() == Some(credentials.as_str()) {
                return Ok(next.run(req).await);
            }

            Err((
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"Swagger UI\"")],
                Body::from("Unauthorized"),
            )
                .into_response())
        })
    }
}

/// Resolve the session token (bearer header or cookie) into an
/// `AuthenticatedUser` request extension.
///
/// Never rejects: anonymous requests pass through and the route guards decide.
pub async fn session_middleware(
    State(sessions): State<Arc<SessionService>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(req.headers(), sessions.cookie_name()) {
        match sessions.resolve(&token).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => {
                tracing::debug!("Ignoring unknown or expired session token");
            }
            Err(e) => {
                tracing::warn!("Session lookup failed, treating request as anonymous: {}", e);
            }
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn, routing::get, Router};
    use axum_test::TestServer;

    fn swagger_router() -> Router {
        Router::new()
            .route("/docs", get(|| async { "docs" }))
            .layer(from_fn(basic_auth_middleware(Arc::new(
                "admin:secret".to_string(),
            ))))
    }

    #[tokio::test]
    async fn test_basic_auth_rejects_missing_credentials() {
        let server = TestServer::new(swagger_router()).unwrap();
        let response = server.get("/docs").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.header(header::WWW_AUTHENTICATE),
            "Basic realm=\"Swagger UI\""
        );
    }

    #[tokio::test]
    async fn test_basic_auth_accepts_valid_credentials() {
        let server = TestServer::new(swagger_router()).unwrap();
        let encoded = BASE64_STANDARD.encode("admin:secret");
        let response = server
            .get("/docs")
            .add_header(header::AUTHORIZATION, format!("Basic {}", encoded))
            .await;
        response.assert_status_ok();
        response.assert_text("docs");
    }

    #[test]
    fn test_request_ids_are_uuid_v7() {
        let mut maker = MakeRequestUuid;
        let request = axum::http::Request::new(());
        let id = maker.make_request_id(&request).unwrap();
        let parsed = Uuid::parse_str(id.header_value().to_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }
}
