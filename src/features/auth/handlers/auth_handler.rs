use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    AuthUserDto, CreateUserDto, SessionResponseDto, SignInRequestDto, SignOutResponseDto,
};
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::session_service::ClientInfo;
use crate::features::auth::services::SessionService;
use crate::shared::types::ApiResponse;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::AppendHeaders,
    Json,
};
use std::sync::Arc;
use validator::Validate;

type SetCookie = AppendHeaders<[(header::HeaderName, String); 1]>;

/// Sign in with email and password
///
/// Returns the session token and also sets it as an HttpOnly cookie.
#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    request_body = SignInRequestDto,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<SessionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn sign_in(
    State(service): State<Arc<SessionService>>,
    headers: HeaderMap,
    AppJson(dto): AppJson<SignInRequestDto>,
) -> Result<(SetCookie, Json<ApiResponse<SessionResponseDto>>)> {
    dto.validate()?;

    let session = service
        .sign_in(dto, ClientInfo::from_headers(&headers))
        .await?;
    let cookie = service.session_cookie(&session.token);

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(ApiResponse::success(
            Some(session),
            Some("Signed in".to_string()),
            None,
        )),
    ))
}

/// Sign out of the current session
#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    responses(
        (status = 200, description = "Signed out", body = ApiResponse<SignOutResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn sign_out(
    user: AuthenticatedUser,
    State(service): State<Arc<SessionService>>,
) -> Result<(SetCookie, Json<ApiResponse<SignOutResponseDto>>)> {
    service.sign_out(user.session_id).await?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, service.clear_cookie())]),
        Json(ApiResponse::success(
            Some(SignOutResponseDto { signed_out: true }),
            None,
            None,
        )),
    ))
}

/// Get the user behind the current session
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Current session user", body = ApiResponse<AuthUserDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn get_session(user: AuthenticatedUser) -> Result<Json<ApiResponse<AuthUserDto>>> {
    Ok(Json(ApiResponse::success(
        Some(AuthUserDto::from(user)),
        None,
        None,
    )))
}

/// Create a panel account (admin only)
#[utoipa::path(
    post,
    path = "/api/auth/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<AuthUserDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn create_user(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<SessionService>>,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<AuthUserDto>>)> {
    dto.validate()?;

    let user = service.create_user(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user), None, None)),
    ))
}
