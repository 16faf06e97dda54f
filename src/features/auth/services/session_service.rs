use axum::http::{header, HeaderMap};
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::SessionConfig;
use crate::core::error::{map_db_error, AppError, Result};
use crate::features::auth::dtos::{AuthUserDto, CreateUserDto, SessionResponseDto, SignInRequestDto};
use crate::features::auth::model::{AuthenticatedUser, Session, User};
use crate::features::auth::password;
use crate::shared::constants::ROLE_ADMIN;

/// Client metadata recorded alongside a new session
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Extract forwarded IP and user agent from request headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip_address = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        Self {
            ip_address,
            user_agent,
        }
    }
}

/// Service for database-backed sessions and panel accounts
pub struct SessionService {
    pool: PgPool,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(pool: PgPool, config: SessionConfig) -> Self {
        Self { pool, config }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// `Set-Cookie` value carrying a new session token
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
            self.config.cookie_name,
            token,
            self.config.ttl.as_secs(),
            if self.config.cookie_secure { "; Secure" } else { "" }
        )
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
            self.config.cookie_name,
            if self.config.cookie_secure { "; Secure" } else { "" }
        )
    }

    /// Verify credentials and open a new session
    pub async fn sign_in(&self, dto: SignInRequestDto, client: ClientInfo) -> Result<SessionResponseDto> {
        let email = dto.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());
        let user = user.ok_or_else(invalid)?;

        let password_hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || {
            password::verify_password(&dto.password, &password_hash)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;

        if !verified {
            debug!("Rejected sign-in for {}", email);
            return Err(invalid());
        }

        let token = password::generate_session_token();
        let ttl = chrono::Duration::from_std(self.config.ttl)
            .map_err(|e| AppError::Internal(format!("Invalid session TTL: {}", e)))?;
        let expires_at = Utc::now() + ttl;

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, expires_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, token_hash, expires_at, ip_address, user_agent, created_at
            "#,
        )
        .bind(user.id)
        .bind(password::hash_session_token(&token))
        .bind(expires_at)
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .fetch_one(&self.pool)
        .await?;

        info!("Session opened: user_id={}, session_id={}", user.id, session.id);

        Ok(SessionResponseDto {
            token,
            expires_at: session.expires_at,
            user: AuthUserDto::from(user),
        })
    }

    /// Resolve a raw token into the owning user, ignoring expired sessions
    pub async fn resolve(&self, token: &str) -> Result<Option<AuthenticatedUser>> {
        let user = sqlx::query_as::<_, AuthenticatedUser>(
            r#"
            SELECT u.id AS user_id, s.id AS session_id, u.email, u.name, u.role
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(password::hash_session_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Close a session
    pub async fn sign_out(&self, session_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        info!("Session closed: session_id={}", session_id);
        Ok(())
    }

    /// Create a panel account
    pub async fn create_user(&self, dto: CreateUserDto) -> Result<AuthUserDto> {
        let email = dto.email.trim().to_lowercase();
        let password_hash = hash_blocking(dto.password).await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(&email)
        .bind(dto.name.trim())
        .bind(password_hash)
        .bind(dto.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A user with this email already exists"))?;

        info!("User created: id={}, role={}", user.id, user.role);
        Ok(AuthUserDto::from(user))
    }

    /// Create the configured bootstrap admin if no account uses that email yet.
    ///
    /// Returns `true` when an account was created.
    pub async fn ensure_bootstrap_admin(&self) -> Result<bool> {
        let Some((email, plain_password)) = self.config.bootstrap_admin() else {
            return Ok(false);
        };

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            return Ok(false);
        }

        let password_hash = hash_blocking(plain_password.to_string()).await?;
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, name, password_hash, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(email)
        .bind(&self.config.admin_name)
        .bind(password_hash)
        .bind(ROLE_ADMIN)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired sessions, returning how many were removed
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

async fn hash_blocking(plain: String) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Pull the session token from `Authorization: Bearer` or the named cookie
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::lazy_pool;
    use axum::http::HeaderValue;
    use std::time::Duration;

    fn config() -> SessionConfig {
        SessionConfig {
            ttl: Duration::from_secs(2 * 3600),
            cookie_name: "tourbook_session".to_string(),
            cookie_secure: true,
            admin_email: Some("admin@tourbook.test".to_string()),
            admin_password: Some("change-me-please".to_string()),
            admin_name: "Administrator".to_string(),
        }
    }

    fn lazy_service() -> SessionService {
        SessionService::new(lazy_pool(), config())
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(
            extract_session_token(&headers, "tourbook_session"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_extract_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; tourbook_session=tok42; other=1"),
        );
        assert_eq!(
            extract_session_token(&headers, "tourbook_session"),
            Some("tok42".to_string())
        );
    }

    #[test]
    fn test_extract_prefers_bearer_and_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert_eq!(extract_session_token(&headers, "tourbook_session"), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("tourbook_session="));
        assert_eq!(extract_session_token(&headers, "tourbook_session"), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer fromheader"));
        headers.insert(header::COOKIE, HeaderValue::from_static("tourbook_session=fromcookie"));
        assert_eq!(
            extract_session_token(&headers, "tourbook_session"),
            Some("fromheader".to_string())
        );
    }

    #[test]
    fn test_client_info_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.7, 172.16.0.1"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("tourbook-test"));
        let info = ClientInfo::from_headers(&headers);
        assert_eq!(info.ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(info.user_agent.as_deref(), Some("tourbook-test"));
    }

    #[tokio::test]
    async fn test_cookies() {
        let service = lazy_service();
        assert_eq!(
            service.session_cookie("tok"),
            "tourbook_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=7200; Secure"
        );
        assert_eq!(
            service.clear_cookie(),
            "tourbook_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure"
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    async fn test_sign_in_resolve_and_sign_out(pool: PgPool) {
        let service = SessionService::new(pool, config());
        assert!(service.ensure_bootstrap_admin().await.unwrap());
        assert!(!service.ensure_bootstrap_admin().await.unwrap());

        let bad = service
            .sign_in(
                SignInRequestDto {
                    email: "admin@tourbook.test".to_string(),
                    password: "wrong-password".to_string(),
                },
                ClientInfo::default(),
            )
            .await;
        assert!(matches!(bad, Err(AppError::Unauthorized(_))));

        let session = service
            .sign_in(
                SignInRequestDto {
                    email: "Admin@Tourbook.test".to_string(),
                    password: "change-me-please".to_string(),
                },
                ClientInfo::default(),
            )
            .await
            .unwrap();
        assert_eq!(session.user.role, "admin");

        let user = service.resolve(&session.token).await.unwrap().unwrap();
        assert_eq!(user.email, "admin@tourbook.test");

        service.sign_out(user.session_id).await.unwrap();
        assert!(service.resolve(&session.token).await.unwrap().is_none());
    }
}
