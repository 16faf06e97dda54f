use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::{AuthenticatedUser, User};

/// Request DTO for email/password sign-in
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignInRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Role assignable to new accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRoleDto {
    Admin,
    #[default]
    Editor,
}

impl UserRoleDto {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRoleDto::Admin => "admin",
            UserRoleDto::Editor => "editor",
        }
    }
}

/// Request DTO for creating a panel account (admin only)
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: UserRoleDto,
}

/// User info included in session responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<User> for AuthUserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
        }
    }
}

impl From<AuthenticatedUser> for AuthUserDto {
    fn from(u: AuthenticatedUser) -> Self {
        Self {
            id: u.user_id,
            email: u.email,
            name: u.name,
            role: u.role,
        }
    }
}

/// Response DTO for a freshly created session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponseDto {
    /// Opaque session token; send as `Authorization: Bearer <token>` or via the session cookie
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUserDto,
}

/// Response DTO for sign-out
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignOutResponseDto {
    pub signed_out: bool,
}
