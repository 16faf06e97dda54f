//! Role-based authorization guards.
//!
//! The session middleware stores an [`AuthenticatedUser`] in request
//! extensions when a valid session token is presented. These guards read it
//! and reject with 401 when absent or 403 when the role is insufficient.
//!
//! Roles: `admin` (everything) > `editor` (tour content and images).

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn authenticated(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

/// Guard for admin-only operations.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for content mutations (categories, destinations, places, ads, images).
///
/// Allows users with "admin" or "editor" roles.
pub struct RequireEditor(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.can_edit_content() {
            return Err(AppError::Forbidden("Editor access required".to_string()));
        }

        Ok(RequireEditor(user.clone()))
    }
}
