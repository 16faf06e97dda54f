use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Single-message validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = Vec::new();
        flatten_validation_errors(None, &errors, &mut details);
        details.sort();
        AppError::Validation(details)
    }
}

/// Flatten (possibly nested) validator errors into `field: message` strings.
fn flatten_validation_errors(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid ({})", err.code));
                    out.push(format!("{}: {}", path, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                flatten_validation_errors(Some(&path), inner, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let item_path = format!("{}[{}]", path, index);
                    flatten_validation_errors(Some(&item_path), inner, out);
                }
            }
        }
    }
}

/// Map Postgres constraint violations to client-facing errors.
///
/// 23505 (unique) becomes a conflict, 23503 (foreign key) a bad request.
pub fn map_db_error(e: sqlx::Error, conflict_message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::Conflict(conflict_message.to_string());
        }
        if db_err.code().as_deref() == Some("23503") {
            return AppError::BadRequest("Referenced record does not exist".to_string());
        }
    }
    AppError::Database(e)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(ref details) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(details.clone()),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::Storage(ref msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
        };

        let body = Json(ApiResponse::<()>::error(error, details));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Inner {
        #[validate(range(min = -90.0, max = 90.0, message = "lat out of range"))]
        lat: f64,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(min = 1, message = "title is required"))]
        title: String,
        #[validate(nested)]
        location: Inner,
    }

    #[test]
    fn test_validation_errors_are_flattened_with_paths() {
        let dto = Outer {
            title: String::new(),
            location: Inner { lat: 120.0 },
        };
        let err: AppError = dto.validate().unwrap_err().into();

        match err {
            AppError::Validation(details) => {
                assert_eq!(
                    details,
                    vec![
                        "location.lat: lat out of range".to_string(),
                        "title: title is required".to_string(),
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::validation("x").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
