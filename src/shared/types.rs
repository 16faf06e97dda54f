use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Envelope returned by every endpoint: `{success, data?, message?, error?, details?, meta?}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Field-level validation messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

// =============================================================================
// PAGINATION
// =============================================================================

pub fn default_page() -> i64 {
    1
}

pub fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// `page_size` clamped to `1..=MAX_PAGE_SIZE`
pub fn page_limit(page_size: i64) -> i64 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

/// SQL OFFSET for a 1-indexed page; saturates instead of overflowing on huge pages
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(page_limit(page_size))
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            error: None,
            details: None,
            meta,
        }
    }

    pub fn error(error: String, details: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: None,
            error: Some(error),
            details,
            meta: None,
        }
    }
}

/// Wrap a trimmed, non-empty search term in `%` with LIKE wildcards escaped
pub fn search_pattern(search: Option<&str>) -> Option<String> {
    let term = search?.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

/// Body returned by delete endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedDto {
    pub id: Uuid,
    pub deleted: bool,
}
