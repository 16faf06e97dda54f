use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::types::{
    default_page, default_page_size, page_limit, page_offset, search_pattern,
};
use crate::shared::validation::{validate_not_blank, HEX_COLOR_REGEX, ICON_KEY_REGEX};

/// Request body for creating or replacing a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryInputDto {
    #[validate(
        length(min = 1, max = 100, message = "must be 1-100 characters"),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Beaches")]
    pub title: String,

    #[validate(
        length(min = 1, max = 1000, message = "must be 1-1000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub description: String,

    /// Cover image URL
    #[validate(url(message = "must be a valid URL"))]
    pub image: String,

    /// Icon key, e.g. "tree-palm"
    #[validate(
        length(max = 50, message = "must be at most 50 characters"),
        regex(path = *ICON_KEY_REGEX, message = "must be a lowercase kebab-case icon key")
    )]
    #[schema(example = "tree-palm")]
    pub icon: String,

    /// `#RRGGBB`
    #[validate(regex(path = *HEX_COLOR_REGEX, message = "must be a #RRGGBB color"))]
    #[schema(example = "#0ea5e9")]
    pub color: String,

    #[serde(default)]
    pub display_order: i32,

    /// Defaults to true on create; omitted on replace keeps the current value
    pub enabled: Option<bool>,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub icon: String,
    pub color: String,
    pub display_order: i32,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            image: c.image,
            icon: c.icon,
            color: c.color,
            display_order: c.display_order,
            enabled: c.enabled,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Query params for listing categories
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct CategoryQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Filter by enabled flag
    pub enabled: Option<bool>,
    /// Case-insensitive search in title and description
    pub search: Option<String>,
}

impl CategoryQueryParams {
    pub fn offset(&self) -> i64 {
        page_offset(self.page, self.page_size)
    }
    pub fn limit(&self) -> i64 {
        page_limit(self.page_size)
    }
    /// `ILIKE` pattern for the search term, if any
    pub fn search_pattern(&self) -> Option<String> {
        search_pattern(self.search.as_deref())
    }
}
