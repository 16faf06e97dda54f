use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::ads::models::Ad;
use crate::shared::types::{default_page, default_page_size, page_limit, page_offset};
use crate::shared::validation::{
    empty_string_as_none, validate_image_urls, validate_not_blank, PHONE_REGEX,
};

/// Request body for creating or replacing an ad
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdInputDto {
    pub place_id: Uuid,

    #[validate(
        length(min = 1, max = 150, message = "must be 1-150 characters"),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Sunset Dinner Cruise")]
    pub title: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub contact_name: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(
        length(max = 20, message = "must be at most 20 characters"),
        regex(path = *PHONE_REGEX, message = "must be a valid phone number")
    )]
    #[schema(example = "+62 361 555 123")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(url(message = "must be a valid URL"))]
    pub website: Option<String>,

    /// WhatsApp number
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(
        length(max = 20, message = "must be at most 20 characters"),
        regex(path = *PHONE_REGEX, message = "must be a valid phone number")
    )]
    pub whatsapp: Option<String>,

    #[serde(default)]
    #[validate(
        length(max = 5, message = "must have at most 5 images"),
        custom(function = "validate_image_urls")
    )]
    pub images: Vec<String>,

    /// Defaults to true on create; omitted on replace keeps the current value
    pub enabled: Option<bool>,
}

/// Response DTO for ad
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdResponseDto {
    pub id: Uuid,
    pub place_id: Uuid,
    pub title: String,
    pub description: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub whatsapp: Option<String>,
    pub images: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ad> for AdResponseDto {
    fn from(a: Ad) -> Self {
        Self {
            id: a.id,
            place_id: a.place_id,
            title: a.title,
            description: a.description,
            contact_name: a.contact_name,
            phone: a.phone,
            email: a.email,
            website: a.website,
            whatsapp: a.whatsapp,
            images: a.images,
            enabled: a.enabled,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Query params for listing ads
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct AdQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Only ads shown on this place
    pub place_id: Option<Uuid>,
    /// Filter by enabled flag
    pub enabled: Option<bool>,
}

impl AdQueryParams {
    pub fn offset(&self) -> i64 {
        page_offset(self.page, self.page_size)
    }
    pub fn limit(&self) -> i64 {
        page_limit(self.page_size)
    }
}
