use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::destinations::models::Destination;
use crate::shared::types::{
    default_page, default_page_size, page_limit, page_offset, search_pattern,
};
use crate::shared::validation::{
    validate_image_urls, validate_no_blank_items, validate_not_blank, validate_rating,
};

/// Request body for creating or replacing a destination
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DestinationInputDto {
    pub category_id: Uuid,

    #[validate(
        length(min = 1, max = 150, message = "must be 1-150 characters"),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Kuta Beach")]
    pub title: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,

    /// 0.0 to 5.0, one decimal place
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_rating"))]
    #[schema(value_type = f64, example = 4.5)]
    pub rating: Decimal,

    /// Suggested visit length, e.g. "2-3 hours"
    #[validate(
        length(min = 1, max = 50, message = "must be 1-50 characters"),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "2-3 hours")]
    pub duration: String,

    #[serde(default)]
    #[validate(
        length(max = 10, message = "must have at most 10 highlights"),
        custom(function = "validate_no_blank_items")
    )]
    pub highlights: Vec<String>,

    #[validate(
        length(min = 1, max = 10, message = "must have 1-10 images"),
        custom(function = "validate_image_urls")
    )]
    pub images: Vec<String>,

    /// Defaults to true on create; omitted on replace keeps the current value
    pub enabled: Option<bool>,
}

/// Response DTO for destination
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DestinationResponseDto {
    pub id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub rating: Decimal,
    pub duration: String,
    pub highlights: Vec<String>,
    pub images: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Destination> for DestinationResponseDto {
    fn from(d: Destination) -> Self {
        Self {
            id: d.id,
            category_id: d.category_id,
            title: d.title,
            description: d.description,
            rating: d.rating,
            duration: d.duration,
            highlights: d.highlights,
            images: d.images,
            enabled: d.enabled,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

/// Query params for listing destinations
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct DestinationQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Only destinations in this category
    pub category_id: Option<Uuid>,
    /// Filter by enabled flag
    pub enabled: Option<bool>,
    /// Case-insensitive search in title and description
    pub search: Option<String>,
}

impl DestinationQueryParams {
    pub fn offset(&self) -> i64 {
        page_offset(self.page, self.page_size)
    }
    pub fn limit(&self) -> i64 {
        page_limit(self.page_size)
    }
    pub fn search_pattern(&self) -> Option<String> {
        search_pattern(self.search.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::{Paragraph, Words};
    use fake::Fake;
    use std::str::FromStr;

    fn valid_input() -> DestinationInputDto {
        let highlights: Vec<String> = Words(2..4).fake();
        DestinationInputDto {
            category_id: Uuid::new_v4(),
            title: "Kuta Beach".to_string(),
            description: Paragraph(1..3).fake(),
            rating: Decimal::from_str("4.5").unwrap(),
            duration: "2-3 hours".to_string(),
            highlights,
            images: vec!["https://cdn.tourbook.test/destinations/kuta.jpg".to_string()],
            enabled: None,
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_rating_out_of_range() {
        let dto = DestinationInputDto {
            rating: Decimal::from_str("5.5").unwrap(),
            ..valid_input()
        };
        assert!(dto.validate().unwrap_err().field_errors().contains_key("rating"));
    }

    #[test]
    fn test_image_count_bounds() {
        let none = DestinationInputDto {
            images: vec![],
            ..valid_input()
        };
        assert!(none.validate().unwrap_err().field_errors().contains_key("images"));

        let too_many = DestinationInputDto {
            images: (0..11)
                .map(|i| format!("https://cdn.tourbook.test/destinations/{}.jpg", i))
                .collect(),
            ..valid_input()
        };
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_blank_highlight_rejected() {
        let dto = DestinationInputDto {
            highlights: vec!["Sunset".to_string(), " ".to_string()],
            ..valid_input()
        };
        assert!(dto
            .validate()
            .unwrap_err()
            .field_errors()
            .contains_key("highlights"));
    }

    #[test]
    fn test_rating_serializes_as_number() {
        let json = serde_json::json!({
            "category_id": Uuid::nil(),
            "title": "Ubud",
            "description": "Rice terraces",
            "rating": 4.7,
            "duration": "Half day",
            "images": ["https://cdn.tourbook.test/destinations/ubud.jpg"]
        });
        let dto: DestinationInputDto = serde_json::from_value(json).unwrap();
        assert_eq!(dto.rating, Decimal::from_str("4.7").unwrap());
        assert!(dto.highlights.is_empty());

        let back = serde_json::to_value(&dto).unwrap();
        assert_eq!(back["rating"], 4.7);
    }
}
