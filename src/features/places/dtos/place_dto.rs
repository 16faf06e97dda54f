use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::places::models::Place;
use crate::shared::types::{
    default_page, default_page_size, page_limit, page_offset, search_pattern,
};
use crate::shared::validation::{empty_string_as_none, validate_image_urls, validate_not_blank};

/// Map coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct LocationDto {
    #[validate(range(min = -90.0, max = 90.0, message = "must be between -90 and 90"))]
    #[schema(example = -8.7183)]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "must be between -180 and 180"))]
    #[schema(example = 115.1686)]
    pub lng: f64,
}

/// Request body for creating or replacing a place
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PlaceInputDto {
    pub destination_id: Uuid,

    #[validate(
        length(min = 1, max = 150, message = "must be 1-150 characters"),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Kuta Surf School")]
    pub name: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 300, message = "must be at most 300 characters"))]
    pub address: Option<String>,

    #[validate(nested)]
    pub location: LocationDto,

    #[validate(
        length(min = 1, max = 10, message = "must have 1-10 images"),
        custom(function = "validate_image_urls")
    )]
    pub images: Vec<String>,

    /// Defaults to true on create; omitted on replace keeps the current value
    pub enabled: Option<bool>,
}

/// Response DTO for place
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaceResponseDto {
    pub id: Uuid,
    pub destination_id: Uuid,
    pub name: String,
    pub description: String,
    pub address: Option<String>,
    pub location: LocationDto,
    pub images: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Place> for PlaceResponseDto {
    fn from(p: Place) -> Self {
        Self {
            id: p.id,
            destination_id: p.destination_id,
            name: p.name,
            description: p.description,
            address: p.address,
            location: LocationDto {
                lat: p.latitude,
                lng: p.longitude,
            },
            images: p.images,
            enabled: p.enabled,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Query params for listing places
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct PlaceQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Only places of this destination
    pub destination_id: Option<Uuid>,
    /// Only places whose destination belongs to this category
    pub category_id: Option<Uuid>,
    /// Filter by enabled flag
    pub enabled: Option<bool>,
    /// Case-insensitive search in name, description and address
    pub search: Option<String>,
}

impl PlaceQueryParams {
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
    use fake::faker::address::en::StreetName;
    use fake::Fake;

    fn valid_input() -> PlaceInputDto {
        PlaceInputDto {
            destination_id: Uuid::new_v4(),
            name: "Kuta Surf School".to_string(),
            description: "Lessons for beginners".to_string(),
            address: Some(StreetName().fake()),
            location: LocationDto {
                lat: -8.7183,
                lng: 115.1686,
            },
            images: vec!["https://cdn.tourbook.test/places/surf.jpg".to_string()],
            enabled: None,
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_location_out_of_range_is_reported_by_path() {
        let dto = PlaceInputDto {
            location: LocationDto {
                lat: 91.0,
                lng: -181.0,
            },
            ..valid_input()
        };
        let err = crate::core::error::AppError::from(dto.validate().unwrap_err());
        match err {
            crate::core::error::AppError::Validation(details) => {
                assert_eq!(
                    details,
                    vec![
                        "location.lat: must be between -90 and 90".to_string(),
                        "location.lng: must be between -180 and 180".to_string(),
                    ]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_blank_address_becomes_none() {
        let dto: PlaceInputDto = serde_json::from_value(serde_json::json!({
            "destination_id": Uuid::nil(),
            "name": "Pier",
            "description": "Boats",
            "address": "",
            "location": { "lat": 0.0, "lng": 0.0 },
            "images": ["https://cdn.tourbook.test/places/pier.jpg"]
        }))
        .unwrap();
        assert_eq!(dto.address, None);
    }

    #[test]
    fn test_response_nests_location() {
        let now = Utc::now();
        let dto = PlaceResponseDto::from(Place {
            id: Uuid::nil(),
            destination_id: Uuid::nil(),
            name: "Pier".to_string(),
            description: "Boats".to_string(),
            address: None,
            latitude: 1.5,
            longitude: 2.5,
            images: vec![],
            enabled: true,
            created_at: now,
            updated_at: now,
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["location"], serde_json::json!({ "lat": 1.5, "lng": 2.5 }));
    }
}
