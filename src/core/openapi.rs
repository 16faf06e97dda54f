use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::core::config::SessionConfig;
use crate::features::ads::{dtos as ads_dtos, handlers as ads_handlers};
use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::destinations::{
    dtos as destinations_dtos, handlers as destinations_handlers,
};
use crate::features::images::{dtos as images_dtos, handlers as images_handlers, ImageFolder};
use crate::features::places::{dtos as places_dtos, handlers as places_handlers};
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::sign_in,
        auth_handlers::sign_out,
        auth_handlers::get_session,
        auth_handlers::create_user,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        categories_handlers::toggle_category,
        // Destinations
        destinations_handlers::list_destinations,
        destinations_handlers::get_destination,
        destinations_handlers::create_destination,
        destinations_handlers::update_destination,
        destinations_handlers::delete_destination,
        destinations_handlers::toggle_destination,
        // Places
        places_handlers::list_places,
        places_handlers::get_place,
        places_handlers::create_place,
        places_handlers::update_place,
        places_handlers::delete_place,
        places_handlers::toggle_place,
        // Ads
        ads_handlers::list_ads,
        ads_handlers::get_ad,
        ads_handlers::create_ad,
        ads_handlers::update_ad,
        ads_handlers::delete_ad,
        ads_handlers::toggle_ad,
        // Images
        images_handlers::upload_image,
        images_handlers::upload_image_from_url,
        images_handlers::delete_image,
    ),
    components(
        schemas(
            // Shared
            Meta,
            DeletedDto,
            ApiResponse<DeletedDto>,
            // Auth
            auth_dtos::SignInRequestDto,
            auth_dtos::CreateUserDto,
            auth_dtos::UserRoleDto,
            auth_dtos::AuthUserDto,
            auth_dtos::SessionResponseDto,
            auth_dtos::SignOutResponseDto,
            ApiResponse<auth_dtos::AuthUserDto>,
            ApiResponse<auth_dtos::SessionResponseDto>,
            ApiResponse<auth_dtos::SignOutResponseDto>,
            // Categories
            categories_dtos::CategoryInputDto,
            categories_dtos::CategoryResponseDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            // Destinations
            destinations_dtos::DestinationInputDto,
            destinations_dtos::DestinationResponseDto,
            ApiResponse<destinations_dtos::DestinationResponseDto>,
            ApiResponse<Vec<destinations_dtos::DestinationResponseDto>>,
            // Places
            places_dtos::LocationDto,
            places_dtos::PlaceInputDto,
            places_dtos::PlaceResponseDto,
            ApiResponse<places_dtos::PlaceResponseDto>,
            ApiResponse<Vec<places_dtos::PlaceResponseDto>>,
            // Ads
            ads_dtos::AdInputDto,
            ads_dtos::AdResponseDto,
            ApiResponse<ads_dtos::AdResponseDto>,
            ApiResponse<Vec<ads_dtos::AdResponseDto>>,
            // Images
            ImageFolder,
            images_dtos::UploadImageDto,
            images_dtos::UploadImageFromUrlDto,
            images_dtos::ImageResponseDto,
            images_dtos::DeleteImageResponseDto,
            ApiResponse<images_dtos::ImageResponseDto>,
            ApiResponse<images_dtos::DeleteImageResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Email/password sign-in and panel accounts"),
        (name = "categories", description = "Tour categories shown on the book's categories page"),
        (name = "destinations", description = "Destinations within a category"),
        (name = "places", description = "Points of interest with map coordinates"),
        (name = "ads", description = "Sponsored listings attached to places"),
        (name = "images", description = "Image upload and deletion in object storage"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Tourbook API",
        version = "0.1.0",
        description = "API documentation for Tourbook",
    )
)]
pub struct ApiDoc;

/// Adds the session token schemes (bearer header and cookie) to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    SessionConfig::DEFAULT_COOKIE_NAME,
                ))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
