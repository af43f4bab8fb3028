use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::accounts::{dtos as accounts_dtos, handlers::profile_handler};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::favorites::{dtos as favorites_dtos, handlers as favorites_handlers};
use crate::features::listings::{
    dtos as listings_dtos, handlers as listings_handlers, models as listings_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Listings
        listings_handlers::search_listings,
        listings_handlers::get_listing,
        listings_handlers::home,
        listings_handlers::create_listing,
        listings_handlers::update_listing,
        listings_handlers::delete_listing,
        listings_handlers::my_listings,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        // Favorites
        favorites_handlers::toggle_favorite,
        favorites_handlers::list_favorites,
        favorites_handlers::remove_favorite,
        // Accounts
        profile_handler::get_profile,
        profile_handler::update_profile,
        profile_handler::get_public_profile,
    ),
    components(
        schemas(
            Meta,
            // Listings
            listings_models::ListingStatus,
            listings_dtos::ListingSummaryDto,
            listings_dtos::ListingCardDto,
            listings_dtos::ListingImageDto,
            listings_dtos::ListingDetailDto,
            listings_dtos::NewImageDto,
            listings_dtos::CreateListingDto,
            listings_dtos::UpdateListingDto,
            listings_dtos::HomeDto,
            ApiResponse<Vec<listings_dtos::ListingCardDto>>,
            ApiResponse<Vec<listings_dtos::ListingSummaryDto>>,
            ApiResponse<listings_dtos::ListingDetailDto>,
            ApiResponse<listings_dtos::HomeDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CategoryWithCountDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_handlers::CategoryListing,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            // Favorites
            favorites_dtos::ToggleFavoriteForm,
            favorites_dtos::ToggleFavoriteResponse,
            favorites_dtos::ToggleFavoriteError,
            favorites_dtos::FavoriteDto,
            ApiResponse<Vec<favorites_dtos::FavoriteDto>>,
            // Accounts
            accounts_dtos::ProfileStatsDto,
            accounts_dtos::ProfileDto,
            accounts_dtos::PublicProfileDto,
            accounts_dtos::UpdateProfileDto,
            ApiResponse<accounts_dtos::ProfileDto>,
            ApiResponse<accounts_dtos::PublicProfileDto>,
        )
    ),
    tags(
        (name = "listings", description = "Classified listings: search, detail, seller management"),
        (name = "categories", description = "Listing categories; writes are admin only"),
        (name = "favorites", description = "Saved listings"),
        (name = "accounts", description = "Own and public user profiles"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Micu Market API",
        version = "0.1.0",
        description = "API documentation for the Micu classifieds marketplace",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_marketplace_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/listings",
            "/api/listings/{slug}",
            "/api/home",
            "/api/favorites/toggle",
            "/api/admin/categories/{id}",
            "/api/users/{username}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Staging".to_string(),
            version: "9.9.9".to_string(),
            description: "staging build".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Staging");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
