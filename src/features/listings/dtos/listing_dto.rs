use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::features::categories::dtos::CategoryWithCountDto;
use crate::features::listings::models::{ListingImage, ListingRow, ListingStatus};

/// Query params for listing search.
///
/// Every value is taken as a raw string so malformed input can be ignored
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingSearchQuery {
    /// Exact seller username
    pub seller: Option<String>,
    /// Category slug or numeric id; includes all subcategories
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// Case-insensitive substring of the city
    pub city: Option<String>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    /// `-created_at` (default), `created_at`, `price`, `-price`, `title`, `-title`
    pub sort: Option<String>,
    pub page: Option<String>,
}

/// Query params for the caller's own listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MyListingsQuery {
    /// `draft`, `active`, `sold` or `removed`; anything else lists every status
    pub status: Option<String>,
    pub page: Option<String>,
}

/// Compact listing representation used in result lists
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingSummaryDto {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[schema(value_type = String, example = "500.00")]
    pub price: Decimal,
    pub city: String,
    pub category_id: i64,
    pub category_name: String,
    pub category_slug: String,
    pub seller: String,
    pub status: ListingStatus,
    pub views_count: i64,
    pub is_featured: bool,
    pub primary_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ListingRow> for ListingSummaryDto {
    fn from(row: ListingRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            price: row.price,
            city: row.city,
            category_id: row.category_id,
            category_name: row.category_name,
            category_slug: row.category_slug,
            seller: row.owner_username,
            status: row.status,
            views_count: row.views_count,
            is_featured: row.is_featured,
            primary_image: row.primary_image,
            created_at: row.created_at,
        }
    }
}

/// Listing summary annotated with the viewer's favorite state
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingCardDto {
    #[serde(flatten)]
    pub listing: ListingSummaryDto,
    /// Always false for anonymous viewers
    pub is_favorited: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingImageDto {
    pub id: i64,
    pub image: String,
    pub alt_text: String,
}

impl From<ListingImage> for ListingImageDto {
    fn from(image: ListingImage) -> Self {
        Self {
            id: image.id,
            image: image.image,
            alt_text: image.alt_text,
        }
    }
}

/// Full listing as shown on its own page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingDetailDto {
    #[serde(flatten)]
    pub listing: ListingSummaryDto,
    pub description: String,
    pub updated_at: DateTime<Utc>,
    pub images: Vec<ListingImageDto>,
    pub is_favorited: bool,
    pub is_owner: bool,
    /// Other active listings from the same category, newest first
    pub similar: Vec<ListingCardDto>,
}

/// Image reference attached to a listing
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewImageDto {
    /// Storage key or URL of the uploaded blob
    #[validate(length(min = 1, max = 500))]
    pub image: String,
    /// Defaults to "Image for <title>"
    #[validate(length(max = 200))]
    pub alt_text: Option<String>,
}

/// Whole units a NUMERIC(12, 2) price column can hold
const MAX_PRICE_UNITS: i64 = 10_000_000_000;

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("price_negative"));
    }
    if *price >= Decimal::new(MAX_PRICE_UNITS, 0) {
        return Err(ValidationError::new("price_too_large")
            .with_message("Price must be below 10000000000".into()));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("price_precision")
            .with_message("Price must have at most 2 decimal places".into()));
    }
    Ok(())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Request DTO for creating a listing
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateListingDto {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "500.00")]
    pub price: Decimal,
    #[validate(custom(function = "validate_not_blank"), length(max = 100))]
    pub city: String,
    pub category_id: i64,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<NewImageDto>,
}

impl CreateListingDto {
    /// Trim surrounding whitespace so length checks see the stored value
    pub fn trimmed(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.city = self.city.trim().to_string();
        self
    }
}

/// Request DTO for updating a listing; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateListingDto {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<String>, example = "450.00")]
    pub price: Option<Decimal>,
    #[validate(custom(function = "validate_not_blank"), length(max = 100))]
    pub city: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<ListingStatus>,
    #[serde(default)]
    #[validate(nested)]
    pub add_images: Vec<NewImageDto>,
    /// Ids of this listing's images to delete
    #[serde(default)]
    pub remove_image_ids: Vec<i64>,
}

impl UpdateListingDto {
    pub fn trimmed(mut self) -> Self {
        self.title = self.title.map(|s| s.trim().to_string());
        self.description = self.description.map(|s| s.trim().to_string());
        self.city = self.city.map(|s| s.trim().to_string());
        self
    }
}

/// Landing page content
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomeDto {
    pub recent: Vec<ListingCardDto>,
    pub featured: Vec<ListingCardDto>,
    pub top_categories: Vec<CategoryWithCountDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_dto(value: serde_json::Value) -> CreateListingDto {
        serde_json::from_value::<CreateListingDto>(value).unwrap().trimmed()
    }

    #[test]
    fn test_valid_create() {
        let dto = create_dto(json!({
            "title": "iPhone 13",
            "description": "Like new",
            "price": "500.00",
            "city": "Chisinau",
            "category_id": 2,
            "images": [{ "image": "listings/abc.jpg" }]
        }));
        assert!(dto.validate().is_ok());
        assert_eq!(dto.price, Decimal::new(500, 0));
    }

    #[test]
    fn test_title_counts_after_trim() {
        let dto = create_dto(json!({
            "title": "  ab  ",
            "description": "x",
            "price": "1",
            "city": "Balti",
            "category_id": 1
        }));
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_negative_price_and_blank_fields_rejected() {
        let dto = create_dto(json!({
            "title": "Bicicleta",
            "description": "   ",
            "price": "-1",
            "city": "",
            "category_id": 1
        }));
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("description"));
        assert!(fields.contains_key("city"));
    }

    #[test]
    fn test_zero_price_is_allowed() {
        let dto = create_dto(json!({
            "title": "Giveaway",
            "description": "Free to a good home",
            "price": "0",
            "city": "Orhei",
            "category_id": 1
        }));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_price_must_fit_storage() {
        let listing = |price: &str| {
            create_dto(json!({
                "title": "Apartament",
                "description": "Centru",
                "price": price,
                "city": "Chisinau",
                "category_id": 1
            }))
        };

        assert!(listing("9999999999.99").validate().is_ok());
        assert!(listing("1.500").validate().is_ok());

        for price in ["10000000000", "100000000000", "19.999"] {
            let errors = listing(price).validate().unwrap_err();
            assert!(errors.field_errors().contains_key("price"), "{}", price);
        }

        let update = UpdateListingDto {
            price: Some(Decimal::new(100_000_000_000, 0)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_update_partial_status() {
        let dto: UpdateListingDto = serde_json::from_value(json!({ "status": "sold" })).unwrap();
        assert_eq!(dto.status, Some(ListingStatus::Sold));
        assert!(dto.title.is_none());
        assert!(dto.validate().is_ok());

        let bad = serde_json::from_value::<UpdateListingDto>(json!({ "status": "archived" }));
        assert!(bad.is_err());
    }
}
