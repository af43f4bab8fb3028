use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::listings::dtos::ListingSummaryDto;
use crate::shared::validation::PHONE_REGEX;

/// Listing counts shown on the owner's profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ProfileStatsDto {
    pub total_listings: i64,
    pub active_listings: i64,
    pub sold_listings: i64,
}

/// Caller's own profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileDto {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    #[schema(value_type = String, example = "4.50")]
    pub average_rating: Decimal,
    pub member_since: DateTime<Utc>,
    pub stats: ProfileStatsDto,
}

/// Profile as other users see it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicProfileDto {
    pub username: String,
    pub first_name: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    #[schema(value_type = String, example = "4.50")]
    pub average_rating: Decimal,
    pub member_since: DateTime<Utc>,
    pub active_listings_count: i64,
    /// Latest active listings
    pub listings: Vec<ListingSummaryDto>,
}

/// Request DTO for updating the caller's profile; absent fields are unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 150, message = "First name must be 1-150 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 150, message = "Last name must be 1-150 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[validate(regex(
        path = *PHONE_REGEX,
        message = "Phone must contain 6-20 digits, spaces or dashes, optionally starting with +"
    ))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "City must not exceed 100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[validate(url(message = "Avatar must be a valid URL"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
