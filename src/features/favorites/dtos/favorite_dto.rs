use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::features::listings::dtos::ListingSummaryDto;
use crate::features::listings::models::ListingRow;

/// Form body of the toggle endpoint. Kept as a string so a malformed id is
/// reported with a clear message instead of a generic form error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleFavoriteForm {
    pub listing_id: Option<String>,
}

/// Toggle result. Deliberately not wrapped in `ApiResponse`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleFavoriteResponse {
    pub success: bool,
    pub is_favorited: bool,
    pub message: String,
    pub favorites_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleFavoriteError {
    pub error: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FavoritesQuery {
    pub page: Option<String>,
}

/// Favorite joined with the listing it points to
#[derive(Debug, Clone, FromRow)]
pub struct FavoriteRow {
    pub favorite_id: i64,
    pub favorited_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub listing: ListingRow,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteDto {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub listing: ListingSummaryDto,
}

impl From<FavoriteRow> for FavoriteDto {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: row.favorite_id,
            created_at: row.favorited_at,
            listing: row.listing.into(),
        }
    }
}
