use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppForm;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::favorites::dtos::{
    FavoriteDto, FavoritesQuery, ToggleFavoriteError, ToggleFavoriteForm, ToggleFavoriteResponse,
};
use crate::features::favorites::services::FavoriteService;
use crate::shared::types::{ApiResponse, Meta};

/// Error for the toggle endpoint, rendered as a bare `{"error": ...}` body
pub struct FavoriteToggleError(AppError);

impl From<AppError> for FavoriteToggleError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for FavoriteToggleError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::Forbidden(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ToggleFavoriteError {
            error: self.0.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

fn parse_listing_id(form: ToggleFavoriteForm) -> std::result::Result<i64, AppError> {
    let raw = form
        .listing_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("listing_id is required".to_string()))?;

    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid listing_id '{}'", raw)))
}

/// Add a listing to favorites, or remove it if already there
#[utoipa::path(
    post,
    path = "/api/favorites/toggle",
    request_body(content = ToggleFavoriteForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Favorite toggled", body = ToggleFavoriteResponse),
        (status = 400, description = "Missing or invalid listing_id, or own listing", body = ToggleFavoriteError),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Listing not found or not active", body = ToggleFavoriteError)
    ),
    tag = "favorites",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn toggle_favorite(
    user: AuthenticatedUser,
    State(service): State<Arc<FavoriteService>>,
    form: std::result::Result<AppForm<ToggleFavoriteForm>, AppError>,
) -> std::result::Result<Json<ToggleFavoriteResponse>, FavoriteToggleError> {
    let AppForm(form) = form?;
    let listing_id = parse_listing_id(form)?;

    let outcome = service.toggle(&user, listing_id).await?;
    let message = if outcome.is_favorited {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };

    Ok(Json(ToggleFavoriteResponse {
        success: true,
        is_favorited: outcome.is_favorited,
        message: message.to_string(),
        favorites_count: outcome.favorites_count,
    }))
}

/// List the caller's favorites
#[utoipa::path(
    get,
    path = "/api/favorites",
    params(FavoritesQuery),
    responses(
        (status = 200, description = "Favorites, newest first", body = ApiResponse<Vec<FavoriteDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "favorites",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_favorites(
    user: AuthenticatedUser,
    State(service): State<Arc<FavoriteService>>,
    Query(query): Query<FavoritesQuery>,
) -> Result<Json<ApiResponse<Vec<FavoriteDto>>>> {
    let (items, page) = service.list(&user, query.page.as_deref()).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::paged(page)),
    )))
}

/// Remove one favorite
#[utoipa::path(
    delete,
    path = "/api/favorites/{id}",
    params(
        ("id" = i64, Path, description = "Favorite ID")
    ),
    responses(
        (status = 200, description = "Favorite removed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Favorite not found")
    ),
    tag = "favorites",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_favorite(
    user: AuthenticatedUser,
    State(service): State<Arc<FavoriteService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.remove(&user, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Removed from favorites".to_string()),
        None,
    )))
}
