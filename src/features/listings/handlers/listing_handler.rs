use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::listings::dtos::{
    CreateListingDto, HomeDto, ListingCardDto, ListingDetailDto, ListingSearchQuery,
    ListingSummaryDto, MyListingsQuery, UpdateListingDto,
};
use crate::features::listings::services::ListingService;
use crate::shared::types::{ApiResponse, Meta};

/// Search active listings
///
/// Malformed filters are ignored; out-of-range pages are clamped.
#[utoipa::path(
    get,
    path = "/api/listings",
    params(ListingSearchQuery),
    responses(
        (status = 200, description = "Matching listings", body = ApiResponse<Vec<ListingCardDto>>),
        (status = 401, description = "Invalid bearer token")
    ),
    tag = "listings"
)]
pub async fn search_listings(
    viewer: Option<AuthenticatedUser>,
    State(service): State<Arc<ListingService>>,
    Query(query): Query<ListingSearchQuery>,
) -> Result<Json<ApiResponse<Vec<ListingCardDto>>>> {
    let (items, page) = service.search(&query, viewer.as_ref()).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::paged(page)),
    )))
}

/// Get listing by slug and count the view
#[utoipa::path(
    get,
    path = "/api/listings/{slug}",
    params(
        ("slug" = String, Path, description = "Listing slug")
    ),
    responses(
        (status = 200, description = "Listing found", body = ApiResponse<ListingDetailDto>),
        (status = 404, description = "Listing not found or not active")
    ),
    tag = "listings"
)]
pub async fn get_listing(
    viewer: Option<AuthenticatedUser>,
    State(service): State<Arc<ListingService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ListingDetailDto>>> {
    let listing = service.get_detail(&slug, viewer.as_ref()).await?;
    Ok(Json(ApiResponse::success(Some(listing), None, None)))
}

/// Landing page content
#[utoipa::path(
    get,
    path = "/api/home",
    responses(
        (status = 200, description = "Recent and featured listings, top categories", body = ApiResponse<HomeDto>),
    ),
    tag = "listings"
)]
pub async fn home(
    viewer: Option<AuthenticatedUser>,
    State(service): State<Arc<ListingService>>,
) -> Result<Json<ApiResponse<HomeDto>>> {
    let home = service.home(viewer.as_ref()).await?;
    Ok(Json(ApiResponse::success(Some(home), None, None)))
}

/// Create a listing
#[utoipa::path(
    post,
    path = "/api/listings",
    request_body = CreateListingDto,
    responses(
        (status = 201, description = "Listing created", body = ApiResponse<ListingDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "listings",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_listing(
    user: AuthenticatedUser,
    State(service): State<Arc<ListingService>>,
    AppJson(dto): AppJson<CreateListingDto>,
) -> Result<(StatusCode, Json<ApiResponse<ListingDetailDto>>)> {
    let dto = dto.trimmed();
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let listing = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(listing),
            Some("Listing created successfully".to_string()),
            None,
        )),
    ))
}

/// Update own listing
#[utoipa::path(
    patch,
    path = "/api/listings/{slug}",
    params(
        ("slug" = String, Path, description = "Listing slug")
    ),
    request_body = UpdateListingDto,
    responses(
        (status = 200, description = "Listing updated", body = ApiResponse<ListingDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Listing not found or not owned by caller")
    ),
    tag = "listings",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_listing(
    user: AuthenticatedUser,
    State(service): State<Arc<ListingService>>,
    Path(slug): Path<String>,
    AppJson(dto): AppJson<UpdateListingDto>,
) -> Result<Json<ApiResponse<ListingDetailDto>>> {
    let dto = dto.trimmed();
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let listing = service.update(&user, &slug, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(listing),
        Some("Listing updated successfully".to_string()),
        None,
    )))
}

/// Delete own listing
#[utoipa::path(
    delete,
    path = "/api/listings/{slug}",
    params(
        ("slug" = String, Path, description = "Listing slug")
    ),
    responses(
        (status = 200, description = "Listing deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Listing not found or not owned by caller")
    ),
    tag = "listings",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_listing(
    user: AuthenticatedUser,
    State(service): State<Arc<ListingService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, &slug).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Listing deleted successfully".to_string()),
        None,
    )))
}

/// List own listings in every status
#[utoipa::path(
    get,
    path = "/api/me/listings",
    params(MyListingsQuery),
    responses(
        (status = 200, description = "Caller's listings, newest first", body = ApiResponse<Vec<ListingSummaryDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "listings",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_listings(
    user: AuthenticatedUser,
    State(service): State<Arc<ListingService>>,
    Query(query): Query<MyListingsQuery>,
) -> Result<Json<ApiResponse<Vec<ListingSummaryDto>>>> {
    let (items, page) = service
        .my_listings(&user, query.status.as_deref(), query.page.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::paged(page)),
    )))
}
