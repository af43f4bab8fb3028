use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::accounts::dtos::{ProfileDto, PublicProfileDto, UpdateProfileDto};
use crate::features::accounts::services::AccountService;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/me/profile",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "accounts",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<AccountService>>,
) -> Result<Json<ApiResponse<ProfileDto>>> {
    let profile = service.profile(&user).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

#[utoipa::path(
    patch,
    path = "/api/me/profile",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<ProfileDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "accounts",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<AccountService>>,
    AppJson(dto): AppJson<UpdateProfileDto>,
) -> Result<Json<ApiResponse<ProfileDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = service.update_profile(&user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Profile updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "Public profile", body = ApiResponse<PublicProfileDto>),
        (status = 404, description = "User not found")
    ),
    tag = "accounts"
)]
pub async fn get_public_profile(
    State(service): State<Arc<AccountService>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<PublicProfileDto>>> {
    let profile = service.public_profile(&username).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}
