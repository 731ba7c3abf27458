// src/handlers/profile_handlers.rs
use actix_web::{HttpResponse, get, put, web};

use crate::AppState;
use crate::dtos::ApiResponse;
use crate::dtos::profile_dtos::UpdateProfileDTO;
use crate::errors::ApiError;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::profile_repository::ProfileRepository;
use crate::services::policy::can_write;

#[get("/profiles/")]
pub async fn list_profiles(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let profiles = ProfileRepository::list(&state.pg_pool).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Profiles retrieved successfully",
        profiles,
    )))
}

#[get("/profiles/{id}/")]
pub async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let profile = ProfileRepository::get(&state.pg_pool, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Profile retrieved successfully",
        profile,
    )))
}

#[put("/profiles/{id}/")]
pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<UpdateProfileDTO>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = ProfileRepository::get(&state.pg_pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !can_write(Some(user.user_id), existing.user_id) {
        return Err(ApiError::PermissionDenied);
    }

    ProfileRepository::update(
        &state.pg_pool,
        id,
        body.display_name.as_deref(),
        body.bio.as_deref(),
    )
    .await?;

    let profile = ProfileRepository::get(&state.pg_pool, id)
        .await?
        .ok_or_else(|| ApiError::Internal("profile vanished after update".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Profile updated successfully",
        profile,
    )))
}
