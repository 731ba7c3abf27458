// src/handlers/like_handlers.rs
use actix_web::{HttpResponse, delete, get, post, web};
use log::info;

use crate::AppState;
use crate::dtos::ApiResponse;
use crate::dtos::like_dtos::CreateLikeDTO;
use crate::errors::ApiError;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::like_repository::LikeRepository;
use crate::services::policy::can_write;

#[get("/likes/")]
pub async fn list_likes(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let likes = LikeRepository::list(&state.pg_pool).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Likes retrieved successfully",
        likes,
    )))
}

#[post("/likes/")]
pub async fn create_like(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CreateLikeDTO>,
) -> Result<HttpResponse, ApiError> {
    let id = LikeRepository::create(&state.pg_pool, user.user_id, body.image).await?;
    info!("user {} liked image {}", user.user_id, body.image);

    let like = LikeRepository::get_out(&state.pg_pool, id)
        .await?
        .ok_or_else(|| ApiError::Internal("like vanished after insert".to_string()))?;

    Ok(HttpResponse::Created().json(ApiResponse::success("Like created successfully", like)))
}

#[get("/likes/{id}/")]
pub async fn get_like(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let like = LikeRepository::get_out(&state.pg_pool, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Like retrieved successfully", like)))
}

#[delete("/likes/{id}/")]
pub async fn delete_like(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = LikeRepository::get(&state.pg_pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !can_write(Some(user.user_id), existing.owner_id) {
        return Err(ApiError::PermissionDenied);
    }

    LikeRepository::delete(&state.pg_pool, id).await?;

    Ok(HttpResponse::NoContent().finish())
}
