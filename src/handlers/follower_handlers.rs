// src/handlers/follower_handlers.rs
use actix_web::{HttpResponse, delete, get, post, web};
use log::info;

use crate::AppState;
use crate::dtos::ApiResponse;
use crate::dtos::follower_dtos::CreateFollowerDTO;
use crate::errors::{ApiError, ValidationErrors};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::follower_repository::FollowerRepository;
use crate::services::policy::can_write;

#[get("/followers/")]
pub async fn list_followers(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let followers = FollowerRepository::list(&state.pg_pool).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Followers retrieved successfully",
        followers,
    )))
}

#[post("/followers/")]
pub async fn create_follower(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CreateFollowerDTO>,
) -> Result<HttpResponse, ApiError> {
    if body.followed == user.user_id {
        let mut errors = ValidationErrors::new();
        errors.add("followed", "you cannot follow yourself");
        return Err(errors.into());
    }

    let id = FollowerRepository::create(&state.pg_pool, user.user_id, body.followed).await?;
    info!("user {} followed user {}", user.user_id, body.followed);

    let follower = FollowerRepository::get_out(&state.pg_pool, id)
        .await?
        .ok_or_else(|| ApiError::Internal("follower vanished after insert".to_string()))?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Follower created successfully",
        follower,
    )))
}

#[get("/followers/{id}/")]
pub async fn get_follower(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let follower = FollowerRepository::get_out(&state.pg_pool, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Follower retrieved successfully",
        follower,
    )))
}

#[delete("/followers/{id}/")]
pub async fn delete_follower(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = FollowerRepository::get(&state.pg_pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !can_write(Some(user.user_id), existing.owner_id) {
        return Err(ApiError::PermissionDenied);
    }

    FollowerRepository::delete(&state.pg_pool, id).await?;

    Ok(HttpResponse::NoContent().finish())
}
