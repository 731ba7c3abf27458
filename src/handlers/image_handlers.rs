// src/handlers/image_handlers.rs
use std::path::Path;

use actix_web::{HttpResponse, delete, get, post, route, web};
use log::{info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::dtos::ApiResponse;
use crate::dtos::image_dtos::{UpdateImageDTO, UploadImageDTO};
use crate::errors::{ApiError, ValidationErrors};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::image_repository::ImageRepository;
use crate::repositories::trip_repository::TripRepository;
use crate::services::media;
use crate::services::policy::{can_read, can_write};

const UPLOAD_DIR: &str = "uploads/trip_images";

#[get("/trips/{trip_id}/images/")]
pub async fn list_trip_images(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let trip_id = path.into_inner();
    let trip = TripRepository::get(&state.pg_pool, trip_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let requester = user.as_ref().map(|u| u.user_id);
    let include_private = can_write(requester, trip.owner_id);
    let images = ImageRepository::list_for_trip(&state.pg_pool, trip_id, include_private).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Images retrieved successfully",
        images,
    )))
}

#[post("/trips/{trip_id}/images/")]
pub async fn upload_trip_image(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<UploadImageDTO>,
) -> Result<HttpResponse, ApiError> {
    let trip_id = path.into_inner();
    let trip = TripRepository::get(&state.pg_pool, trip_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    // only the trip's owner may attach images to it
    if !can_write(Some(user.user_id), trip.owner_id) {
        return Err(ApiError::PermissionDenied);
    }

    let mut errors = ValidationErrors::new();
    media::validate_image_fields(&body.title, &body.description, &mut errors);

    let bytes = match media::decode_image_data(&body.image_data) {
        Ok(bytes) => {
            media::validate_image_file(&body.file_name, &bytes, &mut errors);
            Some(bytes)
        }
        Err(e) => {
            errors.add("image", e);
            None
        }
    };
    errors.into_result()?;
    let bytes = bytes.unwrap_or_default();

    // validate_image_file already rejected names without an allow-listed
    // extension, so a missing one here is a bug, not bad input
    let extension = media::file_extension(&body.file_name)
        .ok_or_else(|| ApiError::Internal("file extension missing after validation".to_string()))?;
    let file_name = format!("trip{}_{}.{}", trip_id, Uuid::new_v4(), extension);

    std::fs::create_dir_all(UPLOAD_DIR)
        .map_err(|e| ApiError::Internal(format!("failed to prepare file storage: {}", e)))?;
    let file_path = format!("{}/{}", UPLOAD_DIR, file_name);
    std::fs::write(&file_path, &bytes)
        .map_err(|e| ApiError::Internal(format!("failed to save image: {}", e)))?;

    let url = format!("/uploads/trip_images/{}", file_name);
    let id = match ImageRepository::create(
        &state.pg_pool,
        user.user_id,
        trip_id,
        body.title.trim(),
        body.description.trim(),
        &file_name,
        &url,
        body.shared,
    )
    .await
    {
        Ok(id) => id,
        Err(e) => {
            // the row never landed; drop the orphaned file
            let _ = std::fs::remove_file(&file_path);
            return Err(e);
        }
    };
    info!("user {} uploaded image {} to trip {}", user.user_id, id, trip_id);

    let image = ImageRepository::get_for_trip(&state.pg_pool, trip_id, id)
        .await?
        .ok_or_else(|| ApiError::Internal("image vanished after insert".to_string()))?;

    Ok(HttpResponse::Created().json(ApiResponse::success("Image uploaded successfully", image)))
}

#[get("/trips/{trip_id}/images/{image_id}/")]
pub async fn get_trip_image(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ApiError> {
    let (trip_id, image_id) = path.into_inner();
    let requester = user.as_ref().map(|u| u.user_id);

    let image = ImageRepository::get_for_trip(&state.pg_pool, trip_id, image_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !can_read(requester, image.owner_id, image.shared) {
        return Err(ApiError::NotFound);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("Image retrieved successfully", image)))
}

#[route("/trips/{trip_id}/images/{image_id}/", method = "PUT", method = "PATCH")]
pub async fn update_trip_image(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
    body: web::Json<UpdateImageDTO>,
) -> Result<HttpResponse, ApiError> {
    let (trip_id, image_id) = path.into_inner();
    let existing = ImageRepository::get(&state.pg_pool, image_id)
        .await?
        .filter(|img| img.trip_id == trip_id)
        .ok_or(ApiError::NotFound)?;

    if !can_read(Some(user.user_id), existing.owner_id, existing.shared) {
        return Err(ApiError::NotFound);
    }
    if !can_write(Some(user.user_id), existing.owner_id) {
        return Err(ApiError::PermissionDenied);
    }

    let title = body.title.clone().unwrap_or_else(|| existing.title.clone());
    let description = body
        .description
        .clone()
        .unwrap_or_else(|| existing.description.clone());
    let shared = body.shared.unwrap_or(existing.shared);

    let mut errors = ValidationErrors::new();
    media::validate_image_fields(&title, &description, &mut errors);
    errors.into_result()?;

    ImageRepository::update(
        &state.pg_pool,
        image_id,
        title.trim(),
        description.trim(),
        shared,
    )
    .await?;

    let image = ImageRepository::get_for_trip(&state.pg_pool, trip_id, image_id)
        .await?
        .ok_or_else(|| ApiError::Internal("image vanished after update".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Image updated successfully", image)))
}

#[delete("/trips/{trip_id}/images/{image_id}/")]
pub async fn delete_trip_image(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ApiError> {
    let (trip_id, image_id) = path.into_inner();
    let existing = ImageRepository::get(&state.pg_pool, image_id)
        .await?
        .filter(|img| img.trip_id == trip_id)
        .ok_or(ApiError::NotFound)?;

    if !can_read(Some(user.user_id), existing.owner_id, existing.shared) {
        return Err(ApiError::NotFound);
    }
    if !can_write(Some(user.user_id), existing.owner_id) {
        return Err(ApiError::PermissionDenied);
    }

    ImageRepository::delete(&state.pg_pool, image_id).await?;

    let file_path = format!("{}/{}", UPLOAD_DIR, existing.file_name);
    if let Err(e) = std::fs::remove_file(&file_path) {
        warn!("could not remove stored file {}: {}", file_path, e);
    }

    Ok(HttpResponse::NoContent().finish())
}

/// GET /gallery/ - every shared image, for everyone.
#[get("/gallery/")]
pub async fn gallery(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let images = ImageRepository::gallery(&state.pg_pool).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Gallery retrieved successfully",
        images,
    )))
}

/// GET /uploads/trip_images/{filename} - serve stored files directly.
#[get("/uploads/trip_images/{filename}")]
pub async fn serve_trip_image(path: web::Path<String>) -> HttpResponse {
    let filename = path.into_inner();

    // keep traversal attempts inside the upload directory
    let safe_filename = Path::new(&filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("invalid");

    let file_path = format!("{}/{}", UPLOAD_DIR, safe_filename);

    match std::fs::read(&file_path) {
        Ok(data) => {
            let content_type = match Path::new(safe_filename)
                .extension()
                .and_then(|ext| ext.to_str())
            {
                Some("jpg") | Some("jpeg") => "image/jpeg",
                Some("png") => "image/png",
                Some("gif") => "image/gif",
                Some("webp") => "image/webp",
                Some("tif") | Some("tiff") => "image/tiff",
                _ => "application/octet-stream",
            };

            HttpResponse::Ok().content_type(content_type).body(data)
        }
        Err(_) => HttpResponse::NotFound().json(serde_json::json!({
            "status": "error",
            "message": "Image not found"
        })),
    }
}
