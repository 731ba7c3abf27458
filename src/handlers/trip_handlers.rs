// src/handlers/trip_handlers.rs
use actix_web::{HttpResponse, delete, get, post, route, web};
use log::info;

use crate::AppState;
use crate::dtos::ApiResponse;
use crate::dtos::trip_dtos::{CreateTripDTO, TripFilterParams, UpdateTripDTO};
use crate::errors::{ApiError, ValidationErrors};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::trip_repository::TripRepository;
use crate::services::geocoding_services::{Coordinates, geocode};
use crate::services::policy::{can_read, can_write};
use crate::services::validation::{validate_new_trip, validate_trip_update};

#[get("/trips/")]
pub async fn list_trips(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    query: web::Query<TripFilterParams>,
) -> Result<HttpResponse, ApiError> {
    let requester = user.as_ref().map(|u| u.user_id);
    let trips = TripRepository::list(&state.pg_pool, requester, &query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Trips retrieved successfully",
        trips,
    )))
}

#[post("/trips/")]
pub async fn create_trip(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CreateTripDTO>,
) -> Result<HttpResponse, ApiError> {
    // cheap field checks first; the geocoder is only paid for once they pass
    let validated = validate_new_trip(&body)?;
    let coords = geocode_place(&state, &validated.place).await?;

    let id = TripRepository::create(&state.pg_pool, user.user_id, &validated, coords).await?;
    info!("user {} created trip {}", user.user_id, id);

    let trip = TripRepository::get_annotated(&state.pg_pool, id)
        .await?
        .ok_or_else(|| ApiError::Internal("trip vanished after insert".to_string()))?;

    Ok(HttpResponse::Created().json(ApiResponse::success("Trip created successfully", trip)))
}

#[get("/trips/{id}/")]
pub async fn get_trip(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let requester = user.as_ref().map(|u| u.user_id);
    let trip = TripRepository::get_annotated(&state.pg_pool, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound)?;

    if !can_read(requester, trip.owner_id, trip.shared) {
        return Err(ApiError::NotFound);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("Trip retrieved successfully", trip)))
}

#[route("/trips/{id}/", method = "PUT", method = "PATCH")]
pub async fn update_trip(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<UpdateTripDTO>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = TripRepository::get(&state.pg_pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !can_read(Some(user.user_id), existing.owner_id, existing.shared) {
        return Err(ApiError::NotFound);
    }
    if !can_write(Some(user.user_id), existing.owner_id) {
        return Err(ApiError::PermissionDenied);
    }

    let validated = validate_trip_update(&body, &existing)?;

    // only a changed place needs a fresh geocoding round trip
    let (lat, lon) = if validated.place != existing.place {
        let coords = geocode_place(&state, &validated.place).await?;
        (Some(coords.lat), Some(coords.lon))
    } else {
        (existing.lat, existing.lon)
    };

    TripRepository::update(&state.pg_pool, id, &validated, lat, lon).await?;

    let trip = TripRepository::get_annotated(&state.pg_pool, id)
        .await?
        .ok_or_else(|| ApiError::Internal("trip vanished after update".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Trip updated successfully", trip)))
}

#[delete("/trips/{id}/")]
pub async fn delete_trip(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = TripRepository::get(&state.pg_pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !can_read(Some(user.user_id), existing.owner_id, existing.shared) {
        return Err(ApiError::NotFound);
    }
    if !can_write(Some(user.user_id), existing.owner_id) {
        return Err(ApiError::PermissionDenied);
    }

    TripRepository::delete(&state.pg_pool, id).await?;
    info!("user {} deleted trip {}", user.user_id, id);

    Ok(HttpResponse::NoContent().finish())
}

/// Run the geocoder and fold both failure modes into a validation error
/// on `place`; neither is a server fault from the caller's point of view.
async fn geocode_place(state: &AppState, place: &str) -> Result<Coordinates, ApiError> {
    geocode(&state.http_client, &state.geocoder, place)
        .await
        .map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add("place", e.to_string());
            errors.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    use crate::models::user::JwtClaims;
    use crate::services::geocoding_services::GeocoderConfig;

    const TEST_SECRET: &str = "test-secret";

    /// The pool is lazy, so pointing it at a dead port builds fine; any
    /// request that actually reaches the store fails with a pool error.
    fn test_state(geocoder_url: String) -> web::Data<AppState> {
        let mut cfg = deadpool_postgres::Config::new();
        cfg.host = Some("127.0.0.1".to_string());
        cfg.port = Some(1);
        cfg.user = Some("test".to_string());
        cfg.dbname = Some("test".to_string());
        let pg_pool = cfg
            .create_pool(
                Some(deadpool_postgres::Runtime::Tokio1),
                tokio_postgres::NoTls,
            )
            .unwrap();

        web::Data::new(AppState {
            pg_pool,
            http_client: reqwest::Client::new(),
            jwt_secret: TEST_SECRET.to_string(),
            geocoder: GeocoderConfig {
                base_url: geocoder_url,
                timeout: Duration::from_millis(100),
                max_attempts: 2,
            },
        })
    }

    fn bearer_token() -> String {
        let claims = JwtClaims {
            sub: uuid::Uuid::new_v4().to_string(),
            exp: (chrono::Utc::now().timestamp() as u64) + 3600,
            username: Some("tester".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn trip_json(start_date: &str, end_date: &str) -> serde_json::Value {
        json!({
            "place": "New York",
            "country": "USA",
            "category": "Leisure",
            "status": "Planned",
            "start_date": start_date,
            "end_date": end_date
        })
    }

    #[actix_web::test]
    async fn reversed_dates_fail_before_any_geocoding_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body(r#"[{"lat":"40.7","lon":"-74.0"}]"#)
            .expect(0)
            .create_async()
            .await;

        let state = test_state(server.url());
        let app = test::init_service(App::new().app_data(state).service(create_trip)).await;

        let req = test::TestRequest::post()
            .uri("/trips/")
            .insert_header(("Authorization", format!("Bearer {}", bearer_token())))
            .set_json(trip_json("2025-03-10", "2025-03-01"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        mock.assert_async().await;
    }

    #[actix_web::test]
    async fn valid_fields_reach_the_geocoder() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body(r#"[{"lat":"40.7","lon":"-74.0"}]"#)
            .expect(1)
            .create_async()
            .await;

        let state = test_state(server.url());
        let app = test::init_service(App::new().app_data(state).service(create_trip)).await;

        let req = test::TestRequest::post()
            .uri("/trips/")
            .insert_header(("Authorization", format!("Bearer {}", bearer_token())))
            .set_json(trip_json("2025-03-01", "2025-03-10"))
            .to_request();
        // no store behind the pool, so the insert fails with a 500; the
        // geocoding request has already gone out by then
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        mock.assert_async().await;
    }
}
