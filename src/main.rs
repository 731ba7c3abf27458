// src/main.rs
mod config;
mod dtos;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod services;

use std::env;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use deadpool_postgres::Pool;
use log::{error, info};
use reqwest::Client;

use crate::handlers::follower_handlers::{
    create_follower, delete_follower, get_follower, list_followers,
};
use crate::handlers::image_handlers::{
    delete_trip_image, gallery, get_trip_image, list_trip_images, serve_trip_image,
    update_trip_image, upload_trip_image,
};
use crate::handlers::like_handlers::{create_like, delete_like, get_like, list_likes};
use crate::handlers::profile_handlers::{get_profile, list_profiles, update_profile};
use crate::handlers::trip_handlers::{
    create_trip, delete_trip, get_trip, list_trips, update_trip,
};
use crate::services::geocoding_services::GeocoderConfig;

#[derive(Clone)]
pub struct AppState {
    pub pg_pool: Pool,
    pub http_client: Client,
    pub jwt_secret: String,
    pub geocoder: GeocoderConfig,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

    let pg_pool = match config::get_pg_pool() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create PG pool: {}", e);
            std::process::exit(1);
        }
    };

    let http_client = Client::builder()
        .user_agent("tripshare-be/0.1")
        .build()
        .expect("failed to build http client");

    let geocoder = GeocoderConfig::from_env();
    info!("Geocoder endpoint: {}", geocoder.base_url);

    let state = web::Data::new(AppState {
        pg_pool,
        http_client,
        jwt_secret,
        geocoder,
    });

    let allowed_origins = env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".into());

    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                "authorization",
                "content-type",
                "accept",
                "x-requested-with",
            ])
            .supports_credentials()
            .max_age(3600);

        for origin in allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
        {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            // trips
            .service(list_trips) // GET  /trips/
            .service(create_trip) // POST /trips/
            .service(get_trip) // GET  /trips/{id}/
            .service(update_trip) // PUT/PATCH /trips/{id}/
            .service(delete_trip) // DELETE /trips/{id}/
            // images, nested under their trip
            .service(list_trip_images) // GET  /trips/{trip_id}/images/
            .service(upload_trip_image) // POST /trips/{trip_id}/images/
            .service(get_trip_image) // GET  /trips/{trip_id}/images/{id}/
            .service(update_trip_image) // PUT/PATCH /trips/{trip_id}/images/{id}/
            .service(delete_trip_image) // DELETE /trips/{trip_id}/images/{id}/
            .service(gallery) // GET  /gallery/
            .service(serve_trip_image) // GET  /uploads/trip_images/{filename}
            // likes
            .service(list_likes) // GET  /likes/
            .service(create_like) // POST /likes/
            .service(get_like) // GET  /likes/{id}/
            .service(delete_like) // DELETE /likes/{id}/
            // followers
            .service(list_followers) // GET  /followers/
            .service(create_follower) // POST /followers/
            .service(get_follower) // GET  /followers/{id}/
            .service(delete_follower) // DELETE /followers/{id}/
            // profiles
            .service(list_profiles) // GET  /profiles/
            .service(get_profile) // GET  /profiles/{id}/
            .service(update_profile) // PUT  /profiles/{id}/
    })
    .bind(&bind_address)?
    .run()
    .await
}
