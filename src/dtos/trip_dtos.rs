use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::trip::{TripCategory, TripStatus};

fn default_shared() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateTripDTO {
    pub place: String,
    pub country: String,
    pub category: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_shared")]
    pub shared: bool,
}

/// Partial update; missing fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateTripDTO {
    pub place: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub shared: Option<bool>,
}

/// A trip as returned to clients, with the two derived aggregates.
#[derive(Debug, Serialize)]
pub struct TripOut {
    pub id: i64,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub place: String,
    pub country: String,
    pub category: TripCategory,
    pub status: TripStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// distinct images belonging to the trip
    pub images_count: i64,
    /// distinct likes across all of the trip's images
    pub total_likes_count: i64,
}

/// Query-string filters for `GET /trips/`. `category` and `status` accept
/// comma-separated multi-select values. Filters that need an identity are
/// no-ops for anonymous requesters.
#[derive(Debug, Default, Deserialize)]
pub struct TripFilterParams {
    pub owner_username: Option<String>,
    #[serde(rename = "owner_username__iexact")]
    pub owner_username_iexact: Option<String>,
    pub country: Option<String>,
    pub place: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub liked_by_user: Option<bool>,
    pub followed_users: Option<bool>,
}
