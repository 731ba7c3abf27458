use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateFollowerDTO {
    pub followed: Uuid,
}

#[derive(Debug, Serialize)]
pub struct FollowerOut {
    pub id: i64,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub followed: Uuid,
    pub followed_name: String,
    pub created_at: DateTime<Utc>,
}
