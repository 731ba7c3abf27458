use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateLikeDTO {
    pub image: i64,
}

#[derive(Debug, Serialize)]
pub struct LikeOut {
    pub id: i64,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub image: i64,
    pub created_at: DateTime<Utc>,
}
