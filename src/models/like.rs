use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A like given by a user to an image. Unique per (owner, image) pair,
/// enforced by the store.
#[derive(Debug, Clone, Serialize)]
pub struct Like {
    pub id: i64,
    pub owner_id: Uuid,
    pub image_id: i64,
    pub created_at: DateTime<Utc>,
}
