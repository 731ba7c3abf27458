use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A follow relationship: `owner` follows `followed`. Unique per pair,
/// self-follow rejected before the insert is attempted.
#[derive(Debug, Clone, Serialize)]
pub struct Follower {
    pub id: i64,
    pub owner_id: Uuid,
    pub followed_id: Uuid,
    pub created_at: DateTime<Utc>,
}
