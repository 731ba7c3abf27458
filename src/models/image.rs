use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// An `images` row. The stored file itself lives under the upload
/// directory; `url` is the public path handed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub id: i64,
    pub owner_id: Uuid,
    pub trip_id: i64,
    pub title: String,
    pub description: String,
    pub file_name: String,
    pub url: String,
    pub shared: bool,
    pub uploaded_at: DateTime<Utc>,
}
