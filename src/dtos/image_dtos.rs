use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_shared() -> bool {
    true
}

/// Upload payload: the file travels base64-encoded in the JSON body.
#[derive(Debug, Deserialize)]
pub struct UploadImageDTO {
    pub title: String,
    pub description: String,
    pub file_name: String,
    /// base64 encoded file contents, optionally with a data-URL prefix
    pub image_data: String,
    #[serde(default = "default_shared")]
    pub shared: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateImageDTO {
    pub title: Option<String>,
    pub description: Option<String>,
    pub shared: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ImageOut {
    pub id: i64,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub trip_id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub shared: bool,
    pub uploaded_at: DateTime<Utc>,
    pub likes_count: i64,
}
