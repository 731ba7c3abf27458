use serde::Serialize;

pub mod follower_dtos;
pub mod image_dtos;
pub mod like_dtos;
pub mod profile_dtos;
pub mod trip_dtos;

/// Standard success envelope returned by every handler.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        ApiResponse {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}
