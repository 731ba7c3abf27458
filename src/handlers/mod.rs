pub mod follower_handlers;
pub mod image_handlers;
pub mod like_handlers;
pub mod profile_handlers;
pub mod trip_handlers;
