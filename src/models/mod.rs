pub mod follower;
pub mod image;
pub mod like;
pub mod trip;
pub mod user;
