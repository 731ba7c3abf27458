use tokio_postgres::error::SqlState;

use crate::errors::{ApiError, ValidationErrors};

pub mod follower_repository;
pub mod image_repository;
pub mod like_repository;
pub mod profile_repository;
pub mod trip_repository;

/// Convert unique/foreign-key violations raised by the store into
/// field-level validation errors; anything else stays a database error.
/// The unique constraint is what serializes concurrent duplicate inserts.
pub(crate) fn constraint_error(
    e: tokio_postgres::Error,
    duplicate_message: &str,
    reference_field: &str,
    reference_message: &str,
) -> ApiError {
    match e.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
            let mut errors = ValidationErrors::new();
            errors.add("detail", duplicate_message);
            errors.into()
        }
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
            let mut errors = ValidationErrors::new();
            errors.add(reference_field, reference_message);
            errors.into()
        }
        _ => ApiError::Database(e),
    }
}
