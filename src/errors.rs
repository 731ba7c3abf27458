// src/errors.rs - shared error taxonomy for all handlers
use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use log::error;
use serde::Serialize;
use thiserror::Error;

/// Field-level validation failures, collected so the client gets every
/// problem in one response instead of one at a time.
///
/// Errors that do not belong to a single field (e.g. start date after
/// end date) go under the `non_field_errors` key.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ValidationErrors {
    #[serde(flatten)]
    errors: BTreeMap<String, Vec<String>>,
}

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(|v| v.as_slice())
    }

    /// Ok(()) when nothing was collected, otherwise the full error set.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    // Also covers "exists but not visible to you": private records must
    // not be distinguishable from absent ones.
    #[error("not found")]
    NotFound,

    #[error("authentication required")]
    Unauthorized,

    #[error("you do not have permission to perform this action")]
    PermissionDenied,

    #[error("validation failed")]
    Validation(ValidationErrors),

    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ValidationErrors>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) | ApiError::Pool(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (message, errors) = match self {
            ApiError::Validation(errs) => ("validation failed".to_string(), Some(errs)),
            ApiError::Database(_) | ApiError::Pool(_) | ApiError::Internal(_) => {
                // log the detail, return an opaque message
                error!("internal error: {}", self);
                ("internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            status: "error",
            message,
            errors,
        })
    }
}
