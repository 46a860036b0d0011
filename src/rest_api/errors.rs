//! # REST API Errors
//!
//! Error types for the todo routes and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::response::{ErrorResponse, ValidationErrorResponse};
use crate::store::StoreError;
use crate::todo::FieldViolation;

/// Result type for REST operations
pub type RestResult<T> = Result<T, ApiError>;

/// REST API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Payload failed field validation; never reaches the store
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// Body could not be parsed
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// No todo with the requested id
    #[error("Todo not found")]
    NotFound,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store lookup or write failed. `expose` controls whether the
    /// underlying text is sent to the client.
    #[error("Server Error: {source}")]
    Store {
        #[source]
        source: StoreError,
        expose: bool,
    },

    /// The blocking task running the store call was cancelled
    #[error("Store task failed: {0}")]
    TaskFailed(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store { .. } | ApiError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Validation(errors) => {
                (status, Json(ValidationErrorResponse::new(errors))).into_response()
            }
            ApiError::InvalidBody(detail) => (
                status,
                Json(ErrorResponse::new("Invalid request body").with_error(detail)),
            )
                .into_response(),
            ApiError::NotFound => (status, Json(ErrorResponse::new("Todo not found"))).into_response(),
            ApiError::Store { source, expose } => {
                tracing::error!(error = %source, "store operation failed");
                let mut body = ErrorResponse::new("Server Error");
                if expose {
                    body = body.with_error(source.to_string());
                }
                (status, Json(body)).into_response()
            }
            ApiError::TaskFailed(detail) => {
                tracing::error!(error = %detail, "store task failed");
                (status, Json(ErrorResponse::new("Server Error"))).into_response()
            }
        }
    }
}

/// Catch-all for requests that match no route
pub async fn route_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Route not found"))).into_response()
}
