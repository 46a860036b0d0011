//! # Response Envelopes
//!
//! Every body carries `success`. Successful responses add `data` (and `count`
//! for lists) or a `message`; failures add a `message` or the list of field
//! `errors`.

use serde::Serialize;

use crate::todo::FieldViolation;

/// List response
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            success: true,
            count,
            data,
        }
    }
}

/// Single record response
#[derive(Debug, Clone, Serialize)]
pub struct SingleResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> SingleResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Success with a message and no data
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Failure with a message and, when exposed, the underlying error text
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Failure listing every rejected field
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub success: bool,
    pub errors: Vec<FieldViolation>,
}

impl ValidationErrorResponse {
    pub fn new(errors: Vec<FieldViolation>) -> Self {
        Self {
            success: false,
            errors,
        }
    }
}
