//! Event domain error types

use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::EventStatus;

/// Result type for event operations
pub type EventResult<T> = Result<T, EventError>;

/// Event domain errors
#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Not allowed: {0}")]
    Unauthorized(String),

    #[error("Event not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Event {id} is already {status}")]
    InvalidTransition { id: Uuid, status: EventStatus },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EventError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }
}

/// Convert EventError to AppError for standardized error responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Unauthenticated => {
                AppError::Unauthorized("Authentication required".to_string())
            }
            EventError::Unauthorized(reason) => AppError::Forbidden(reason),
            EventError::NotFound(id) => AppError::NotFound(format!("Event {} not found", id)),
            EventError::Validation(msg) => AppError::BadRequest(msg),
            EventError::InvalidTransition { id, status } => {
                AppError::InvalidTransition(format!("Event {} is already {}", id, status))
            }
            EventError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
