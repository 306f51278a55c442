pub mod codes;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// Every error leaving the API has this shape:
/// - `code`: integer error code for logs and dashboards (e.g., 1009)
/// - `error`: machine-readable identifier (e.g., "INVALID_TRANSITION")
/// - `message`: human-readable message
/// - `details`: optional structured details (validation field errors)
///
/// ```json
/// {
///   "code": 1009,
///   "error": "INVALID_TRANSITION",
///   "message": "Event is already approved",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details (e.g., validation field errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error type rendered as [`ErrorResponse`].
///
/// Domain crates convert their own error enums into this type; handlers
/// return `Result<_, AppError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// HTTP status this error is rendered with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::JsonExtractorRejection(_)
            | AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::InvalidUuid(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable error code reported to clients
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::JsonExtractorRejection(_) => ErrorCode::InvalidJson,
            AppError::ValidationError(_) | AppError::BadRequest(_) => ErrorCode::ValidationError,
            AppError::InvalidUuid(_) => ErrorCode::InvalidUuid,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::InvalidTransition(_) => ErrorCode::InvalidTransition,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        let (message, details) = match self {
            // Server-side failures are logged in full and reported generically
            AppError::Database(e) => {
                tracing::error!(error_code = code.code(), error = ?e, "Database error");
                (code.default_message().to_string(), None)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error_code = code.code(), "Internal server error: {}", msg);
                (code.default_message().to_string(), None)
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = code.code(), "JSON extraction error: {}", e);
                (e.body_text(), None)
            }
            AppError::ValidationError(e) => {
                tracing::info!(error_code = code.code(), "Validation error: {}", e);
                (
                    code.default_message().to_string(),
                    Some(validation_details(&e)),
                )
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(error_code = code.code(), "Service unavailable: {}", msg);
                (msg, None)
            }
            AppError::BadRequest(msg)
            | AppError::InvalidUuid(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidTransition(msg) => {
                tracing::info!(error_code = code.code(), status = status.as_u16(), "{}", msg);
                (msg, None)
            }
        };

        error_response(status, code, message, details)
    }
}

/// Field -> [{code, message, params}] map for validator errors
fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let entries: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(entries))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(details)
}

/// Build an [`ErrorResponse`] reply directly.
pub fn error_response(
    status: StatusCode,
    error_code: ErrorCode,
    message: String,
    details: Option<serde_json::Value>,
) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details,
    });

    (status, body).into_response()
}

/// Router fallback for unknown paths
pub async fn not_found() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::NotFound,
        "The requested resource was not found".to_string(),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: AppError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (AppError::Unauthorized("no token".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("nope".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidTransition("done".into()), StatusCode::CONFLICT),
            (AppError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::InternalServerError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected);
        }
    }

    #[tokio::test]
    async fn test_invalid_transition_body() {
        let (status, body) = body_of(AppError::InvalidTransition("Event is already approved".into())).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, 1009);
        assert_eq!(body.error, "INVALID_TRANSITION");
        assert_eq!(body.message, "Event is already approved");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (status, body) =
            body_of(AppError::InternalServerError("relation \"events\" does not exist".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "INTERNAL_ERROR");
        assert!(!body.message.contains("relation"));
    }

    #[tokio::test]
    async fn test_database_error_hides_detail() {
        let (status, body) = body_of(AppError::Database(DbErr::Custom("secret schema".into()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "DATABASE_ERROR");
        assert!(!body.message.contains("secret"));
    }

    #[tokio::test]
    async fn test_validation_errors_carry_details() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 1))]
            title: String,
        }

        let errors = Probe { title: String::new() }.validate().unwrap_err();
        let (status, body) = body_of(AppError::ValidationError(errors)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "VALIDATION_ERROR");
        assert!(body.details.unwrap().get("title").is_some());
    }
}
