//! UUID path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// Single `{id}` path segment parsed as a UUID.
///
/// Malformed ids are rejected with `400 INVALID_UUID` before the handler runs.
///
/// ```ignore
/// async fn get_event(UuidPath(id): UuidPath) -> String {
///     format!("event {id}")
/// }
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        Uuid::parse_str(&id)
            .map(UuidPath)
            .map_err(|_| AppError::InvalidUuid(format!("Invalid UUID: {}", id)))
    }
}
