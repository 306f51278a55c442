//! JSON extractor with `validator` checks.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that is deserialized and then validated.
///
/// Both malformed bodies (unknown enum values, unknown fields, bad dates) and
/// failed `Validate` rules are rejected with 400.
///
/// ```ignore
/// async fn create(ValidatedJson(input): ValidatedJson<CreateEvent>) -> impl IntoResponse {
///     // input.validate() already passed
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
