//! Request identity.
//!
//! [`jwt_auth_middleware`](axum_helpers::jwt_auth_middleware) verifies the
//! token and stores its [`JwtClaims`] in the request extensions; [`CurrentUser`]
//! turns those claims into an [`Identity`]. Claims are only ever read after
//! the signature and expiry have been checked.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_helpers::{AppError, JwtClaims};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::UserError;
use crate::models::Role;

/// Verified user attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Identity {
    pub fn is_supervisor(&self) -> bool {
        self.role == Role::Supervisor
    }
}

impl TryFrom<&JwtClaims> for Identity {
    type Error = UserError;

    fn try_from(claims: &JwtClaims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| UserError::Unauthenticated)?;
        let role = Role::from_str(&claims.role).map_err(|_| UserError::Unauthenticated)?;

        Ok(Self {
            user_id,
            email: claims.email.clone(),
            name: claims.name.clone(),
            role,
        })
    }
}

/// Extractor for the authenticated caller.
///
/// Must run behind `jwt_auth_middleware`; without verified claims in the
/// request it rejects with 401.
///
/// ```ignore
/// async fn my_events(CurrentUser(identity): CurrentUser) -> String {
///     identity.email
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

        Identity::try_from(claims).map(CurrentUser).map_err(|_| {
            tracing::debug!(sub = %claims.sub, role = %claims.role, "Rejected token claims");
            AppError::Unauthorized("Invalid token claims".to_string())
        })
    }
}
