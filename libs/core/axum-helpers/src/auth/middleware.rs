use super::jwt::JwtAuth;
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

/// Token from `Authorization: Bearer <token>`, falling back to the
/// `access_token` cookie
pub fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == "access_token" && !value.is_empty()).then(|| value.to_string())
                    })
                })
        })
}

/// JWT authentication middleware
///
/// Rejects with 401 when the token is missing, badly signed or expired.
/// On success the verified `JwtClaims` are inserted into request extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token_from_headers(request.headers()) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return Err(AppError::Unauthorized("No token provided".to_string()));
    };

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!(error = %e, "JWT verification failed");
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
