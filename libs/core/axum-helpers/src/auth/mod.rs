//! Stateless JWT authentication.
//!
//! - [`JwtAuth`] signs and verifies HS256 access tokens
//! - [`jwt_auth_middleware`] rejects requests without a valid token and
//!   stores the verified [`JwtClaims`] in the request extensions
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/events/my-events", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::{extract_token_from_headers, jwt_auth_middleware};
