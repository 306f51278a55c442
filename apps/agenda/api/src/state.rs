//! Application state management.
//!
//! The state contains the configuration, the PostgreSQL pool and the token
//! issuer shared by the auth routes and the JWT middleware.

use axum_helpers::JwtAuth;

/// Shared application state.
///
/// Cloned for each router (inexpensive Arc clones inside the pool and keys).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Signs and verifies access tokens
    pub jwt: JwtAuth,
}
