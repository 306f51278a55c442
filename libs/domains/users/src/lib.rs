//! Users Domain
//!
//! Accounts, roles and the identity attached to every authenticated request.
//!
//! # Features
//!
//! - Registration and login with Argon2 password hashes
//! - Stateless HS256 access tokens (issued through `axum_helpers::JwtAuth`)
//! - Closed role set: `coordenador` and `supervisor` (`admin` is accepted as an alias)
//! - Supervisor-only user listing and role changes
//! - [`CurrentUser`] extractor resolving a verified token into an [`Identity`]
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (auth + users routers)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Password policy, hashing, token issuing, role checks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory / Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{InMemoryUserRepository, UserService, handlers};
//! use std::sync::Arc;
//!
//! let jwt = JwtAuth::new(&JwtConfig::new("a-development-secret-of-32-chars!").unwrap());
//! let service = Arc::new(UserService::new(InMemoryUserRepository::new(), jwt));
//!
//! let auth_routes = handlers::auth_router(service.clone());
//! let user_routes = handlers::users_router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use identity::{CurrentUser, Identity};
pub use models::{
    AuthResponse, LoginRequest, RegisterRequest, Role, UpdateRoleRequest, User, UserResponse,
};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
