//! # Axum Helpers
//!
//! Shared HTTP plumbing for the agenda services.
//!
//! ## Modules
//!
//! - **[`auth`]**: stateless HS256 JWT issuing and verification middleware
//! - **[`server`]**: router assembly with API docs, health, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: `AppError` and the `ErrorResponse` wire format
//! - **[`extractors`]**: UUID path, query string and validated JSON extractors
//! - **[`audit`]**: audit trail on the `audit` tracing target
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{app_info, server::ServerConfig};
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! let config = ServerConfig::default();
//! let router = create_router::<ApiDoc>(api_routes, &config)?.merge(health_router(app_info!()));
//! create_production_app(router, &config, Duration::from_secs(30), async {}).await?;
//! ```

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{JwtAuth, JwtClaims, JwtConfig, jwt_auth_middleware};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{QueryParams, UuidPath, ValidatedJson};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
