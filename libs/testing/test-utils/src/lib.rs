//! Shared test utilities for the domain crates
//!
//! - `TestDatabase`: PostgreSQL container with the workspace migrations applied (feature: "postgres")
//! - `create_test_user`: seed owners and approvers that `events` rows reference
//!
//! # Usage
//!
//! Container-backed tests need Docker, so mark them `#[ignore]` and run them
//! with `cargo test -- --ignored`.
//!
//! ```rust,no_run
//! use test_utils::{SUPERVISOR, TestDatabase};
//! use uuid::Uuid;
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let supervisor = db.create_test_user(Uuid::now_v7(), SUPERVISOR).await;
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::{COORDENADOR, SUPERVISOR, TestDatabase};
