//! Readiness check against the real database connection.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use database::postgres::check_health;

/// Readiness check endpoint that pings PostgreSQL.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            check_health(&state.db)
                .await
                .map_err(|e| format!("Database ping failed: {}", e))
        }),
    )];

    run_health_checks(checks).await.into_response()
}
