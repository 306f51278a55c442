/// Database error type surfaced by probes
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Readiness probe could not reach the database
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),
}
