use super::shutdown::ShutdownCoordinator;
use crate::errors::not_found;
use crate::http::{cors::create_cors_layer, security::security_headers};
use axum::{Router, http::StatusCode, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Assemble the public router around the already-stated API routes.
///
/// - OpenAPI document at `/api-docs/openapi.json`, served by Swagger UI
///   (`/swagger-ui`), ReDoc (`/redoc`), RapiDoc (`/rapidoc`) and Scalar (`/scalar`)
/// - `apis` nested under `/api`
/// - JSON 404 fallback
/// - request tracing, security headers, request timeout, compression
/// - CORS when `cors_allowed_origins` is non-empty
///
/// Health endpoints are merged by the caller with [`super::health_router`].
pub fn create_router<T>(apis: Router, server_config: &ServerConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            server_config.request_timeout,
        ))
        .layer(CompressionLayer::new());

    if server_config.cors_allowed_origins.is_empty() {
        info!("CORS disabled: CORS_ALLOWED_ORIGIN not set");
    } else {
        info!(origins = ?server_config.cors_allowed_origins, "CORS enabled");
        router = router.layer(create_cors_layer(&server_config.cors_allowed_origins)?);
    }

    Ok(router)
}

/// Serve `router` until SIGINT/SIGTERM, then run `cleanup` within
/// `shutdown_timeout`.
///
/// ```ignore
/// let cleanup = async move {
///     if let Err(e) = db.close().await {
///         tracing::error!("Error closing database pool: {}", e);
///     }
/// };
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::default();
    let mut shutdown_rx = coordinator.subscribe();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        // Sender dropped or signal received: either way, time to clean up
        let _ = shutdown_rx.recv().await;

        info!(timeout = ?shutdown_timeout, "Starting cleanup tasks");
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("Cleanup completed successfully"),
            Err(_) => tracing::warn!(
                "Cleanup exceeded timeout of {:?}, forcing shutdown",
                shutdown_timeout
            ),
        }
    });

    let signal_coordinator = coordinator.clone();
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { signal_coordinator.wait_for_signal().await })
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    // Covers the error path, where no signal was received
    coordinator.shutdown();
    cleanup_handle.await.ok();

    serve_result
}
