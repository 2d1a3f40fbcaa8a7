//! HTTP server for the measurement runner.
//!
//! This module exposes the measurement registry for external
//! orchestration. The server supports health checks, collecting a single
//! sample for a variant, and graceful shutdown.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pacebench_core::protocol::{
    CollectSampleRequest, CollectSampleResponse, HealthResponse, ShutdownResponse,
};
use tokio::sync::watch;

use crate::MeasureRegistry;

/// Shared state for the HTTP server.
struct AppState {
    /// The registry containing all registered measurement functions.
    registry: Arc<MeasureRegistry>,
    /// Sender to signal shutdown.
    shutdown_tx: watch::Sender<bool>,
}

/// Health check endpoint.
///
/// GET /health
/// Returns: { "status": "healthy" }
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Collect a single timing sample for a variant.
///
/// POST /collect
/// Body: { "variant": { "name": "...", ... } }
/// Returns: { "millis": ..., "bytes_sent": ..., "success": true/false, "error": "..." }
async fn collect(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CollectSampleRequest>,
) -> impl IntoResponse {
    match state.registry.measure(&request.variant) {
        Some(Ok(measurement)) => {
            eprintln!(
                "[runner] Measured '{}': {:.3}ms",
                request.variant.name, measurement.millis
            );
            (
                StatusCode::OK,
                Json(CollectSampleResponse::success(measurement)),
            )
                .into_response()
        }
        Some(Err(error)) => {
            eprintln!(
                "[runner] Measurement failed for '{}': {}",
                request.variant.name, error
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CollectSampleResponse::failure(error)),
            )
                .into_response()
        }
        None => {
            eprintln!("[runner] No measurer for variant '{}'", request.variant.name);
            (
                StatusCode::NOT_FOUND,
                Json(CollectSampleResponse::failure(format!(
                    "No measurer registered for variant '{}'",
                    request.variant.name
                ))),
            )
                .into_response()
        }
    }
}

/// Trigger graceful shutdown of the server.
///
/// POST /shutdown
/// Returns: { "status": "shutting_down" }
async fn shutdown(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Signal shutdown to the server
    let _ = state.shutdown_tx.send(true);
    (StatusCode::OK, Json(ShutdownResponse::acknowledged()))
}

/// Build the router with all endpoints.
fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/collect", post(collect))
        .route("/shutdown", post(shutdown))
        .with_state(state)
}

/// Run the runner HTTP server.
///
/// This function starts an HTTP server on the specified port and blocks
/// until shutdown is requested via the `/shutdown` endpoint.
///
/// # Arguments
///
/// * `registry` - The registry containing all measurement functions
/// * `port` - The port to listen on (binds to 0.0.0.0)
///
/// # Errors
///
/// Returns an error if the server fails to bind or encounters a runtime
/// error.
///
/// # Example
///
/// ```ignore
/// use pacebench_runner::{MeasureRegistry, run_runner};
///
/// let mut registry = MeasureRegistry::new();
/// registry.register("http://localhost:8080/", |variant| {
///     // ... load the page and time it ...
///     Ok(Measurement { millis: 12.5, bytes_sent: 4096 })
/// });
///
/// // This will block until /shutdown is called. The pacebench CLI sets
/// // the PB_PORT environment variable when it spawns a runner binary.
/// run_runner(registry, 9400).unwrap();
/// ```
pub fn run_runner(registry: MeasureRegistry, port: u16) -> anyhow::Result<()> {
    // Create a tokio runtime for the async server
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_runner_async(registry, port).await })
}

/// Async implementation of the runner server.
///
/// Use this when you're already in a tokio runtime (e.g., in async tests).
/// For standalone use, prefer `run_runner` which creates its own runtime.
pub async fn run_runner_async(registry: MeasureRegistry, port: u16) -> anyhow::Result<()> {
    // Create shutdown channel
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    // Create shared state
    let state = Arc::new(AppState {
        registry: Arc::new(registry),
        shutdown_tx,
    });

    // Build the router
    let app = build_router(state);

    // Create the listener
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    eprintln!("Measurement runner listening on {}", addr);

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // Wait for shutdown signal
            while !*shutdown_rx.borrow() {
                if shutdown_rx.changed().await.is_err() {
                    break;
                }
            }
            eprintln!("Shutting down measurement runner");
        })
        .await?;

    Ok(())
}
