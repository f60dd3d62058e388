//! API Routes
//!
//! Configures the Axum router with all demo server endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, remove_sample_handler, sample_by_id_handler, sample_exists_handler,
    samples_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /samples` - Memoized sample list
/// - `GET /samples/:id` - Memoized sample by id
/// - `DELETE /samples/:id` - Drop a memoized sample
/// - `GET /samples/:id/exists` - Whether a sample is memoized
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/samples", get(samples_handler))
        .route(
            "/samples/:id",
            get(sample_by_id_handler).delete(remove_sample_handler),
        )
        .route("/samples/:id/exists", get(sample_exists_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
