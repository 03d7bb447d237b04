use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints open to every client, logged in or not. The navigation endpoint still
/// resolves the viewer, but an anonymous viewer is a valid input, not a rejection.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /api/routes
        // The page map with access metadata.
        .route("/api/routes", get(handlers::list_routes))
        // GET /api/navigate?path=...
        // Guard decision for a path, as JSON.
        .route("/api/navigate", get(handlers::navigate))
}
