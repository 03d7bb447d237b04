use crate::{AppState, handlers};
use axum::Router;

/// Page Router Module
///
/// Every URL the API does not claim is a console page. The fallback runs the access
/// guard before anything is served, so gated pages are protected even when the SPA is
/// bypassed and the URL is requested directly.
pub fn page_routes() -> Router<AppState> {
    Router::new().fallback(handlers::render_page)
}
