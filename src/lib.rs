use axum::{Router, extract::FromRef, http::HeaderName};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Routing core.
pub mod access;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod route;
pub mod sitemap;
pub mod view;

// HTTP surface and its collaborators.
pub mod config;
pub mod handlers;
pub mod models;
pub mod session;

// Module for routing segregation (API, Pages).
pub mod routes;
use routes::{pages, public};

// --- Public Re-exports ---

pub use access::AccessLevel;
pub use config::AppConfig;
pub use guard::{AccessGuard, GuardDecision, NO_ACCESS_PATH};
pub use navigation::{NavigationOutcome, Navigator};
pub use route::{Resolution, RouteDefinition, RouteMatch, RouteTable};
pub use session::{InMemorySessionStore, SessionState, SessionStore, Viewer};

/// ApiDoc
///
/// OpenAPI document for the JSON endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::list_routes, handlers::navigate),
    components(schemas(
        models::RouteSummary,
        models::NavigationResponse,
        navigation::NavigationOutcome,
        guard::GuardDecision,
        view::ViewDescriptor,
        view::Loading,
        access::AccessLevel,
    )),
    tags((name = "console-router", description = "Console page map and access guard"))
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable container for everything a request needs. The navigator carries the
/// route table and guard; the session store is pulled out separately by the `Viewer`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    /// Routing core: route table, access guard and the ticket counter.
    pub navigator: Arc<Navigator>,
    /// Session store: read by the `Viewer` extractor to resolve a role.
    pub sessions: SessionState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires a navigator around `table` using the same session store the extractor reads.
    pub fn new(table: RouteTable, sessions: SessionState, config: AppConfig) -> Self {
        // The redirect target follows the table's own reading of the base path.
        let guard = AccessGuard::mounted_at(&table.base_path());
        let navigator = Navigator::new(Arc::new(table), guard, sessions.clone());
        Self {
            navigator: Arc::new(navigator),
            sessions,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors such as `Viewer` pull single components out of the shared state.

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the HTTP surface: API routes, the guarded page fallback, the Swagger UI and
/// the observability layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public API: health, route listing and navigation decisions.
        .merge(public::public_routes())
        // Pages: anything left over is a console page and goes through the guard.
        .merge(pages::page_routes())
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a fresh UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with the ID from 3a.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (outermost)
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the layer above so
/// every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
