use crate::{
    AppState,
    models::{NavigateQuery, NavigationResponse, RouteSummary},
    navigation::NavigationOutcome,
    session::Viewer,
};
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};

// --- Handlers ---

/// list_routes
///
/// [Public Route] Publishes the page map, in registration order, so the SPA can build
/// its menus and know which entries are gated.
#[utoipa::path(
    get,
    path = "/api/routes",
    responses((status = 200, description = "Page map", body = [RouteSummary]))
)]
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    Json(RouteSummary::list(state.navigator.table()))
}

/// navigate
///
/// [Public Route] Runs the guard for `path` on behalf of the requesting viewer and
/// returns the decision without acting on it.
#[utoipa::path(
    get,
    path = "/api/navigate",
    params(NavigateQuery),
    responses((status = 200, description = "Navigation decision", body = NavigationResponse))
)]
pub async fn navigate(
    viewer: Viewer,
    State(state): State<AppState>,
    Query(query): Query<NavigateQuery>,
) -> Json<NavigationResponse> {
    let navigation = state.navigator.evaluate(&query.path, viewer.role);
    Json(NavigationResponse {
        role: viewer.role,
        navigation,
    })
}

/// render_page
///
/// [Page Fallback] Serves every console URL not claimed by the API. Denied pages answer
/// with a temporary redirect to the no-access page, unknown pages with 404 and the
/// catch-all view, everything else with the view to mount.
pub async fn render_page(viewer: Viewer, State(state): State<AppState>, uri: Uri) -> Response {
    match state.navigator.evaluate(uri.path(), viewer.role) {
        NavigationOutcome::Redirect { to } => Redirect::temporary(&to).into_response(),
        outcome @ NavigationOutcome::NotFound { .. } => {
            (StatusCode::NOT_FOUND, Json(outcome)).into_response()
        }
        outcome @ NavigationOutcome::Render { .. } => Json(outcome).into_response(),
        // `evaluate` takes no ticket, so nothing can supersede it.
        NavigationOutcome::Superseded => StatusCode::CONFLICT.into_response(),
    }
}
