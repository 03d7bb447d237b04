use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::{access::AccessLevel, navigation::NavigationOutcome, route::RouteTable, view::Loading};

// --- Response Schemas ---

/// RouteSummary
///
/// One entry of the page map as published to the SPA (GET /api/routes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteSummary {
    pub path: String,
    pub name: String,
    pub view: String,
    pub loading: Loading,
    // Absent for public pages.
    pub access: Option<AccessLevel>,
}

impl RouteSummary {
    pub fn list(table: &RouteTable) -> Vec<RouteSummary> {
        table
            .iter()
            .map(|route| RouteSummary {
                path: route.path.clone(),
                name: route.name.clone(),
                view: route.view.clone(),
                loading: table.views().loading(&route.view).unwrap_or(Loading::Eager),
                access: route.access,
            })
            .collect()
    }
}

/// NavigationResponse
///
/// Result of GET /api/navigate: the role the decision was made with, and the decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationResponse {
    pub role: AccessLevel,
    pub navigation: NavigationOutcome,
}

// --- Request Parameters ---

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NavigateQuery {
    /// Target path, including any base path the console is mounted under.
    pub path: String,
}
