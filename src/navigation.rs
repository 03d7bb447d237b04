use serde::Serialize;
use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    access::AccessLevel,
    guard::{AccessGuard, GuardDecision},
    route::{Resolution, RouteTable},
    session::{SessionState, current_role},
    view::ViewDescriptor,
};

/// NavigationOutcome
///
/// What the rendering host should do with one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS, ToSchema)]
#[serde(tag = "outcome", rename_all = "camelCase")]
#[ts(export)]
pub enum NavigationOutcome {
    /// Render `view` for the matched route, passing it the bound path parameters.
    Render {
        route: String,
        view: ViewDescriptor,
        params: BTreeMap<String, String>,
    },
    /// The guard refused; go to `to` instead.
    Redirect { to: String },
    /// No route matched; render the catch-all view.
    NotFound { path: String, view: ViewDescriptor },
    /// A later navigation started before this one was decided.
    Superseded,
}

/// Navigator
///
/// The navigation service handed to whatever triggers navigation. It owns no global
/// state: the table, guard and session store are passed in at construction, so tests
/// can swap the session store for a fake.
///
/// Each call to [`Navigator::navigate`] takes a ticket. When the decision is ready the
/// ticket is compared with the newest one handed out; a stale decision is reported as
/// [`NavigationOutcome::Superseded`] and must not be acted on.
pub struct Navigator {
    table: Arc<RouteTable>,
    guard: AccessGuard,
    sessions: SessionState,
    latest: AtomicU64,
}

impl Navigator {
    pub fn new(table: Arc<RouteTable>, guard: AccessGuard, sessions: SessionState) -> Self {
        Self {
            table,
            guard,
            sessions,
            latest: AtomicU64::new(0),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// navigate
    ///
    /// Resolves `path` for `user`, reading the user's role from the session store exactly
    /// once. Later navigations win over this one if they start before it completes.
    pub async fn navigate(&self, path: &str, user: Option<Uuid>) -> NavigationOutcome {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let role = current_role(self.sessions.as_ref(), user).await;
        let outcome = self.evaluate(path, role);

        if self.latest.load(Ordering::SeqCst) != ticket {
            tracing::trace!(path, ticket, "navigation superseded");
            return NavigationOutcome::Superseded;
        }
        outcome
    }

    /// evaluate
    ///
    /// The same pipeline as [`Navigator::navigate`] for an already known role, without
    /// ticketing. Used where every request is its own navigation.
    pub fn evaluate(&self, path: &str, role: AccessLevel) -> NavigationOutcome {
        let resolution = self.table.resolve(path);

        if let GuardDecision::Redirect { to } = self.guard.decide(&resolution, role) {
            return NavigationOutcome::Redirect { to };
        }

        let view = self.table.load_view(&resolution);
        match resolution {
            Resolution::Matched(m) => NavigationOutcome::Render {
                route: m.route.name.clone(),
                view,
                params: m.params,
            },
            Resolution::NotFound { path, .. } => NavigationOutcome::NotFound { path, view },
        }
    }
}
