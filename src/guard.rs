use serde::Serialize;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{access::AccessLevel, route::Resolution};

/// Path every denied navigation is sent to.
pub const NO_ACCESS_PATH: &str = "/noAuth";

/// The guard's verdict for one navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS, ToSchema)]
#[serde(tag = "decision", rename_all = "camelCase")]
#[ts(export)]
pub enum GuardDecision {
    Allow,
    Redirect { to: String },
}

/// AccessGuard
///
/// Decides whether a resolved navigation may render. The decision is a total function
/// of (resolution, role): only an admin-gated route can redirect, and it does so for
/// every role below admin, including an absent session. Missing routes, public routes
/// and routes gated at any lower level are allowed.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    no_access: String,
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self {
            no_access: NO_ACCESS_PATH.to_string(),
        }
    }
}

impl AccessGuard {
    /// Builds a guard redirecting to the no-access page under `base` (`/` for none).
    /// `base` is read as a list of path components, so `console`, `/console` and
    /// `/console/` all mount at `/console`.
    pub fn mounted_at(base: &str) -> Self {
        let prefix: String = base
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| format!("/{s}"))
            .collect();
        Self {
            no_access: format!("{prefix}{NO_ACCESS_PATH}"),
        }
    }

    pub fn no_access_path(&self) -> &str {
        &self.no_access
    }

    pub fn decide(&self, target: &Resolution<'_>, role: AccessLevel) -> GuardDecision {
        let Some(required) = target.required_access() else {
            return GuardDecision::Allow;
        };

        let admin = AccessLevel::Admin.ordinal();
        if required.ordinal() < admin || role.ordinal() >= admin {
            GuardDecision::Allow
        } else {
            tracing::debug!(%required, %role, view = target.view(), "navigation denied");
            GuardDecision::Redirect {
                to: self.no_access.clone(),
            }
        }
    }
}
