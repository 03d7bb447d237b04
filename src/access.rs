use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

/// AccessLevel
///
/// The privilege ladder of the console. Each variant carries an explicit ordinal and
/// levels are compared by that ordinal, so a new intermediate role slots in between
/// existing ones without changing any comparison site.
///
/// Wire form matches the frontend's `ACCESS_ENUM`: `"notLogin"`, `"user"`, `"admin"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum AccessLevel {
    /// No session, or an expired one.
    #[default]
    NotLogin = 0,
    User = 1,
    Admin = 2,
}

impl AccessLevel {
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AccessLevel::NotLogin => "notLogin",
            AccessLevel::User => "user",
            AccessLevel::Admin => "admin",
        }
    }
}

impl PartialOrd for AccessLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AccessLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string does not name a known level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown access level: {0}")]
pub struct UnknownAccessLevel(pub String);

impl FromStr for AccessLevel {
    type Err = UnknownAccessLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notLogin" => Ok(AccessLevel::NotLogin),
            "user" => Ok(AccessLevel::User),
            "admin" => Ok(AccessLevel::Admin),
            other => Err(UnknownAccessLevel(other.to_string())),
        }
    }
}
