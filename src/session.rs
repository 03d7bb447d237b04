use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, convert::Infallible, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    access::AccessLevel,
    config::{AppConfig, Env},
};

/// Claims
///
/// Payload of the bearer token issued by the console's identity service. Only the
/// subject is used; the role is always read from the session store so that a logout
/// takes effect before the token expires.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, used as the session store key.
    pub sub: Uuid,
    /// Expiration time; expired tokens are never accepted.
    pub exp: usize,
    /// Issued at.
    pub iat: usize,
}

/// SessionStore
///
/// Read side of the identity/session state owned by the login and logout flows. The
/// routing core only ever asks one question: what is this user's role right now.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Role of `user_id`, or `None` when there is no live session.
    async fn role_of(&self, user_id: Uuid) -> Option<AccessLevel>;
}

pub type SessionState = Arc<dyn SessionStore>;

/// Reads the role for an optional user once. Anything short of a live session is
/// `NotLogin`.
pub async fn current_role(store: &dyn SessionStore, user: Option<Uuid>) -> AccessLevel {
    match user {
        Some(id) => store.role_of(id).await.unwrap_or_default(),
        None => AccessLevel::NotLogin,
    }
}

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    role: AccessLevel,
    expires_at: Option<DateTime<Utc>>,
}

/// InMemorySessionStore
///
/// Process-local session table. Used by the server in local mode and by tests.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a login. With a `ttl` the session reads as absent once it elapses.
    pub async fn login(&self, user_id: Uuid, role: AccessLevel, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Utc::now() + ttl);
        self.sessions
            .write()
            .await
            .insert(user_id, SessionEntry { role, expires_at });
        tracing::info!(%user_id, %role, "session opened");
    }

    pub async fn logout(&self, user_id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&user_id).is_some();
        if removed {
            tracing::info!(%user_id, "session closed");
        }
        removed
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn role_of(&self, user_id: Uuid) -> Option<AccessLevel> {
        let entry = *self.sessions.read().await.get(&user_id)?;
        match entry.expires_at {
            Some(at) if at <= Utc::now() => None,
            _ => Some(entry.role),
        }
    }
}

/// Viewer
///
/// The identity behind a request, resolved to a single role snapshot. Extraction never
/// fails: a missing, malformed or expired token, or a user without a live session, all
/// produce an anonymous viewer with `AccessLevel::NotLogin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    /// The user the request speaks for, if any could be established.
    pub id: Option<Uuid>,
    /// Role snapshot taken once per request.
    pub role: AccessLevel,
}

impl Viewer {
    pub const ANONYMOUS: Viewer = Viewer {
        id: None,
        role: AccessLevel::NotLogin,
    };
}

/// Viewer Extractor Implementation
///
/// Resolves the viewer in four steps:
/// 1. Dependency Resolution: the session store and `AppConfig` from the app state.
/// 2. Local Bypass: in `Env::Local`, a UUID in the `x-user-id` header.
/// 3. Token Validation: Bearer token extraction and JWT decoding with `exp` checked.
/// 4. Session Lookup: the user's current role from the session store.
///
/// Rejection: none. Every failure degrades to `Viewer::ANONYMOUS` so the guard decides.
impl<S> FromRequestParts<S> for Viewer
where
    // S must allow sending across threads and sharing.
    S: Send + Sync,
    // Allows the extractor to pull the session store from the app state.
    SessionState: FromRef<S>,
    // Allows the extractor to pull the AppConfig (JWT secret and Env check).
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        let sessions = SessionState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 2. + 3. Local bypass, then the bearer token.
        let Some(user_id) = user_from_request(parts, &config) else {
            return Ok(Viewer::ANONYMOUS);
        };

        // 4. Session Lookup: a valid token without a live session is still anonymous.
        let role = current_role(sessions.as_ref(), Some(user_id)).await;
        Ok(Viewer {
            id: Some(user_id),
            role,
        })
    }
}

/// Finds the user id a request speaks for. In local mode the `x-user-id` header is
/// honoured ahead of the bearer token.
fn user_from_request(parts: &Parts, config: &AppConfig) -> Option<Uuid> {
    // Local Development Bypass. A bad header falls through to the token.
    if config.env == Env::Local {
        let bypass = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|id| Uuid::parse_str(id).ok());
        if bypass.is_some() {
            return bypass;
        }
    }

    // Token Extraction: only "Bearer " authorization is understood.
    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))?;

    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    // Expiration validation stays on regardless of library defaults.
    validation.validate_exp = true;

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            tracing::debug!(error = %e, "bearer token rejected, treating viewer as anonymous");
            None
        }
    }
}
