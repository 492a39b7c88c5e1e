//! Authenticated-session precondition.
//!
//! Session resolution is an external concern: a [`SessionStore`] maps the
//! request's session token to a [`SessionUser`]. The [`resolve_session`]
//! middleware attaches the resolved user to the request extensions and never
//! rejects on its own; handlers that need a user take a [`CurrentUser`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ConfigError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Identity of the logged-in user, as supplied by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: u64,
    pub username: String,
    pub email: String,
}

/// Resolves session tokens to users.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn resolve(&self, token: &str) -> Option<SessionUser>;
}

/// Fixed token → user table, configured at startup.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessions {
    users: HashMap<String, SessionUser>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: &str, user: SessionUser) -> Self {
        self.users.insert(token.to_string(), user);
        self
    }

    /// Parse `token=id:username:email` entries separated by commas.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let mut sessions = Self::new();
        for entry in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let invalid = |message: &str| ConfigError::InvalidValue {
                key: "ONBOARDING_SESSIONS".into(),
                message: format!("{message} in entry {entry:?}"),
            };

            let (token, identity) = entry
                .split_once('=')
                .ok_or_else(|| invalid("expected token=id:username:email"))?;
            let mut parts = identity.splitn(3, ':');
            let (Some(id), Some(username), Some(email)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid("expected id:username:email"));
            };
            let token = token.trim();
            if token.is_empty() {
                return Err(invalid("empty token"));
            }
            let id: u64 = id.trim().parse().map_err(|_| invalid("id is not a number"))?;

            sessions.users.insert(
                token.to_string(),
                SessionUser {
                    id,
                    username: username.trim().to_string(),
                    email: email.trim().to_string(),
                },
            );
        }
        Ok(sessions)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn resolve(&self, token: &str) -> Option<SessionUser> {
        self.users.get(token).cloned()
    }
}

/// Extract the session token from `Authorization: Bearer` or the session
/// cookie, in that order.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|t| !t.is_empty())
}

/// Middleware: resolve the session and attach the user to the request.
pub async fn resolve_session(
    State(store): State<Arc<dyn SessionStore>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = session_token(req.headers()).map(str::to_owned);
    let user = match token {
        Some(token) => store.resolve(&token).await,
        None => None,
    };
    match user {
        Some(user) => {
            debug!(user_id = user.id, "Session resolved");
            req.extensions_mut().insert(user);
        }
        None => debug!(path = %req.uri().path(), "Request without a valid session"),
    }
    next.run(req).await
}

/// Extractor for handlers that require an authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ApiError::Unauthenticated)
    }
}
