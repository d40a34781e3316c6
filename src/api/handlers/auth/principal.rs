//! Request identity and route access policies.
//!
//! Flow Overview: read the session cookie, resolve it to a user, and hand the
//! identity (or none) to the handler. Policies answer with a redirect rather
//! than an error page: anonymous requests go to `/login`, authenticated
//! non-admins on admin routes go to `/user`.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::session::authenticate_session;
use crate::identity::User;

pub(crate) const LOGIN_PATH: &str = "/login";
pub(crate) const USER_DASHBOARD_PATH: &str = "/user";
pub(crate) const ADMIN_DASHBOARD_PATH: &str = "/admin";

/// A user bound to the current session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
    pub is_blocked: bool,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            is_blocked: user.is_blocked,
        }
    }
}

impl Identity {
    /// Where this identity lands after login.
    #[must_use]
    pub fn dashboard_path(&self) -> &'static str {
        dashboard_path(self.is_admin)
    }
}

#[must_use]
pub(crate) const fn dashboard_path(is_admin: bool) -> &'static str {
    if is_admin {
        ADMIN_DASHBOARD_PATH
    } else {
        USER_DASHBOARD_PATH
    }
}

/// Resolve the request's identity. Blocked users resolve as anonymous.
pub async fn resolve_identity(
    headers: &HeaderMap,
    pool: &SqlitePool,
) -> Result<Option<Identity>, StatusCode> {
    match authenticate_session(headers, pool).await? {
        Some(identity) if identity.is_blocked => {
            warn!(user_id = identity.user_id, "session of blocked user rejected");
            Ok(None)
        }
        other => Ok(other),
    }
}

/// Any authenticated identity; anonymous requests are redirected to `/login`.
pub async fn require_auth(headers: &HeaderMap, pool: &SqlitePool) -> Result<Identity, Response> {
    match resolve_identity(headers, pool).await {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => {
            debug!("unauthenticated request redirected to login");
            Err(Redirect::to(LOGIN_PATH).into_response())
        }
        Err(status) => Err(status.into_response()),
    }
}

/// An authenticated admin; other identities are redirected to `/user`.
pub async fn require_admin(headers: &HeaderMap, pool: &SqlitePool) -> Result<Identity, Response> {
    let identity = require_auth(headers, pool).await?;
    if identity.is_admin {
        Ok(identity)
    } else {
        warn!(
            user_id = identity.user_id,
            "non-admin access to admin route redirected"
        );
        Err(Redirect::to(USER_DASHBOARD_PATH).into_response())
    }
}
