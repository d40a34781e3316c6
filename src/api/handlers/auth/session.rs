//! Session cookies: issue, resolve and clear.

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Redirect},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::{
    principal::{resolve_identity, Identity},
    state::{AuthConfig, AuthState},
    storage::{delete_session, insert_session, lookup_session},
    utils::hash_session_token,
};

pub(crate) const SESSION_COOKIE_NAME: &str = "gatehouse_session";

/// Resolve the session cookie into the user it belongs to.
///
/// Returns `Ok(None)` when the cookie is missing, unknown or expired.
pub(crate) async fn authenticate_session(
    headers: &HeaderMap,
    pool: &SqlitePool,
) -> Result<Option<Identity>, StatusCode> {
    let Some(token) = extract_session_token(headers) else {
        return Ok(None);
    };
    // Only the hash is stored; never compare raw tokens against the database.
    let token_hash = hash_session_token(&token);
    match lookup_session(pool, &token_hash).await {
        Ok(user) => Ok(user.map(Identity::from)),
        Err(err) => {
            error!("Failed to lookup session: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Open a session for `user_id` and build the `Set-Cookie` value carrying it.
pub(crate) async fn start_session(
    pool: &SqlitePool,
    auth_state: &AuthState,
    user_id: i64,
) -> Result<HeaderValue> {
    let config = auth_state.config();
    let token = insert_session(pool, user_id, config.session_ttl_seconds()).await?;
    session_cookie(config, &token).context("failed to build session cookie")
}

#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 303, description = "Session cleared, redirect to /login")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    pool: Extension<SqlitePool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    // Anonymous callers (missing, expired or blocked session) still get the
    // cookie cleared; only a lookup failure aborts.
    let identity = match resolve_identity(&headers, &pool).await {
        Ok(identity) => identity,
        Err(status) => return status.into_response(),
    };

    if let Some(token) = extract_session_token(&headers) {
        let token_hash = hash_session_token(&token);
        if let Err(err) = delete_session(&pool, &token_hash).await {
            error!("Failed to delete session: {err}");
        }
    }

    match identity {
        Some(identity) => info!(user_id = identity.user_id, "user logged out"),
        None => debug!("logout without an active session"),
    }

    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(auth_state.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (response_headers, Redirect::to("/login")).into_response()
}

/// Build an `HttpOnly` cookie for the session token.
fn session_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().map(str::trim);
            let val = parts.next().map(str::trim);
            if let (Some(SESSION_COOKIE_NAME), Some(val)) = (key, val) {
                if !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(cookie: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(cookie));
        headers
    }

    #[test]
    fn extract_session_token_finds_named_cookie() {
        let headers = headers_with_cookie("theme=dark; gatehouse_session=abc123; lang=en");
        assert_eq!(extract_session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn extract_session_token_ignores_missing_or_empty() {
        assert_eq!(extract_session_token(&HeaderMap::new()), None);
        assert_eq!(
            extract_session_token(&headers_with_cookie("theme=dark")),
            None
        );
        assert_eq!(
            extract_session_token(&headers_with_cookie("gatehouse_session=")),
            None
        );
    }

    #[test]
    fn session_cookie_attributes() {
        let config = AuthConfig::new().with_session_ttl_seconds(90);
        let cookie = session_cookie(&config, "tok").ok();
        let cookie = cookie.as_ref().and_then(|value| value.to_str().ok());
        assert_eq!(
            cookie,
            Some("gatehouse_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=90")
        );
    }

    #[test]
    fn secure_flag_follows_config() {
        let config = AuthConfig::new().with_session_cookie_secure(true);
        let set = session_cookie(&config, "tok").ok();
        let cleared = clear_session_cookie(&config).ok();
        for value in [set, cleared] {
            let text = value.as_ref().and_then(|value| value.to_str().ok());
            assert!(text.is_some_and(|text| text.ends_with("; Secure")));
        }
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cleared = clear_session_cookie(&AuthConfig::new()).ok();
        let text = cleared.as_ref().and_then(|value| value.to_str().ok());
        assert!(text.is_some_and(|text| text.contains("Max-Age=0")));
    }
}
