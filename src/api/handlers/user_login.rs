use axum::{
    extract::{rejection::FormRejection, Extension, Form},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use super::auth::{
    credentials::{authenticate, LoginOutcome},
    principal::{dashboard_path, resolve_identity},
    session::start_session,
    AuthState,
};
use crate::api::pages;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const ACCOUNT_BLOCKED: &str = "Account is blocked";

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginForm {
    username: String,
    #[schema(value_type = String, format = Password)]
    password: SecretString,
}

/// Already-authenticated requests skip the form and go to their dashboard.
async fn redirect_if_authenticated(headers: &HeaderMap, pool: &SqlitePool) -> Option<Response> {
    match resolve_identity(headers, pool).await {
        Ok(Some(identity)) => Some(Redirect::to(identity.dashboard_path()).into_response()),
        Ok(None) => None,
        Err(status) => Some(status.into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login form", content_type = "text/html", body = String),
        (status = 303, description = "Already authenticated, redirect to the role dashboard")
    ),
    tag = "auth"
)]
pub async fn login_form(headers: HeaderMap, pool: Extension<SqlitePool>) -> Response {
    if let Some(response) = redirect_if_authenticated(&headers, &pool).await {
        return response;
    }
    pages::login(None, "").into_response()
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Authenticated, session cookie set, redirect to /admin or /user"),
        (status = 400, description = "Missing form fields", content_type = "text/html", body = String),
        (status = 401, description = "Invalid credentials", content_type = "text/html", body = String),
        (status = 403, description = "Account is blocked", content_type = "text/html", body = String)
    ),
    tag = "auth"
)]
#[instrument(skip(headers, pool, auth_state, payload))]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<SqlitePool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    if let Some(response) = redirect_if_authenticated(&headers, &pool).await {
        return response;
    }

    let Ok(Form(form)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            pages::login(Some("Username and password are required"), ""),
        )
            .into_response();
    };

    let user = match authenticate(&pool, &form.username, form.password.expose_secret()).await {
        Ok(LoginOutcome::Authenticated(user)) => user,
        Ok(LoginOutcome::InvalidCredentials) => {
            info!("login failed: invalid credentials");
            return (
                StatusCode::UNAUTHORIZED,
                pages::login(Some(INVALID_CREDENTIALS), &form.username),
            )
                .into_response();
        }
        Ok(LoginOutcome::Blocked) => {
            warn!(username = %form.username, "login rejected: account is blocked");
            return (
                StatusCode::FORBIDDEN,
                pages::login(Some(ACCOUNT_BLOCKED), &form.username),
            )
                .into_response();
        }
        Err(err) => {
            error!("Failed to authenticate user: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cookie = match start_session(&pool, &auth_state, user.id).await {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to start session: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    info!(user_id = user.id, is_admin = user.is_admin, "user logged in");

    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);
    (response_headers, Redirect::to(dashboard_path(user.is_admin))).into_response()
}
