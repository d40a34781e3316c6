use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;

use super::auth::principal::require_auth;
use crate::api::pages;

#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "User dashboard", content_type = "text/html", body = String),
        (status = 303, description = "No session, redirect to /login")
    ),
    tag = "pages"
)]
pub async fn user_dashboard(headers: HeaderMap, pool: Extension<SqlitePool>) -> Response {
    match require_auth(&headers, &pool).await {
        Ok(identity) => pages::user_dashboard(&identity).into_response(),
        Err(response) => response,
    }
}
