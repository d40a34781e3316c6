//! Admin console: list, block, unblock and delete accounts.
//!
//! Flow Overview:
//! 1) Resolve the identity and require `is_admin` (others go to `/user`).
//! 2) Apply the action to the target user, if it still exists.
//! 3) Redirect back to `/admin/users`. A missing target is a silent no-op, so
//!    repeating an action is always safe.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

use super::auth::{principal::require_admin, storage::delete_user_sessions};
use crate::{
    api::pages,
    identity::{User, UserRepo},
};

const ADMIN_USERS_PATH: &str = "/admin/users";

async fn fetch_users(pool: &SqlitePool) -> Result<Vec<User>, Response> {
    UserRepo::list_all(pool).await.map_err(|err| {
        error!("Failed to list users: {err:#}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Admin dashboard with the user list", content_type = "text/html", body = String),
        (status = 303, description = "No session (to /login) or not an admin (to /user)")
    ),
    tag = "admin"
)]
pub async fn admin_dashboard(headers: HeaderMap, pool: Extension<SqlitePool>) -> Response {
    let identity = match require_admin(&headers, &pool).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    match fetch_users(&pool).await {
        Ok(users) => pages::admin_dashboard(&identity, &users).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "User management table", content_type = "text/html", body = String),
        (status = 303, description = "No session (to /login) or not an admin (to /user)")
    ),
    tag = "admin"
)]
pub async fn admin_users(headers: HeaderMap, pool: Extension<SqlitePool>) -> Response {
    let identity = match require_admin(&headers, &pool).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    match fetch_users(&pool).await {
        Ok(users) => pages::admin_users(&identity, &users).into_response(),
        Err(response) => response,
    }
}

/// Flip `is_blocked` and, when blocking, revoke the user's sessions.
/// The password hash is left untouched.
async fn set_blocked(pool: &SqlitePool, user_id: i64, blocked: bool) -> anyhow::Result<()> {
    if !UserRepo::set_blocked(pool, user_id, blocked).await? {
        debug!(user_id, "block state change for missing user ignored");
        return Ok(());
    }

    if blocked {
        let revoked = delete_user_sessions(pool, user_id).await?;
        info!(user_id, revoked, "user blocked");
    } else {
        info!(user_id, "user unblocked");
    }

    Ok(())
}

async fn remove_user(pool: &SqlitePool, user_id: i64, admin_id: i64) -> anyhow::Result<()> {
    let Some(user) = UserRepo::find_by_id(pool, user_id).await? else {
        debug!(user_id, "delete of missing user ignored");
        return Ok(());
    };
    if UserRepo::delete(pool, &user).await? {
        info!(admin_id, user_id, "user deleted");
    }
    Ok(())
}

fn back_to_users(result: anyhow::Result<()>, action: &str) -> Response {
    match result {
        Ok(()) => Redirect::to(ADMIN_USERS_PATH).into_response(),
        Err(err) => {
            error!("Failed to {action} user: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/block_user/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 303, description = "User blocked (or missing), redirect to /admin/users"),
        (status = 400, description = "Invalid user id")
    ),
    tag = "admin"
)]
pub async fn block_user(
    Path(id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<SqlitePool>,
) -> Response {
    let admin = match require_admin(&headers, &pool).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    debug!(admin_id = admin.user_id, user_id = id, "block requested");
    back_to_users(set_blocked(&pool, id, true).await, "block")
}

#[utoipa::path(
    post,
    path = "/admin/unblock_user/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 303, description = "User unblocked (or missing), redirect to /admin/users"),
        (status = 400, description = "Invalid user id")
    ),
    tag = "admin"
)]
pub async fn unblock_user(
    Path(id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<SqlitePool>,
) -> Response {
    let admin = match require_admin(&headers, &pool).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    debug!(admin_id = admin.user_id, user_id = id, "unblock requested");
    back_to_users(set_blocked(&pool, id, false).await, "unblock")
}

#[utoipa::path(
    post,
    path = "/admin/delete_user/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 303, description = "User deleted (or missing), redirect to /admin/users"),
        (status = 400, description = "Invalid user id")
    ),
    tag = "admin"
)]
pub async fn delete_user(
    Path(id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<SqlitePool>,
) -> Response {
    let admin = match require_admin(&headers, &pool).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    back_to_users(remove_user(&pool, id, admin.user_id).await, "delete")
}
