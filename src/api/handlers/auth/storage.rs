//! Database helpers for session state.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{info_span, Instrument};

use super::utils::{generate_session_token, hash_session_token, now_unix_seconds};
use crate::identity::User;

/// Create a session for `user_id` and return the raw token for the cookie.
pub(crate) async fn insert_session(
    pool: &SqlitePool,
    user_id: i64,
    ttl_seconds: i64,
) -> Result<String> {
    let token = generate_session_token()?;
    let token_hash = hash_session_token(&token);
    let now = now_unix_seconds();

    let query = r"
        INSERT INTO sessions (token_hash, user_id, created_at_unix, expires_at_unix)
        VALUES (?1, ?2, ?3, ?4)
    ";
    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .bind(user_id)
        .bind(now)
        .bind(now.saturating_add(ttl_seconds))
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to insert session")?;

    Ok(token)
}

/// Resolve a session hash to its user, ignoring expired sessions.
pub(crate) async fn lookup_session(pool: &SqlitePool, token_hash: &[u8]) -> Result<Option<User>> {
    let query = r"
        SELECT u.id, u.username, u.password_hash, u.is_admin, u.is_blocked
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = ?1 AND s.expires_at_unix > ?2
    ";
    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, User>(query)
        .bind(token_hash)
        .bind(now_unix_seconds())
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")
}

pub(crate) async fn delete_session(pool: &SqlitePool, token_hash: &[u8]) -> Result<()> {
    let query = "DELETE FROM sessions WHERE token_hash = ?1";
    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete session")?;
    Ok(())
}

/// Revoke every session of a user. Returns how many were removed.
pub(crate) async fn delete_user_sessions(pool: &SqlitePool, user_id: i64) -> Result<u64> {
    let query = "DELETE FROM sessions WHERE user_id = ?1";
    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete user sessions")?;
    Ok(result.rows_affected())
}
