use super::{crypto, models::User};
use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{info_span, Instrument, Span};

/// Outcome when attempting to create a new user.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(User),
    DuplicateUsername,
}

pub struct UserRepo;

fn query_span(operation: &'static str, statement: &'static str) -> Span {
    info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

impl UserRepo {
    /// Hash the password and insert a non-admin, unblocked user.
    ///
    /// Uniqueness is enforced by the `UNIQUE` constraint, so two concurrent
    /// registrations for the same name cannot both succeed.
    ///
    /// # Errors
    /// Returns an error if hashing or the insert fails for any reason other
    /// than a duplicate username.
    pub async fn create(pool: &SqlitePool, username: &str, password: &str) -> Result<CreateOutcome> {
        let password_hash = crypto::hash_password(password)?;

        let query = r"
            INSERT INTO users (username, password_hash, is_admin, is_blocked)
            VALUES (?1, ?2, 0, 0)
            RETURNING id, username, password_hash, is_admin, is_blocked
        ";
        let result = sqlx::query_as::<_, User>(query)
            .bind(username)
            .bind(&password_hash)
            .fetch_one(pool)
            .instrument(query_span("INSERT", query))
            .await;

        match result {
            Ok(user) => Ok(CreateOutcome::Created(user)),
            Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::DuplicateUsername),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
        let query = "SELECT id, username, password_hash, is_admin, is_blocked FROM users WHERE username = ?1";
        sqlx::query_as::<_, User>(query)
            .bind(username)
            .fetch_optional(pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup user by username")
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
        let query =
            "SELECT id, username, password_hash, is_admin, is_blocked FROM users WHERE id = ?1";
        sqlx::query_as::<_, User>(query)
            .bind(id)
            .fetch_optional(pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup user by id")
    }

    /// All users in insertion order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<User>> {
        let query = "SELECT id, username, password_hash, is_admin, is_blocked FROM users ORDER BY id";
        sqlx::query_as::<_, User>(query)
            .fetch_all(pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to list users")
    }

    /// Persist the mutable columns of `user`. Returns `false` when the row is gone.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn update(pool: &SqlitePool, user: &User) -> Result<bool> {
        let query = r"
            UPDATE users
            SET username = ?1, password_hash = ?2, is_admin = ?3, is_blocked = ?4
            WHERE id = ?5
        ";
        let result = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.is_admin)
            .bind(user.is_blocked)
            .bind(user.id)
            .execute(pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update user")?;

        Ok(result.rows_affected() > 0)
    }

    /// Permanently remove `user`; their sessions go with it. Returns `false`
    /// when the row was already gone.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn delete(pool: &SqlitePool, user: &User) -> Result<bool> {
        let query = "DELETE FROM users WHERE id = ?1";
        let result = sqlx::query(query)
            .bind(user.id)
            .execute(pool)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to delete user")?;

        Ok(result.rows_affected() > 0)
    }

    /// Set `is_blocked` alone, leaving every other column as stored.
    /// Returns `false` when no user has that id.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn set_blocked(pool: &SqlitePool, id: i64, is_blocked: bool) -> Result<bool> {
        let query = "UPDATE users SET is_blocked = ?1 WHERE id = ?2";
        let result = sqlx::query(query)
            .bind(is_blocked)
            .bind(id)
            .execute(pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update user block state")?;

        Ok(result.rows_affected() > 0)
    }

    /// Grant or revoke admin rights by username. Only reachable from the CLI.
    ///
    /// Returns `None` when no such user exists.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn set_admin(
        pool: &SqlitePool,
        username: &str,
        is_admin: bool,
    ) -> Result<Option<User>> {
        let query = r"
            UPDATE users SET is_admin = ?1 WHERE username = ?2
            RETURNING id, username, password_hash, is_admin, is_blocked
        ";
        sqlx::query_as::<_, User>(query)
            .bind(is_admin)
            .bind(username)
            .fetch_optional(pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update admin flag")
    }
}
