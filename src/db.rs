//! Database pool construction and schema bootstrap.

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info_span, Instrument};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// Connect to the database behind `dsn`.
///
/// # Errors
/// Returns an error if the DSN is invalid or the first connection fails.
pub async fn connect(dsn: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(dsn)
        .with_context(|| format!("Invalid database DSN: {dsn}"))?
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect_with(options)
        .await
        .context("Failed to connect to database")
}

/// Create the tables when missing. Safe to run on every start.
///
/// # Errors
/// Returns an error if any schema statement fails.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    let span = info_span!("db.query", db.system = "sqlite", db.operation = "SCHEMA");
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .instrument(span)
        .await
        .context("Failed to apply database schema")?;

    debug!("database schema applied");

    Ok(())
}
