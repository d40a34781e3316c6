use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, SqlitePool};
use tracing::{error, info_span, Instrument};
use utoipa::ToSchema;

use crate::{APP_USER_AGENT, GIT_COMMIT_HASH};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database is healthy", body = Health),
        (status = 503, description = "Database is unhealthy", body = Health)
    ),
    tag = "health"
)]
pub async fn health(pool: Extension<SqlitePool>) -> impl IntoResponse {
    let acquire_span = info_span!("db.acquire", db.system = "sqlite", db.operation = "ACQUIRE");
    let result = match pool.0.acquire().instrument(acquire_span).await {
        Ok(mut conn) => {
            let ping_span = info_span!("db.ping", db.system = "sqlite", db.operation = "PING");
            match conn.ping().instrument(ping_span).await {
                Ok(()) => Ok(()),
                Err(error) => {
                    error!("Failed to ping database: {}", error);
                    Err(StatusCode::SERVICE_UNAVAILABLE)
                }
            }
        }
        Err(error) => {
            error!("Failed to acquire database connection: {}", error);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    let (status, database) = match result {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(status) => (status, "error"),
    };

    let body = Json(Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    });

    let short_hash = GIT_COMMIT_HASH.get(0..7).unwrap_or(GIT_COMMIT_HASH);
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!("{APP_USER_AGENT}:{short_hash}")) {
        headers.insert("X-App", value);
    }

    (status, headers, body)
}
