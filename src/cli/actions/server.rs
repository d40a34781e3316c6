use crate::{api, db};
use anyhow::{Context, Result};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub session_ttl_seconds: i64,
    pub session_cookie_secure: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database cannot be opened or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    // The pool is the only shared resource; it lives for the whole process.
    let pool = db::connect(&args.dsn).await?;
    db::apply_schema(&pool)
        .await
        .context("Could not prepare database schema")?;

    let auth_config = api::AuthConfig::new()
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_cookie_secure(args.session_cookie_secure);

    let result = api::new(args.port, pool.clone(), auth_config).await;

    pool.close().await;

    result
}
