use crate::{db, identity::UserRepo};
use anyhow::{bail, Result};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub dsn: String,
    pub username: String,
    pub is_admin: bool,
}

/// Grant or revoke admin rights for an existing user.
/// # Errors
/// Returns an error if the database is unreachable or the user does not exist.
pub async fn execute(args: Args) -> Result<()> {
    let pool = db::connect(&args.dsn).await?;
    db::apply_schema(&pool).await?;

    let result = UserRepo::set_admin(&pool, &args.username, args.is_admin).await;
    pool.close().await;

    let Some(user) = result? else {
        bail!("user not found: {}", args.username);
    };

    info!(user_id = user.id, is_admin = user.is_admin, "admin rights updated");
    println!(
        "{}: is_admin={}",
        user.username,
        if user.is_admin { "true" } else { "false" }
    );

    Ok(())
}
