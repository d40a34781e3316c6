//! Command-line argument dispatch.
//!
//! Maps validated CLI arguments to the action the binary executes: the HTTP
//! server, or the out-of-band admin grant.

use crate::cli::actions::{admin, server, Action};
use crate::cli::commands::{self, auth};
use anyhow::{Context, Result};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let dsn = matches
        .get_one::<String>(commands::ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    if let Some(sub_m) = matches.subcommand_matches(commands::admin::CMD_ADMIN) {
        let username = sub_m
            .get_one::<String>(commands::admin::ARG_USERNAME)
            .cloned()
            .context("missing required argument: --username")?;

        return Ok(Action::Admin(admin::Args {
            dsn,
            username,
            is_admin: !sub_m.get_flag(commands::admin::ARG_REVOKE),
        }));
    }

    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(8080);
    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(server::Args {
        port,
        dsn,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        session_cookie_secure: auth_opts.session_cookie_secure,
    }))
}
