use anyhow::Result;
use clap::{Arg, ArgAction, Command};

pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("GATEHOUSE_SESSION_TTL_SECONDS")
                .default_value("43200")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long(ARG_SESSION_COOKIE_SECURE)
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("GATEHOUSE_SESSION_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug)]
pub struct Options {
    pub session_ttl_seconds: i64,
    pub session_cookie_secure: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if a required value is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_SESSION_TTL_SECONDS}"))?;

        Ok(Self {
            session_ttl_seconds,
            session_cookie_secure: matches.get_flag(ARG_SESSION_COOKIE_SECURE),
        })
    }
}
