use clap::{Arg, ArgAction, Command};

pub const CMD_ADMIN: &str = "admin";
pub const ARG_USERNAME: &str = "username";
pub const ARG_REVOKE: &str = "revoke";

/// Out-of-band admin management; HTTP routes can never change `is_admin`.
#[must_use]
pub fn subcommand() -> Command {
    Command::new(CMD_ADMIN)
        .about("Grant or revoke admin rights for an existing user")
        .arg(
            Arg::new(ARG_USERNAME)
                .short('u')
                .long(ARG_USERNAME)
                .help("Username to update")
                .required(true),
        )
        .arg(
            Arg::new(ARG_REVOKE)
                .long(ARG_REVOKE)
                .help("Revoke admin rights instead of granting them")
                .action(ArgAction::SetTrue),
        )
}
