pub mod admin;
pub mod auth;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const DEFAULT_DSN: &str = "sqlite://gatehouse.db?mode=rwc";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("gatehouse")
        .about("Username/password authentication and admin console")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("GATEHOUSE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .long_help(
                    "Database connection string, e.g. sqlite://gatehouse.db?mode=rwc. The schema is created on startup.",
                )
                .env("GATEHOUSE_DSN")
                .default_value(DEFAULT_DSN)
                .global(true),
        )
        .subcommand(admin::subcommand());

    let command = auth::with_args(command);
    logging::with_args(command)
}
