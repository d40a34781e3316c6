use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names indexed by verbosity count; `-vvvv` is the last meaningful step.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accepts a level name (any case) or its verbosity count, `0` to `4`.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> Result<u8, String> {
        let position = match level.parse::<usize>() {
            Ok(count) => (count < LEVELS.len()).then_some(count),
            Err(_) => {
                let level = level.to_ascii_lowercase();
                LEVELS.iter().position(|name| *name == level)
            }
        };
        position
            .and_then(|count| u8::try_from(count).ok())
            .ok_or_else(|| format!("invalid log level, expected one of {}", LEVELS.join(", ")))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("GATEHOUSE_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
