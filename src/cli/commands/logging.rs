use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accepts `0..=5` or a level name, so `LFG_LOG_LEVEL=debug` and `-vvv` agree.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        let wanted = level.to_lowercase();
        LEVEL_NAMES
            .iter()
            .zip(0u8..)
            .find_map(|(name, count)| (*name == wanted).then_some(count))
            .ok_or_else(|| format!("invalid log level: {level}"))
    })
}

/// Map the verbosity count to a tracing level; `None` keeps the default (ERROR).
#[must_use]
pub const fn level_from_count(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

#[must_use]
pub fn verbosity_level(matches: &ArgMatches) -> Option<Level> {
    level_from_count(matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("LFG_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_maps_to_levels() {
        assert_eq!(level_from_count(0), None);
        assert_eq!(level_from_count(1), Some(Level::WARN));
        assert_eq!(level_from_count(2), Some(Level::INFO));
        assert_eq!(level_from_count(3), Some(Level::DEBUG));
        assert_eq!(level_from_count(9), Some(Level::TRACE));
    }

    #[test]
    fn env_level_names() {
        for (index, level) in LEVEL_NAMES.iter().enumerate() {
            temp_env::with_vars([("LFG_LOG_LEVEL", Some(*level))], || {
                let matches = with_args(Command::new("lfg")).get_matches_from(vec!["lfg"]);
                assert_eq!(
                    matches.get_one::<u8>(ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn repeated_flag() {
        temp_env::with_vars([("LFG_LOG_LEVEL", None::<&str>)], || {
            let matches = with_args(Command::new("lfg")).get_matches_from(vec!["lfg", "-vvv"]);
            assert_eq!(verbosity_level(&matches), Some(Level::DEBUG));
        });
    }
}
