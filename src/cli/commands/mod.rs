pub mod account;
pub mod character;
pub mod hashing;
pub mod logging;

use crate::identity::MAX_RESET_TTL_SECONDS;
use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_DSN: &str = "dsn";
pub const ARG_RESET_TTL_SECONDS: &str = "reset-ttl-seconds";

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

    let command = Command::new("lfg")
        .about("LFG accounts, credentials and character rosters")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .env("LFG_DSN")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_RESET_TTL_SECONDS)
                .long(ARG_RESET_TTL_SECONDS)
                .help("Lifetime of password reset tokens in seconds")
                .env("LFG_RESET_TTL_SECONDS")
                .default_value("3600")
                .global(true)
                .value_parser(clap::value_parser!(i64).range(60..=MAX_RESET_TTL_SECONDS)),
        );

    let command = account::subcommands(command);
    let command = character::subcommand(command);
    let command = hashing::with_args(command);
    logging::with_args(command)
}
