//! Argon2 cost settings. Defaults target roughly 100ms+ per hash; raise them
//! as hardware improves. Existing hashes keep verifying and are upgraded on
//! the next successful login.

use crate::identity::HashingConfig;
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_ARGON2_MEMORY_KIB: &str = "argon2-memory-kib";
pub const ARG_ARGON2_ITERATIONS: &str = "argon2-iterations";
pub const ARG_ARGON2_PARALLELISM: &str = "argon2-parallelism";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ARGON2_MEMORY_KIB)
                .long(ARG_ARGON2_MEMORY_KIB)
                .help("Argon2id memory cost in KiB")
                .env("LFG_ARGON2_MEMORY_KIB")
                .default_value("65536")
                .global(true)
                .value_parser(clap::value_parser!(u32).range(8..)),
        )
        .arg(
            Arg::new(ARG_ARGON2_ITERATIONS)
                .long(ARG_ARGON2_ITERATIONS)
                .help("Argon2id time cost (passes over memory)")
                .env("LFG_ARGON2_ITERATIONS")
                .default_value("3")
                .global(true)
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_ARGON2_PARALLELISM)
                .long(ARG_ARGON2_PARALLELISM)
                .help("Argon2id lanes")
                .env("LFG_ARGON2_PARALLELISM")
                .default_value("1")
                .global(true)
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
}

/// # Errors
/// Returns an error if an argument is missing.
pub fn parse(matches: &ArgMatches) -> Result<HashingConfig> {
    let memory_kib = matches
        .get_one::<u32>(ARG_ARGON2_MEMORY_KIB)
        .copied()
        .context("missing required argument: --argon2-memory-kib")?;
    let iterations = matches
        .get_one::<u32>(ARG_ARGON2_ITERATIONS)
        .copied()
        .context("missing required argument: --argon2-iterations")?;
    let parallelism = matches
        .get_one::<u32>(ARG_ARGON2_PARALLELISM)
        .copied()
        .context("missing required argument: --argon2-parallelism")?;

    Ok(HashingConfig::new(memory_kib, iterations, parallelism))
}
