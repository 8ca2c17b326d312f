use crate::cli::{
    actions::Action,
    commands::{self, logging},
    dispatch::handler,
    globals::GlobalArgs,
    telemetry,
};
use anyhow::Result;

/// Parse the command line, install logging and return what to run.
///
/// # Errors
///
/// Returns an error if logging cannot be initialized or arguments are missing.
pub fn start() -> Result<(GlobalArgs, Action)> {
    let matches = commands::new().get_matches();

    telemetry::init(logging::verbosity_level(&matches))?;

    handler(&matches)
}
