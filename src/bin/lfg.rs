use anyhow::Result;
use lfg_identity::cli::{actions, start, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let (globals, action) = start()?;

    let result = actions::execute(&globals, action).await;

    telemetry::shutdown_tracer();

    result
}
