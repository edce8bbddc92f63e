mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aps_api::Connector;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let credentials = config::resolve_credentials(&cli.global)?;
    let mut connector = Connector::new(credentials);

    tracing::debug!(command = ?cli.command, "dispatching command");
    let result = commands::dispatch(cli.command, &mut connector, &cli.global).await;

    // Teardown runs once whatever the action did; a failed logout is worth
    // a warning but never changes the exit status.
    if let Err(err) = connector.finish().await {
        tracing::warn!("logout failed: {err}");
    }

    result
}
