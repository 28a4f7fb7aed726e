mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

/// Conventional exit status after SIGINT.
const INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose, cli.global.quiet);

    // Ctrl-C abandons the in-flight request instead of killing mid-write
    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel();
        }
    });

    // Dispatch and handle errors with proper exit codes
    match proxmate_api::cancellable(&cancel, run(cli)).await {
        Some(Ok(())) => {}
        Some(Err(err)) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(code);
        }
        None => {
            eprintln!("Interrupted");
            std::process::exit(INTERRUPTED);
        }
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    commands::dispatch(cli.command, &cli.global).await
}
