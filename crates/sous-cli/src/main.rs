//! `sous` entry point - the composition root.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sous_cli::{Cli, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env before clap reads `env` args
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    if let Err(e) = handlers::dispatch(&cli.command).await {
        exit_with(&e);
    }
    Ok(())
}

/// Logs go to stderr so they never interleave with narration on stdout.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "sous=debug" } else { "sous=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}

fn exit_with(error: &anyhow::Error) -> ! {
    eprintln!("Error: {error:#}");
    std::process::exit(handlers::exit_code(error));
}
