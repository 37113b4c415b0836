//! Eval Tracker CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eval_tracker_cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    eval_tracker_cli::run(cli).await
}

/// Logs go to stderr; stdout carries command output only.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "eval_tracker=debug"
    } else {
        "eval_tracker=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
