//! Eval Tracker CLI
//!
//! Uploads lm-evaluation-harness results to the experiment tracker: a fresh
//! run per model (`save`), additional tasks on that run (`amend`), and
//! Average corrections (`exclude`).

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod output;

pub use cli::{Cli, Commands};
pub use config::CliConfig;
pub use context::Context;

use anyhow::Result;

/// Run a parsed command line against the user's configuration
pub async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::new(&cli)?;
    commands::execute(&ctx, cli.command).await
}
