//! Command implementations
//!
//! Flags keep the snake_case spelling of the harness scripts they replace
//! (`--result_dir`, `--target_model`, ...).

pub mod amend;
pub mod exclude;
pub mod save;

use anyhow::{Context as _, Result};
use clap::Args;
use eval_tracker_core::{TaskResults, TaskResult};
use eval_tracker_workflow::PublishSummary;
use std::future::Future;
use std::path::PathBuf;

use crate::cli::Commands;
use crate::context::Context;

/// Where on the tracker the model's run lives
#[derive(Debug, Args)]
pub struct TrackerArgs {
    /// Tracker entity (team or user) owning the project
    #[arg(long = "wandb_entity_name", visible_alias = "entity")]
    pub entity: String,

    /// Tracker project holding the runs
    #[arg(long = "wandb_project_name", visible_alias = "project")]
    pub project: String,
}

/// Where the harness wrote its outputs
#[derive(Debug, Args)]
pub struct ResultArgs {
    /// Directory holding the harness result JSON files
    #[arg(long = "result_dir")]
    pub result_dir: PathBuf,

    /// Also upload the harness write-out directory
    #[arg(long = "is_write_out")]
    pub is_write_out: bool,

    /// Root of the harness write-out tree
    #[arg(long = "write_out_dir", default_value = "write_out")]
    pub write_out_dir: PathBuf,
}

/// Execute the selected command
pub async fn execute(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Save(args) => save::execute(ctx, args).await,
        Commands::Amend(args) => amend::execute(ctx, args).await,
        Commands::Exclude(args) => exclude::execute(ctx, args).await,
    }
}

/// Run an upload behind a spinner, then print what it published
pub(crate) async fn publish<F>(ctx: &Context, message: &str, upload: F) -> Result<()>
where
    F: Future<Output = eval_tracker_core::Result<PublishSummary>>,
{
    let spinner = ctx.output.spinner(message);
    let result = upload.await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    let summary = result.context("Upload failed")?;
    ctx.output.write_summary(&summary)?;
    ctx.output.finish_upload();
    Ok(())
}

/// Warn about loaded tasks whose write-out directory is absent
pub(crate) fn warn_missing_write_out(ctx: &Context, tasks: &TaskResults) {
    let missing: Vec<&TaskResult> = tasks
        .values()
        .filter(|t| t.write_out_dir.as_ref().is_some_and(|d| !d.is_dir()))
        .collect();
    for task in missing {
        ctx.output.warning(&format!(
            "Write-out directory for {} not found",
            task.task_name
        ));
    }
}
